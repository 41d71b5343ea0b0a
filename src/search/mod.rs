//! Prefix search infrastructure for generated search-index shards.
//!
//! This module provides key normalization, the read-only index store and the
//! query layer built on top of it.

// Module declarations
pub mod key;
pub(crate) mod query;
pub(crate) mod store;

// Public re-exports (used via lib.rs)
pub use query::{DEFAULT_LIMIT, SearchHit, SearchQuery, SearchResults};
pub use store::{IndexStats, IndexStore};
