//! Load and query generated documentation search indexes.
//!
//! A documentation generator splits its client-side search index into many
//! small script files ("shards"), each holding a literal array of entries that
//! map a search key to a label and one or more documented destinations. This
//! crate parses those shards, merges them into an [`IndexStore`] that answers
//! exact and prefix lookups, caches the parsed result as a binary snapshot and
//! serves it over MCP.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod logging;
pub mod markup;
pub mod search;
pub mod server;
pub mod shard;
pub mod state;
pub mod tools;
pub mod types;

pub use error::{FormatError, FormatErrorKind, IndexError, Position};
pub use loader::{LoadReport, ShardFailure, load_dir};
pub use search::{IndexStats, IndexStore, SearchHit, SearchQuery, SearchResults};
pub use server::IndexServer;
pub use shard::{Category, Shard, ShardInfo, ShardName};
pub use state::IndexState;
pub use types::{Destination, Entry, LinkTarget};
