//! User-facing search over an [`IndexStore`].
//!
//! The store itself compares bytes; this layer folds the query the way keys
//! were folded at load time, applies category filters and caps the result
//! count.

use super::key::normalize_query;
use super::store::IndexStore;
use crate::shard::{Category, ShardInfo};
use crate::types::Entry;

/// Default cap on returned hits when a caller does not give one.
pub const DEFAULT_LIMIT: usize = 25;

/// A prefix search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub category: Option<Category>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
            limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One matching entry together with the shard it came from.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub entry: &'a Entry,
    pub shard: &'a ShardInfo,
}

/// Result of a search: the hits kept plus how many matched before the cap.
#[derive(Debug, Clone)]
pub struct SearchResults<'a> {
    pub hits: Vec<SearchHit<'a>>,
    pub total: usize,
}

impl SearchResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn truncated(&self) -> bool {
        self.total > self.hits.len()
    }
}

impl IndexStore {
    /// Case-insensitive prefix search with optional category filter.
    pub fn search(&self, query: &SearchQuery) -> SearchResults<'_> {
        let prefix = normalize_query(&query.text);

        let matching: Vec<_> = self
            .slots_with_prefix(&prefix)
            .into_iter()
            .filter(|&slot| {
                query
                    .category
                    .as_ref()
                    .is_none_or(|category| self.shard_of(slot).name.category == *category)
            })
            .collect();

        let total = matching.len();
        let hits = matching
            .into_iter()
            .take(query.limit)
            .map(|slot| SearchHit {
                entry: self.entry_at(slot),
                shard: self.shard_of(slot),
            })
            .collect();

        tracing::debug!(
            "Search '{}' matched {} entries (category: {:?}, limit: {})",
            prefix,
            total,
            query.category,
            query.limit
        );

        SearchResults { hits, total }
    }
}
