//! Prefix lookup over the loaded index.

use crate::format::format_hits;
use crate::search::SearchQuery;
use crate::shard::Category;
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupRequest {
    /// Key prefix to match, case-insensitive (e.g. "kerr" or "key_")
    pub prefix: String,
    /// Only return entries from shards of this category, such as "functions" or "classes"
    #[serde(default)]
    pub category: Option<String>,
    /// Maximum number of entries to return
    #[serde(default)]
    pub limit: Option<usize>,
}

pub fn handle_lookup(state: &IndexState, request: LookupRequest) -> Result<String, String> {
    let query = build_query(state, &request)?;
    let results = state.store().search(&query);
    Ok(format_hits(&request.prefix, &results))
}

/// Turns a request into a query, applying the configured default limit.
pub fn build_query(state: &IndexState, request: &LookupRequest) -> Result<SearchQuery, String> {
    let mut query = SearchQuery::new(&request.prefix)
        .limit(request.limit.unwrap_or_else(|| state.default_limit()));

    if let Some(name) = request.category.as_deref().filter(|name| !name.trim().is_empty()) {
        query = query.category(parse_category(state, name)?);
    }
    Ok(query)
}

/// Accepts any category a loaded shard actually has.
fn parse_category(state: &IndexState, name: &str) -> Result<Category, String> {
    let category: Category = match name.trim().parse() {
        Ok(category) => category,
        Err(never) => match never {},
    };

    let mut available: Vec<&Category> = state
        .store()
        .shards()
        .iter()
        .map(|shard| &shard.name.category)
        .collect();
    available.sort();
    available.dedup();

    if available.contains(&&category) {
        return Ok(category);
    }

    let names: Vec<&str> = available.iter().map(|c| c.as_str()).collect();
    Err(format!(
        "Unknown category '{}'. Categories in this index: {}",
        name.trim(),
        if names.is_empty() { "(none)".to_string() } else { names.join(", ") }
    ))
}
