//! Exact-key retrieval.

use crate::format::format_entry;
use crate::search::SearchQuery;
use crate::search::key::normalize_query;
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;

/// How many prefix matches to suggest when a key is not found.
const SUGGESTIONS: usize = 5;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetEntryRequest {
    /// Exact key of the entry, case-insensitive (as shown by lookup)
    pub key: String,
}

/// Shows every entry stored under the key; shards may repeat a key.
pub fn handle_get_entry(state: &IndexState, request: GetEntryRequest) -> Result<String, String> {
    let key = normalize_query(&request.key);
    if key.is_empty() {
        return Err("Key must not be empty.".to_string());
    }

    let entries = state.store().get_all(&key);
    if entries.is_empty() {
        return Ok(not_found(state, &key));
    }

    let rendered: Vec<String> = entries
        .iter()
        .map(|entry| format_entry(entry, state.site_root()))
        .collect();
    Ok(rendered.join("\n"))
}

fn not_found(state: &IndexState, key: &str) -> String {
    let mut msg = format!("No entry with key '{}'.", key);

    let similar = state
        .store()
        .search(&SearchQuery::new(key).limit(SUGGESTIONS));
    if !similar.is_empty() {
        msg.push_str(" Keys starting with it:\n");
        for hit in &similar.hits {
            msg.push_str("• ");
            msg.push_str(hit.entry.key());
            msg.push('\n');
        }
    } else {
        msg.push_str("\nUse lookup with a shorter prefix to find the exact key.\n");
    }
    msg
}
