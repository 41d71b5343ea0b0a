use crate::format::{format_failures, format_stats};
use crate::state::IndexState;
use std::fmt::Write as _;

/// Summarizes the loaded directory: counts, shards and load failures.
pub fn handle_index_info(state: &IndexState) -> String {
    let store = state.store();
    let mut output = format!("Search directory: {}\n\n", state.search_dir().display());
    output.push_str(&format_stats(&store.stats(), store.shards()));

    let failures = state.failures();
    if !failures.is_empty() {
        let _ = writeln!(output, "\n{} shard(s) failed to load:", failures.len());
        output.push_str(&format_failures(failures));
    }
    output
}
