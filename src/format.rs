//! Text and JSON rendering shared by the CLI and the MCP tools.

use crate::loader::ShardFailure;
use crate::search::{IndexStats, SearchResults};
use crate::shard::ShardInfo;
use crate::types::{Destination, Entry, LinkTarget};
use serde::Serialize;
use std::fmt::Write as _;

/// Renders prefix search results, one entry per line with its first owner.
pub fn format_hits(query: &str, results: &SearchResults<'_>) -> String {
    if results.is_empty() {
        return format!("No entries match '{}'.\n", query.trim());
    }

    let mut output = format!("Entries matching '{}':\n\n", query.trim());
    for hit in &results.hits {
        let entry = hit.entry;
        let _ = write!(output, "• {}", entry.plain_label());
        let owner = entry.primary().plain_owner();
        if !owner.is_empty() {
            let _ = write!(output, " ({})", owner);
        }
        if entry.is_overloaded() {
            let _ = write!(output, " [+{} more]", entry.destinations().len() - 1);
        }
        let _ = writeln!(output, " - {} key `{}`", hit.shard.name, entry.key());
    }

    if results.truncated() {
        let _ = writeln!(
            output,
            "\nShowing {} of {} matches. Narrow the prefix or raise the limit to see more.",
            results.hits.len(),
            results.total
        );
    }
    output
}

/// Renders one entry with every destination, URLs resolved against `site_root`.
pub fn format_entry(entry: &Entry, site_root: &str) -> String {
    let mut output = format!("{}\n", entry.plain_label());
    let _ = write!(output, "key: {}", entry.key());
    if let Some(id) = entry.id() {
        let _ = write!(output, " (id {})", id);
    }
    output.push('\n');

    let _ = writeln!(output, "destinations: {}", entry.destinations().len());
    for (idx, dest) in entry.destinations().iter().enumerate() {
        let _ = write!(output, "  {}. {}", idx + 1, dest.resolve(site_root));
        let owner = dest.plain_owner();
        if !owner.is_empty() {
            let _ = write!(output, "  {}", owner);
        }
        if dest.target() == LinkTarget::Blank {
            output.push_str("  (new window)");
        }
        output.push('\n');
    }
    output
}

pub fn format_stats(stats: &IndexStats, shards: &[ShardInfo]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "shards:                {}", stats.shards);
    let _ = writeln!(output, "entries:               {}", stats.entries);
    let _ = writeln!(output, "destinations:          {}", stats.destinations);
    let _ = writeln!(output, "external destinations: {}", stats.external_destinations);
    let _ = writeln!(output, "overloaded entries:    {}", stats.overloaded_entries);

    if !shards.is_empty() {
        output.push('\n');
        for shard in shards {
            let _ = writeln!(output, "  {:<16} {:>6} entries", shard.name.to_string(), shard.entries);
        }
    }
    output
}

pub fn format_failures(failures: &[ShardFailure]) -> String {
    let mut output = String::new();
    for failure in failures {
        let _ = writeln!(output, "✗ {}: {}", failure.path.display(), failure.error);
    }
    output
}

#[derive(Debug, Serialize)]
struct DestinationJson<'a> {
    url: String,
    owner: std::borrow::Cow<'a, str>,
    new_window: bool,
}

impl<'a> DestinationJson<'a> {
    fn new(dest: &'a Destination, site_root: &str) -> Self {
        Self {
            url: dest.resolve(site_root),
            owner: dest.plain_owner(),
            new_window: dest.target() == LinkTarget::Blank,
        }
    }
}

#[derive(Debug, Serialize)]
struct EntryJson<'a> {
    key: &'a str,
    id: Option<u32>,
    label: std::borrow::Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shard: Option<&'a str>,
    destinations: Vec<DestinationJson<'a>>,
}

impl<'a> EntryJson<'a> {
    fn new(entry: &'a Entry, shard: Option<&'a str>, site_root: &str) -> Self {
        Self {
            key: entry.key(),
            id: entry.id(),
            label: entry.plain_label(),
            shard,
            destinations: entry
                .destinations()
                .iter()
                .map(|dest| DestinationJson::new(dest, site_root))
                .collect(),
        }
    }
}

pub fn hits_json(results: &SearchResults<'_>, site_root: &str) -> serde_json::Value {
    let hits: Vec<_> = results
        .hits
        .iter()
        .map(|hit| EntryJson::new(hit.entry, Some(hit.shard.name.name.as_str()), site_root))
        .collect();
    serde_json::json!({ "total": results.total, "hits": hits })
}

pub fn entries_json(entries: &[&Entry], site_root: &str) -> serde_json::Value {
    let entries: Vec<_> = entries
        .iter()
        .map(|entry| EntryJson::new(entry, None, site_root))
        .collect();
    serde_json::json!(entries)
}

pub fn failures_json(failures: &[ShardFailure]) -> serde_json::Value {
    let failures: Vec<_> = failures
        .iter()
        .map(|failure| {
            let format = failure.error.as_format();
            serde_json::json!({
                "path": failure.path.display().to_string(),
                "error": failure.error.to_string(),
                "entry": format.and_then(|err| err.entry),
                "line": format.and_then(|err| err.position).map(|pos| pos.line),
                "column": format.and_then(|err| err.position).map(|pos| pos.column),
            })
        })
        .collect();
    serde_json::json!(failures)
}
