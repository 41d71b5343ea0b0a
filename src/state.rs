//! Loaded index state shared by the CLI commands and the MCP tools.

use crate::loader::{LoadReport, ShardFailure};
use crate::search::IndexStore;
use std::path::{Path, PathBuf};

/// A search directory after loading: the immutable store plus load context.
#[derive(Debug)]
pub struct IndexState {
    store: IndexStore,
    failures: Vec<ShardFailure>,
    search_dir: PathBuf,
    /// Root of the generated HTML site, used to resolve relative URLs
    site_root: String,
    default_limit: usize,
}

impl IndexState {
    pub fn new(report: LoadReport, search_dir: &Path, default_limit: usize) -> Self {
        Self {
            store: report.store,
            failures: report.failures,
            search_dir: search_dir.to_path_buf(),
            site_root: site_root_of(search_dir),
            default_limit,
        }
    }

    pub const fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn failures(&self) -> &[ShardFailure] {
        &self.failures
    }

    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    pub fn site_root(&self) -> &str {
        &self.site_root
    }

    pub const fn default_limit(&self) -> usize {
        self.default_limit
    }
}

/// Shards live in `<site>/search/`, so the site root is the parent directory.
fn site_root_of(search_dir: &Path) -> String {
    search_dir
        .parent()
        .map(|parent| parent.display().to_string())
        .unwrap_or_default()
}
