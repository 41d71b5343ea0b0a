//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `search_workspace`: a temp copy of the bundled shards that tests may edit
//! - `fixture_store`: the bundled shards loaded into an [`IndexStore`]
//!
//! [`TempWorkspace`] is the reusable temp-directory building block for any
//! test that needs filesystem isolation.

use rstest::fixture;
use searchdata_mcp::{IndexState, IndexStore, loader, logging};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Bundled shard files copied from a real generated site.
pub const FIXTURE_SHARDS: &[&str] = &["all_17.js", "functions_a.js"];

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Directory holding the bundled shard fixtures.
pub fn fixture_dir() -> PathBuf {
    project_root().join("tests/fixtures/search")
}

/// Contents of one bundled shard.
#[allow(dead_code)] // Used across different integration test crates
pub fn fixture(name: &str) -> String {
    let path = fixture_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e))
}

/// A temporary workspace directory for test isolation.
///
/// Automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a directory (and all parent directories) within this workspace.
    ///
    /// # Panics
    /// Panics if directory creation fails.
    pub fn create_dir(&self, path: &str) -> PathBuf {
        let full_path = self.root.join(path);
        std::fs::create_dir_all(&full_path)
            .unwrap_or_else(|e| panic!("Failed to create directory '{}': {}", path, e));
        full_path
    }

    /// Creates a file with the given content, creating parent directories.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Copies a file from the real filesystem into this workspace.
    ///
    /// # Panics
    /// Panics if copying fails.
    pub fn copy_file(&self, source: &Path, dest_relative: &str) {
        let dest = self.root.join(dest_relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!(
                    "Failed to create parent directory for '{}': {}",
                    dest_relative, e
                )
            });
        }
        std::fs::copy(source, &dest).unwrap_or_else(|e| {
            panic!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                dest_relative,
                e
            )
        });
    }

    pub fn remove_file(&self, path: &str) {
        std::fs::remove_file(self.root.join(path))
            .unwrap_or_else(|e| panic!("Failed to remove '{}': {}", path, e));
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A generated-site layout in a temp directory: `html/search/` holds a copy
/// of the bundled shards and `cache/` is an empty snapshot directory.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct SearchWorkspace {
    pub workspace: TempWorkspace,
    pub search_dir: PathBuf,
    pub cache_dir: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl SearchWorkspace {
    pub fn new() -> Self {
        logging::init(tracing::Level::DEBUG);
        let workspace = TempWorkspace::new();
        for name in FIXTURE_SHARDS {
            workspace.copy_file(&fixture_dir().join(name), &format!("html/search/{}", name));
        }
        let search_dir = workspace.path().join("html/search");
        let cache_dir = workspace.create_dir("cache");
        Self {
            workspace,
            search_dir,
            cache_dir,
        }
    }

    /// Writes (or overwrites) a shard in the search directory.
    pub fn write_shard(&self, name: &str, content: &str) {
        self.workspace
            .create_file(&format!("html/search/{}", name), content);
    }

    pub fn remove_shard(&self, name: &str) {
        self.workspace.remove_file(&format!("html/search/{}", name));
    }

    /// Snapshot files currently in the cache directory.
    pub fn snapshots(&self) -> Vec<PathBuf> {
        let mut files: Vec<_> = std::fs::read_dir(&self.cache_dir)
            .expect("Failed to list cache directory")
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "snapshot"))
            .collect();
        files.sort();
        files
    }
}

#[fixture]
#[allow(dead_code)] // Used across different integration test crates
pub fn search_workspace() -> SearchWorkspace {
    SearchWorkspace::new()
}

/// The bundled shards merged into one store, `all_17` first.
#[fixture]
#[allow(dead_code)] // Used across different integration test crates
pub fn fixture_store() -> IndexStore {
    let all = IndexStore::load_shard(
        searchdata_mcp::ShardName::parse("all_17"),
        &fixture("all_17.js"),
    )
    .expect("all_17 fixture parses");
    let functions = IndexStore::load_shard(
        searchdata_mcp::ShardName::parse("functions_a"),
        &fixture("functions_a.js"),
    )
    .expect("functions_a fixture parses");
    all.merge(functions)
}

/// Loads the bundled directory the way the server does.
#[allow(dead_code)] // Used across different integration test crates
pub async fn fixture_state() -> IndexState {
    logging::init(tracing::Level::DEBUG);
    let dir = fixture_dir();
    let report = loader::load_dir(&dir)
        .await
        .expect("fixture directory loads");
    IndexState::new(report, &dir, searchdata_mcp::search::DEFAULT_LIMIT)
}
