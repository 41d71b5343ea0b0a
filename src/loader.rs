//! Loading every shard of a generated search directory.
//!
//! Shards are read and parsed independently; one that fails to read or parse
//! is reported in [`LoadReport::failures`] and the rest still load.

use crate::error::{IndexError, Result};
use crate::search::IndexStore;
use crate::shard::{Shard, ShardName};
use futures::future::join_all;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Script files the generator writes next to the shards.
const SUPPORT_SCRIPTS: &[&str] = &["search", "searchdata"];

/// Outcome of loading a directory: the merged store and every shard that failed.
#[derive(Debug)]
pub struct LoadReport {
    pub store: IndexStore,
    pub failures: Vec<ShardFailure>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A shard that could not be loaded.
#[derive(Debug)]
pub struct ShardFailure {
    pub path: PathBuf,
    pub error: IndexError,
}

/// Shard file contents read from disk, not yet parsed.
#[derive(Debug, Clone)]
pub(crate) struct RawShard {
    pub(crate) name: ShardName,
    pub(crate) path: PathBuf,
    pub(crate) source: String,
}

/// Lists shard files in `dir` (non-recursive), in merge order.
pub fn discover_shards(dir: &Path) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(dir).map_err(|e| IndexError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(IndexError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let mut shards: Vec<(ShardName, PathBuf)> = WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .max_depth(Some(1))
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("js"))
        .map(|path| (ShardName::from_path(&path), path))
        .filter(|(name, _)| !SUPPORT_SCRIPTS.contains(&name.name.as_str()))
        .collect();

    shards.sort_by(|(a, _), (b, _)| a.sort_key().cmp(&b.sort_key()));
    tracing::debug!("Discovered {} shard file(s) in {}", shards.len(), dir.display());

    Ok(shards.into_iter().map(|(_, path)| path).collect())
}

/// Reads shard files concurrently, keeping discovery order.
pub(crate) async fn read_shards(paths: Vec<PathBuf>) -> (Vec<RawShard>, Vec<ShardFailure>) {
    let reads = paths.into_iter().map(|path| async move {
        match tokio::fs::read_to_string(&path).await {
            Ok(source) => Ok(RawShard {
                name: ShardName::from_path(&path),
                path,
                source,
            }),
            Err(e) => Err(ShardFailure {
                error: IndexError::io(&path, e),
                path,
            }),
        }
    });

    let mut shards = Vec::new();
    let mut failures = Vec::new();
    for result in join_all(reads).await {
        match result {
            Ok(shard) => shards.push(shard),
            Err(failure) => {
                tracing::warn!("Skipping shard {}: {}", failure.path.display(), failure.error);
                failures.push(failure);
            }
        }
    }
    (shards, failures)
}

/// Parses shards on the blocking pool, keeping input order.
pub(crate) async fn parse_shards(raw: Vec<RawShard>) -> (Vec<Shard>, Vec<ShardFailure>) {
    let tasks = raw.into_iter().map(|raw| {
        let path = raw.path.clone();
        let task = tokio::task::spawn_blocking(move || {
            Shard::parse(raw.name, &raw.source).map(|shard| shard.with_path(raw.path))
        });
        async move { (path, task.await) }
    });

    let mut shards = Vec::new();
    let mut failures = Vec::new();
    for (path, joined) in join_all(tasks).await {
        let error = match joined {
            Ok(Ok(shard)) => {
                tracing::debug!("Parsed {} entries from {}", shard.entries.len(), path.display());
                shards.push(shard);
                continue;
            }
            Ok(Err(format)) => IndexError::from(format),
            Err(join) => IndexError::from(join),
        };
        tracing::warn!("Skipping shard {}: {}", path.display(), error);
        failures.push(ShardFailure { path, error });
    }
    (shards, failures)
}

/// Loads and merges every shard in `dir`.
///
/// Fails only when the directory itself cannot be listed; per-shard problems
/// end up in the report.
pub async fn load_dir(dir: &Path) -> Result<LoadReport> {
    let start = std::time::Instant::now();
    let paths = discover_shards(dir)?;

    let (raw, mut failures) = read_shards(paths).await;
    let (shards, parse_failures) = parse_shards(raw).await;
    failures.extend(parse_failures);

    let store = IndexStore::from_shards(shards);
    tracing::info!(
        "Loaded {} entries from {} shard(s) in {:?} ({} failed)",
        store.len(),
        store.shards().len(),
        start.elapsed(),
        failures.len()
    );

    Ok(LoadReport { store, failures })
}
