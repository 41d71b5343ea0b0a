//! Snapshot cache for parsed search directories.
//!
//! Parsing a large generated site takes noticeably longer than decoding a
//! binary snapshot of the result. Snapshots are keyed by the search
//! directory's path and invalidated by a fingerprint over every shard's name
//! and contents, so editing, adding or removing a shard forces a rebuild.

use crate::error::{IndexError, Result};
use crate::loader::{self, LoadReport, RawShard};
use crate::search::IndexStore;
use crate::shard::ShardInfo;
use crate::types::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::{Xxh3, xxh3_64};

/// Bumped whenever the snapshot layout or entry normalization changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// 64-bit xxh3 digest of a search directory's shard contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Digest over shard names and contents, in the order given.
    pub(crate) fn of_shards(shards: &[RawShard]) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(&SNAPSHOT_VERSION.to_le_bytes());
        for shard in shards {
            hasher.update(shard.name.name.as_bytes());
            hasher.update(&[0]);
            hasher.update(&(shard.source.len() as u64).to_le_bytes());
            hasher.update(shard.source.as_bytes());
        }
        Self(hasher.digest())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// On-disk layout, decoded.
#[derive(Debug, Deserialize)]
struct Snapshot {
    version: u32,
    fingerprint: Fingerprint,
    shards: Vec<ShardInfo>,
    entries: Vec<Entry>,
    origins: Vec<u32>,
}

impl Snapshot {
    /// Decoded entries bypass `Entry::new`, so the invariants the store
    /// indexes by are checked again here.
    fn is_consistent(&self) -> bool {
        self.entries.len() == self.origins.len()
            && self
                .origins
                .iter()
                .all(|&origin| (origin as usize) < self.shards.len())
            && self
                .entries
                .iter()
                .all(|entry| !entry.key().is_empty() && !entry.destinations().is_empty())
    }
}

/// On-disk layout, borrowed from a live store for writing.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    fingerprint: Fingerprint,
    shards: &'a [ShardInfo],
    entries: &'a [Entry],
    origins: &'a [u32],
}

/// Snapshot file used for `search_dir` inside `cache_dir`.
///
/// The name is derived from the canonical directory path, so two spellings
/// of the same directory share a snapshot.
pub fn snapshot_path(cache_dir: &Path, search_dir: &Path) -> PathBuf {
    let canonical = std::fs::canonicalize(search_dir).unwrap_or_else(|_| search_dir.to_path_buf());
    let digest = xxh3_64(canonical.to_string_lossy().as_bytes());
    cache_dir.join(format!("{:016x}.snapshot", digest))
}

/// Decodes a snapshot, returning `None` if it is stale or unreadable.
async fn read_snapshot(path: &Path, expected: Fingerprint) -> Option<IndexStore> {
    let bytes = tokio::fs::read(path).await.ok()?;
    let path = path.to_path_buf();

    // Decoding is CPU bound for large sites
    tokio::task::spawn_blocking(move || match postcard::from_bytes::<Snapshot>(&bytes) {
        Ok(snapshot) if snapshot.version != SNAPSHOT_VERSION => {
            tracing::info!(
                "Snapshot {} has version {}, expected {}",
                path.display(),
                snapshot.version,
                SNAPSHOT_VERSION
            );
            None
        }
        Ok(snapshot) if snapshot.fingerprint != expected => {
            tracing::info!(
                "Snapshot {} is stale ({} != {}), rebuilding",
                path.display(),
                snapshot.fingerprint,
                expected
            );
            None
        }
        Ok(snapshot) if !snapshot.is_consistent() => {
            tracing::warn!("Snapshot {} is inconsistent, rebuilding", path.display());
            None
        }
        Ok(snapshot) => Some(IndexStore::from_parts(
            snapshot.shards,
            snapshot.entries,
            snapshot.origins,
        )),
        Err(e) => {
            tracing::warn!("Failed to decode snapshot {}: {}", path.display(), e);
            None
        }
    })
    .await
    .ok()?
}

/// Writes a snapshot through a temporary file so readers never see a partial one.
pub(crate) async fn write_snapshot(
    path: &Path,
    store: &IndexStore,
    fingerprint: Fingerprint,
) -> Result<()> {
    let (shards, entries, origins) = store.parts();
    let bytes = postcard::to_stdvec(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        fingerprint,
        shards,
        entries,
        origins,
    })
    .map_err(|e| IndexError::Cache(format!("failed to encode snapshot: {e}")))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| IndexError::io(parent, e))?;
    }

    let tmp = path.with_extension(format!("{}.tmp", std::process::id()));
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| IndexError::io(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(IndexError::io(path, e));
    }

    tracing::debug!("Wrote {} byte snapshot to {}", bytes.len(), path.display());
    Ok(())
}

/// Loads `dir`, reusing a snapshot from `cache_dir` when it is still current.
///
/// Without a cache directory this is [`loader::load_dir`]. Snapshots are only
/// written for directories that loaded without failures; a failed write is
/// logged and otherwise ignored.
pub async fn load_or_build(dir: &Path, cache_dir: Option<&Path>) -> Result<LoadReport> {
    let Some(cache_dir) = cache_dir else {
        return loader::load_dir(dir).await;
    };

    let start = std::time::Instant::now();
    let paths = loader::discover_shards(dir)?;
    let (raw, mut failures) = loader::read_shards(paths).await;
    let fingerprint = Fingerprint::of_shards(&raw);
    let snapshot = snapshot_path(cache_dir, dir);

    if failures.is_empty()
        && let Some(store) = read_snapshot(&snapshot, fingerprint).await
    {
        tracing::info!(
            "Loaded {} entries from snapshot {} in {:?}",
            store.len(),
            snapshot.display(),
            start.elapsed()
        );
        return Ok(LoadReport { store, failures });
    }

    let (shards, parse_failures) = loader::parse_shards(raw).await;
    failures.extend(parse_failures);
    let store = IndexStore::from_shards(shards);
    tracing::info!(
        "Parsed {} entries from {} shard(s) in {:?} ({} failed)",
        store.len(),
        store.shards().len(),
        start.elapsed(),
        failures.len()
    );

    if failures.is_empty() {
        if let Err(e) = write_snapshot(&snapshot, &store, fingerprint).await {
            tracing::warn!("Failed to cache snapshot: {}", e);
        }
    } else {
        tracing::debug!("Not caching a snapshot for {} (load had failures)", dir.display());
    }

    Ok(LoadReport { store, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::ShardName;
    use assert2::{check, let_assert};

    fn raw(name: &str, source: &str) -> RawShard {
        RawShard {
            name: ShardName::parse(name),
            path: PathBuf::from(format!("{name}.js")),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_fingerprint_tracks_names_and_contents() {
        let base = Fingerprint::of_shards(&[raw("all_0", "[]"), raw("all_1", "[]")]);
        check!(base == Fingerprint::of_shards(&[raw("all_0", "[]"), raw("all_1", "[]")]));
        check!(base != Fingerprint::of_shards(&[raw("all_0", "[]")]));
        check!(base != Fingerprint::of_shards(&[raw("all_0", "[]"), raw("all_2", "[]")]));
        check!(base != Fingerprint::of_shards(&[raw("all_0", "[ ]"), raw("all_1", "[]")]));
        // Boundaries between name and contents are unambiguous
        check!(
            Fingerprint::of_shards(&[raw("a", "b[]")]) != Fingerprint::of_shards(&[raw("ab", "[]")])
        );
    }

    #[test]
    fn test_fingerprint_display_is_fixed_width_hex() {
        let shown = Fingerprint(0xff).to_string();
        check!(shown == "00000000000000ff");
    }

    #[test]
    fn test_snapshot_path_is_stable() {
        let cache = Path::new("/tmp/cache");
        let a = snapshot_path(cache, Path::new("/nonexistent/search"));
        let b = snapshot_path(cache, Path::new("/nonexistent/search"));
        let c = snapshot_path(cache, Path::new("/nonexistent/other"));
        check!(a == b);
        check!(a != c);
        check!(a.extension().and_then(|e| e.to_str()) == Some("snapshot"));
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_and_staleness() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested/index.snapshot");
        let store = IndexStore::load_shard(
            ShardName::parse("all_1"),
            "[['kappa_1',['kappa',['../a.html',1,'']]]]",
        )
        .unwrap();

        write_snapshot(&path, &store, Fingerprint(7)).await.unwrap();

        let_assert!(Some(restored) = read_snapshot(&path, Fingerprint(7)).await);
        check!(restored.len() == 1);
        check!(restored.get("kappa") == store.get("kappa"));
        check!(restored.shards() == store.shards());

        check!(read_snapshot(&path, Fingerprint(8)).await.is_none());
    }

    #[tokio::test]
    async fn test_inconsistent_snapshot_is_ignored() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = IndexStore::load_shard(
            ShardName::parse("all_1"),
            "[['kappa_1',['kappa',['../a.html',1,'']]]]",
        )
        .unwrap();
        let (shards, entries, _) = store.parts();
        let write = |name: &str, snapshot: &SnapshotRef<'_>| {
            let path = tmp.path().join(name);
            std::fs::write(&path, postcard::to_stdvec(snapshot).unwrap()).unwrap();
            path
        };

        // Origin pointing past the shard list
        let path = write(
            "origin.snapshot",
            &SnapshotRef {
                version: SNAPSHOT_VERSION,
                fingerprint: Fingerprint(3),
                shards,
                entries,
                origins: &[9],
            },
        );
        check!(read_snapshot(&path, Fingerprint(3)).await.is_none());

        // Entry without destinations
        let hollow: Entry = serde_json::from_value(serde_json::json!({
            "key": "kappa",
            "id": 1,
            "raw_key": "kappa_1",
            "label": "kappa",
            "destinations": [],
        }))
        .unwrap();
        let path = write(
            "hollow.snapshot",
            &SnapshotRef {
                version: SNAPSHOT_VERSION,
                fingerprint: Fingerprint(3),
                shards,
                entries: std::slice::from_ref(&hollow),
                origins: &[0],
            },
        );
        check!(read_snapshot(&path, Fingerprint(3)).await.is_none());

        // The same layout with valid parts is accepted
        let path = write(
            "valid.snapshot",
            &SnapshotRef {
                version: SNAPSHOT_VERSION,
                fingerprint: Fingerprint(3),
                shards,
                entries,
                origins: &[0],
            },
        );
        check!(read_snapshot(&path, Fingerprint(3)).await.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_ignored() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.snapshot");
        std::fs::write(&path, b"\xff\xff\xff\xff").unwrap();
        check!(read_snapshot(&path, Fingerprint(1)).await.is_none());
    }
}
