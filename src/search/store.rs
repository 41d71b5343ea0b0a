//! The index store: parsed entries plus a sorted key index.

use crate::error::FormatError;
use crate::shard::{Shard, ShardInfo, ShardName};
use crate::types::Entry;
use ahash::AHashMap;
use serde::Serialize;
use std::cmp::Ordering;

/// Entry position within the store (insertion order).
type Slot = u32;

/// Read-only collection of index entries answering exact and prefix lookups.
///
/// Entries keep the order they were loaded in. A second array holds entry
/// slots sorted by `(key, slot)`, so exact lookups are a binary search and a
/// prefix query is one contiguous range of it.
#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    entries: Vec<Entry>,
    /// Index into `shards` for every entry
    origins: Vec<u32>,
    shards: Vec<ShardInfo>,
    sorted: Vec<Slot>,
    by_id: AHashMap<u32, Slot>,
}

/// Summary counts for a loaded store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IndexStats {
    pub shards: usize,
    pub entries: usize,
    pub destinations: usize,
    pub external_destinations: usize,
    pub overloaded_entries: usize,
}

impl IndexStore {
    /// Parses a single unnamed shard.
    pub fn load(raw: &str) -> Result<Self, FormatError> {
        Self::load_shard(ShardName::parse(""), raw)
    }

    /// Parses a single shard, recording its name.
    pub fn load_shard(name: ShardName, raw: &str) -> Result<Self, FormatError> {
        Ok(Self::from_shards([Shard::parse(name, raw)?]))
    }

    /// Builds a store from already parsed shards, in the order given.
    pub fn from_shards(shards: impl IntoIterator<Item = Shard>) -> Self {
        let mut entries = Vec::new();
        let mut origins = Vec::new();
        let mut infos = Vec::new();

        for shard in shards {
            let origin = infos.len() as u32;
            origins.extend(std::iter::repeat_n(origin, shard.entries.len()));
            entries.extend(shard.entries);
            infos.push(shard.info);
        }

        Self::from_parts(infos, entries, origins)
    }

    /// Reassembles a store from its persisted parts and rebuilds the indexes.
    pub(crate) fn from_parts(
        shards: Vec<ShardInfo>,
        entries: Vec<Entry>,
        origins: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(entries.len(), origins.len());

        let mut store = Self {
            entries,
            origins,
            shards,
            sorted: Vec::new(),
            by_id: AHashMap::new(),
        };
        store.reindex();
        store
    }

    pub(crate) fn into_parts(self) -> (Vec<ShardInfo>, Vec<Entry>, Vec<u32>) {
        (self.shards, self.entries, self.origins)
    }

    pub(crate) fn parts(&self) -> (&[ShardInfo], &[Entry], &[u32]) {
        (&self.shards, &self.entries, &self.origins)
    }

    fn reindex(&mut self) {
        let mut sorted: Vec<Slot> = (0..self.entries.len() as Slot).collect();
        sorted.sort_unstable_by(|&a, &b| {
            self.key_at(a)
                .cmp(self.key_at(b))
                .then_with(|| a.cmp(&b))
        });
        self.sorted = sorted;

        self.by_id = AHashMap::with_capacity(self.entries.len());
        for (slot, entry) in self.entries.iter().enumerate() {
            if let Some(id) = entry.id() {
                self.by_id.entry(id).or_insert(slot as Slot);
            }
        }

        tracing::debug!(
            "Indexed {} entries from {} shard(s)",
            self.entries.len(),
            self.shards.len()
        );
    }

    /// Appends every entry of `other`, keeping duplicates.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let (mut shards, mut entries, mut origins) = self.into_parts();
        let (other_shards, other_entries, other_origins) = other.into_parts();

        let offset = shards.len() as u32;
        shards.extend(other_shards);
        entries.extend(other_entries);
        origins.extend(other_origins.into_iter().map(|origin| origin + offset));

        Self::from_parts(shards, entries, origins)
    }

    fn key_at(&self, slot: Slot) -> &str {
        self.entries[slot as usize].key()
    }

    /// First position in `sorted` whose key is not less than `key`.
    fn lower_bound(&self, key: &str) -> usize {
        self.sorted
            .partition_point(|&slot| self.key_at(slot).cmp(key) == Ordering::Less)
    }

    /// Positions of every entry whose key starts with `prefix`, in load order.
    pub(crate) fn slots_with_prefix(&self, prefix: &str) -> Vec<Slot> {
        if prefix.is_empty() {
            return (0..self.entries.len() as Slot).collect();
        }

        let start = self.lower_bound(prefix);
        let mut slots: Vec<Slot> = self.sorted[start..]
            .iter()
            .copied()
            .take_while(|&slot| self.key_at(slot).starts_with(prefix))
            .collect();
        slots.sort_unstable();
        slots
    }

    /// All entries whose key starts with `prefix`, in source order.
    ///
    /// Keys are normalized to lowercase at load time and compared byte-wise,
    /// so `prefix` should already be lowercase. An empty prefix matches all.
    pub fn lookup(&self, prefix: &str) -> Vec<&Entry> {
        self.slots_with_prefix(prefix)
            .into_iter()
            .map(|slot| &self.entries[slot as usize])
            .collect()
    }

    /// Exact-key lookup. With duplicate keys the first loaded entry wins.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        let start = self.lower_bound(key);
        self.sorted
            .get(start)
            .filter(|&&slot| self.key_at(slot) == key)
            .map(|&slot| &self.entries[slot as usize])
    }

    /// Every entry with exactly this key, in load order.
    pub fn get_all(&self, key: &str) -> Vec<&Entry> {
        let start = self.lower_bound(key);
        self.sorted[start..]
            .iter()
            .take_while(|&&slot| self.key_at(slot) == key)
            .map(|&slot| &self.entries[slot as usize])
            .collect()
    }

    /// Lookup by the generator's numeric id.
    pub fn get_by_id(&self, id: u32) -> Option<&Entry> {
        self.by_id.get(&id).map(|&slot| &self.entries[slot as usize])
    }

    /// Shard the entry at `slot` was loaded from.
    pub(crate) fn shard_of(&self, slot: Slot) -> &ShardInfo {
        &self.shards[self.origins[slot as usize] as usize]
    }

    pub(crate) fn entry_at(&self, slot: Slot) -> &Entry {
        &self.entries[slot as usize]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn shards(&self) -> &[ShardInfo] {
        &self.shards
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            shards: self.shards.len(),
            entries: self.entries.len(),
            ..IndexStats::default()
        };
        for entry in &self.entries {
            stats.destinations += entry.destinations().len();
            stats.external_destinations += entry
                .destinations()
                .iter()
                .filter(|d| d.is_external())
                .count();
            if entry.is_overloaded() {
                stats.overloaded_entries += 1;
            }
        }
        stats
    }
}
