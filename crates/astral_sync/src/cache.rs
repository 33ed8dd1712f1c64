//! # Sector Cache
//!
//! Two tiers in front of the generator:
//!
//! ```text
//! get(id)
//!   ├─ memory map (LRU, no expiry)          hit → refresh recency
//!   └─ persistent store (index + records)   hit → TTL check → promote
//! ```
//!
//! Records are `serde_json` encoded [`CacheEntry`] values compressed with
//! LZ4. The list of persisted ids lives under [`INDEX_KEY`].
//!
//! The cache is an accelerator only. Every persistent failure is logged,
//! counted and turned into a miss, and a cached version never goes
//! backwards. A record that cannot be read or decoded leaves the index.
//!
//! Writes and lookups hold the memory lock for their whole duration.
//! Locks are always taken memory first, then index.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use astral_procedural::GeneratedSector;
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::delta::SectorDelta;
use crate::error::{CacheError, CacheResult};
use crate::store::{FileStore, PersistentStore};

/// Store key holding the JSON array of persisted sector ids.
pub const INDEX_KEY: &str = "sector_index";

/// A cached sector snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Shared, never mutated snapshot.
    pub sector: Arc<GeneratedSector>,
    /// Server version this snapshot is confirmed at.
    pub version: u64,
    /// Last read (ms since Unix epoch).
    pub last_accessed: u64,
    /// Last confirmation against the server (ms since Unix epoch).
    pub last_synced: u64,
}

/// Counter snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered from memory.
    pub memory_hits: u64,
    /// Reads answered from the persistent store.
    pub persistent_hits: u64,
    /// Reads answered by neither tier.
    pub misses: u64,
    /// Entries dropped from memory to make room.
    pub memory_evictions: u64,
    /// Records dropped from the store to make room.
    pub persistent_evictions: u64,
    /// Records dropped for exceeding the TTL.
    pub expired: u64,
    /// Persistent operations that failed and were swallowed.
    pub persistent_failures: u64,
    /// Writes ignored because they would lower a cached version.
    pub stale_writes: u64,
}

#[derive(Default)]
struct Counters {
    memory_hits: AtomicU64,
    persistent_hits: AtomicU64,
    misses: AtomicU64,
    memory_evictions: AtomicU64,
    persistent_evictions: AtomicU64,
    expired: AtomicU64,
    persistent_failures: AtomicU64,
    stale_writes: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.persistent_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            memory_evictions: self.memory_evictions.load(Ordering::Relaxed),
            persistent_evictions: self.persistent_evictions.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            persistent_failures: self.persistent_failures.load(Ordering::Relaxed),
            stale_writes: self.stale_writes.load(Ordering::Relaxed),
        }
    }
}

struct MemorySlot {
    entry: CacheEntry,
    recency: u64,
}

#[derive(Default)]
struct MemoryTier {
    slots: HashMap<String, MemorySlot>,
    clock: u64,
}

impl MemoryTier {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

#[derive(Default)]
struct DeltaLog {
    deltas: Vec<SectorDelta>,
    version: u64,
}

/// Two-tier sector cache.
pub struct SectorCache {
    config: CacheConfig,
    store: Option<Arc<dyn PersistentStore>>,
    clock: Arc<dyn Clock>,
    memory: Mutex<MemoryTier>,
    index: Mutex<BTreeSet<String>>,
    deltas: Mutex<HashMap<String, DeltaLog>>,
    counters: Counters,
}

impl std::fmt::Debug for SectorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectorCache")
            .field("config", &self.config)
            .field("persistent", &self.store.is_some())
            .field("memory_len", &self.len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl SectorCache {
    /// Cache with no persistent tier.
    #[must_use]
    pub fn memory_only(config: CacheConfig) -> Self {
        Self::build(config, None, Arc::new(SystemClock))
    }

    /// Cache backed by `store`. Loads the persisted index immediately.
    #[must_use]
    pub fn with_store(config: CacheConfig, store: Arc<dyn PersistentStore>) -> Self {
        Self::build(config, Some(store), Arc::new(SystemClock))
    }

    /// Cache as described by `config`: a [`FileStore`] under `cache_dir`,
    /// or memory only when no directory is set.
    ///
    /// # Errors
    ///
    /// Returns error if the cache directory cannot be created.
    pub fn from_config(config: &CacheConfig) -> std::io::Result<Self> {
        Ok(match &config.cache_dir {
            Some(dir) => {
                let store: Arc<dyn PersistentStore> = Arc::new(FileStore::open(dir)?);
                Self::with_store(config.clone(), store)
            }
            None => Self::memory_only(config.clone()),
        })
    }

    /// Replaces the clock (tests drive TTL with a [`crate::ManualClock`]).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn build(
        config: CacheConfig,
        store: Option<Arc<dyn PersistentStore>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Self {
            config,
            store,
            clock,
            memory: Mutex::new(MemoryTier::default()),
            index: Mutex::new(BTreeSet::new()),
            deltas: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        };
        if let Some(store) = &cache.store {
            let loaded = cache.load_index(store.as_ref());
            tracing::debug!("Loaded sector index with {} entries", loaded.len());
            *cache.index.lock() = loaded;
        }
        cache
    }

    /// Cache configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Sectors held in memory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.memory.lock().slots.len()
    }

    /// Returns true if memory holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sectors known to the persistent tier.
    #[must_use]
    pub fn persistent_len(&self) -> usize {
        self.index.lock().len()
    }

    /// Returns true if either tier knows `id`. Does not check expiry.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.memory.lock().slots.contains_key(id) || self.index.lock().contains(id)
    }

    /// Looks up a sector snapshot.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<GeneratedSector>> {
        self.get_entry(id).map(|entry| entry.sector)
    }

    /// Looks up a full entry, promoting persistent hits into memory.
    #[must_use]
    pub fn get_entry(&self, id: &str) -> Option<CacheEntry> {
        let now = self.clock.now_ms();
        let mut memory = self.memory.lock();
        let recency = memory.tick();
        if let Some(slot) = memory.slots.get_mut(id) {
            slot.recency = recency;
            slot.entry.last_accessed = now;
            Counters::bump(&self.counters.memory_hits, 1);
            tracing::debug!("Cache memory hit: {}", id);
            return Some(slot.entry.clone());
        }

        match self.load_persistent(id, now) {
            Some(mut entry) => {
                entry.last_accessed = now;
                Counters::bump(&self.counters.persistent_hits, 1);
                tracing::debug!("Cache persistent hit: {}", id);
                self.insert_locked(&mut memory, entry.clone());
                Some(entry)
            }
            None => {
                Counters::bump(&self.counters.misses, 1);
                tracing::debug!("Cache miss: {}", id);
                None
            }
        }
    }

    /// Stores a sector at a confirmed version in both tiers.
    ///
    /// Returns false (and stores nothing) if a higher version is cached.
    /// The version check and the write happen under one lock, so a lower
    /// version can never land after a higher one.
    pub fn set(&self, sector: Arc<GeneratedSector>, version: u64) -> bool {
        let now = self.clock.now_ms();
        let mut memory = self.memory.lock();
        let known = self.version_locked(&memory, &sector.id, now);
        if version < known {
            Counters::bump(&self.counters.stale_writes, 1);
            tracing::debug!(
                "Ignoring write of {} at v{}: v{} already cached",
                sector.id,
                version,
                known
            );
            return false;
        }

        let entry = CacheEntry {
            sector,
            version,
            last_accessed: now,
            last_synced: now,
        };
        self.persist(&entry);
        self.insert_locked(&mut memory, entry);
        true
    }

    /// Cached version of `id`, or 0.
    #[must_use]
    pub fn get_version(&self, id: &str) -> u64 {
        let now = self.clock.now_ms();
        let memory = self.memory.lock();
        self.version_locked(&memory, id, now)
    }

    /// Marks `id` as confirmed at `version` without changing its content.
    ///
    /// The version only ever rises. Returns false if `id` is not cached.
    pub fn update_version(&self, id: &str, version: u64) -> bool {
        let now = self.clock.now_ms();
        let confirm = |entry: &mut CacheEntry| {
            entry.version = entry.version.max(version);
            entry.last_synced = now;
        };

        let mut memory = self.memory.lock();
        let entry = match memory.slots.get_mut(id) {
            Some(slot) => {
                confirm(&mut slot.entry);
                Some(slot.entry.clone())
            }
            None => self.load_persistent(id, now).map(|mut entry| {
                confirm(&mut entry);
                entry
            }),
        };

        match entry {
            Some(entry) => {
                self.persist(&entry);
                true
            }
            None => false,
        }
    }

    /// Drops `id` from both tiers and the delta table.
    pub fn remove(&self, id: &str) -> bool {
        let mut memory = self.memory.lock();
        let in_memory = memory.slots.remove(id).is_some();
        self.deltas.lock().remove(id);
        let in_store = self.remove_persistent(id);
        in_memory || in_store
    }

    /// Empties the memory tier. Persisted records stay.
    pub fn clear_memory(&self) {
        self.memory.lock().slots.clear();
    }

    /// Generates and caches every id not already known.
    ///
    /// `generate` returning `None` skips the id. Returns how many sectors
    /// were added.
    pub fn prefetch<I, F>(&self, ids: I, mut generate: F) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        F: FnMut(&str) -> Option<GeneratedSector>,
    {
        let mut added = 0;
        for id in ids {
            let id = id.as_ref();
            if self.contains(id) {
                continue;
            }
            if let Some(sector) = generate(id) {
                let version = sector.version;
                if self.set(Arc::new(sector), version) {
                    added += 1;
                }
            }
        }
        tracing::debug!("Prefetched {} sectors", added);
        added
    }

    /// Deltas recorded for `id`, in version order.
    #[must_use]
    pub fn cached_deltas(&self, id: &str) -> Vec<SectorDelta> {
        self.deltas
            .lock()
            .get(id)
            .map(|log| log.deltas.clone())
            .unwrap_or_default()
    }

    /// Highest delta version recorded for `id`, or 0.
    #[must_use]
    pub fn delta_version(&self, id: &str) -> u64 {
        self.deltas.lock().get(id).map_or(0, |log| log.version)
    }

    /// Records deltas for `id`, skipping versions already recorded.
    ///
    /// Returns how many were appended.
    pub fn append_deltas(&self, id: &str, deltas: &[SectorDelta]) -> usize {
        let mut incoming: Vec<&SectorDelta> = deltas.iter().collect();
        incoming.sort_by_key(|d| d.version);

        let mut table = self.deltas.lock();
        let log = table.entry(id.to_owned()).or_default();
        let mut appended = 0;
        for delta in incoming {
            if delta.version > log.version {
                log.version = delta.version;
                log.deltas.push(delta.clone());
                appended += 1;
            }
        }
        appended
    }

    /// Forgets every recorded delta.
    pub fn clear_deltas(&self) {
        self.deltas.lock().clear();
    }

    /// Version known to either tier. `memory` is the held memory lock.
    fn version_locked(&self, memory: &MemoryTier, id: &str, now: u64) -> u64 {
        match memory.slots.get(id) {
            Some(slot) => slot.entry.version,
            None => self.load_persistent(id, now).map_or(0, |entry| entry.version),
        }
    }

    fn insert_locked(&self, memory: &mut MemoryTier, entry: CacheEntry) {
        let id = entry.sector.id.clone();

        if !memory.slots.contains_key(&id) && memory.slots.len() >= self.config.memory_capacity {
            let mut by_age: Vec<(u64, String)> = memory
                .slots
                .iter()
                .map(|(id, slot)| (slot.recency, id.clone()))
                .collect();
            by_age.sort_unstable();
            let mut evicted = 0u64;
            for (_, victim) in by_age.into_iter().take(self.config.memory_evict_batch.max(1)) {
                memory.slots.remove(&victim);
                evicted += 1;
            }
            Counters::bump(&self.counters.memory_evictions, evicted);
            tracing::debug!("Evicted {} sectors from memory", evicted);
        }

        let recency = memory.tick();
        memory.slots.insert(id, MemorySlot { entry, recency });
    }

    fn ttl_ms(&self) -> u64 {
        self.config.ttl_secs.saturating_mul(1000)
    }

    /// Reads a live persistent entry. Expired and unreadable records are
    /// dropped; failures are logged and counted.
    fn load_persistent(&self, id: &str, now: u64) -> Option<CacheEntry> {
        let store = self.store.as_ref()?;
        if !self.index.lock().contains(id) {
            return None;
        }

        match read_record(store.as_ref(), id) {
            Ok(Some(entry)) if now.saturating_sub(entry.last_synced) > self.ttl_ms() => {
                tracing::debug!("Persistent record {} expired", id);
                Counters::bump(&self.counters.expired, 1);
                self.remove_persistent(id);
                None
            }
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                tracing::debug!("Index listed {} but no record exists", id);
                self.remove_persistent(id);
                None
            }
            Err(e) => {
                self.record_failure(&e);
                self.remove_persistent(id);
                None
            }
        }
    }

    fn persist(&self, entry: &CacheEntry) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let id = &entry.sector.id;

        if let Err(e) = write_record(store.as_ref(), entry) {
            self.record_failure(&e);
            return;
        }
        if self.index.lock().contains(id) {
            return;
        }

        self.make_room(store.as_ref());
        let snapshot = {
            let mut index = self.index.lock();
            index.insert(id.clone());
            index.clone()
        };
        self.save_index(store.as_ref(), &snapshot);
    }

    /// Evicts least recently synced records from the store and the index
    /// when the index is full. Undecodable records sort first. The caller
    /// saves the index.
    fn make_room(&self, store: &dyn PersistentStore) {
        let ids: Vec<String> = {
            let index = self.index.lock();
            if index.len() < self.config.persistent_capacity {
                return;
            }
            index.iter().cloned().collect()
        };

        let mut by_sync: Vec<(u64, String)> = ids
            .into_iter()
            .map(|id| {
                let synced = match read_record(store, &id) {
                    Ok(Some(entry)) => entry.last_synced,
                    _ => 0,
                };
                (synced, id)
            })
            .collect();
        by_sync.sort_unstable();

        let victims: Vec<String> = by_sync
            .into_iter()
            .take(self.config.persistent_evict_batch.max(1))
            .map(|(_, id)| id)
            .collect();
        for id in &victims {
            if let Err(source) = store.remove(id) {
                self.record_failure(&CacheError::Io {
                    key: id.clone(),
                    source,
                });
            }
        }

        {
            let mut index = self.index.lock();
            for id in &victims {
                index.remove(id);
            }
        }
        Counters::bump(
            &self.counters.persistent_evictions,
            u64::try_from(victims.len()).unwrap_or(u64::MAX),
        );
        tracing::debug!("Evicted {} sectors from persistent store", victims.len());
    }

    fn remove_persistent(&self, id: &str) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        let snapshot = {
            let mut index = self.index.lock();
            if !index.remove(id) {
                return false;
            }
            index.clone()
        };
        if let Err(source) = store.remove(id) {
            self.record_failure(&CacheError::Io {
                key: id.to_owned(),
                source,
            });
        }
        self.save_index(store.as_ref(), &snapshot);
        true
    }

    fn load_index(&self, store: &dyn PersistentStore) -> BTreeSet<String> {
        let loaded = store
            .read(INDEX_KEY)
            .map_err(|source| CacheError::Io {
                key: INDEX_KEY.to_owned(),
                source,
            })
            .and_then(|bytes| match bytes {
                Some(bytes) => serde_json::from_slice::<Vec<String>>(&bytes).map_err(|source| {
                    CacheError::Serde {
                        key: INDEX_KEY.to_owned(),
                        source,
                    }
                }),
                None => Ok(Vec::new()),
            });
        match loaded {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                self.record_failure(&e);
                BTreeSet::new()
            }
        }
    }

    fn save_index(&self, store: &dyn PersistentStore, ids: &BTreeSet<String>) {
        let result = serde_json::to_vec(ids)
            .map_err(|source| CacheError::Serde {
                key: INDEX_KEY.to_owned(),
                source,
            })
            .and_then(|bytes| {
                store.write(INDEX_KEY, &bytes).map_err(|source| CacheError::Io {
                    key: INDEX_KEY.to_owned(),
                    source,
                })
            });
        if let Err(e) = result {
            self.record_failure(&e);
        }
    }

    fn record_failure(&self, error: &CacheError) {
        Counters::bump(&self.counters.persistent_failures, 1);
        tracing::warn!("Persistent cache operation failed: {}", error);
    }
}

fn read_record(store: &dyn PersistentStore, id: &str) -> CacheResult<Option<CacheEntry>> {
    let Some(compressed) = store.read(id).map_err(|source| CacheError::Io {
        key: id.to_owned(),
        source,
    })?
    else {
        return Ok(None);
    };
    let bytes = decompress_size_prepended(&compressed).map_err(|e| CacheError::Corrupt {
        key: id.to_owned(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| CacheError::Serde {
            key: id.to_owned(),
            source,
        })
}

fn write_record(store: &dyn PersistentStore, entry: &CacheEntry) -> CacheResult<()> {
    let id = &entry.sector.id;
    let bytes = serde_json::to_vec(entry).map_err(|source| CacheError::Serde {
        key: id.clone(),
        source,
    })?;
    store
        .write(id, &compress_prepend_size(&bytes))
        .map_err(|source| CacheError::Io {
            key: id.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::delta::DeltaKind;
    use crate::store::MemoryStore;
    use astral_procedural::{SectorCoords, SectorGenerator};
    use std::time::Duration;

    fn sector(x: i32) -> Arc<GeneratedSector> {
        Arc::new(SectorGenerator::new(42).generate(SectorCoords::new(x, 0, 0)))
    }

    fn small_config() -> CacheConfig {
        CacheConfig {
            memory_capacity: 4,
            memory_evict_batch: 2,
            persistent_capacity: 3,
            persistent_evict_batch: 1,
            ..CacheConfig::default()
        }
    }

    fn delta(version: u64) -> SectorDelta {
        SectorDelta {
            id: format!("d{version}"),
            sector_id: "sector_0_0_0".to_owned(),
            delta_type: DeltaKind::NpcSpawned,
            target_id: None,
            target_type: None,
            changes: serde_json::Value::Null,
            applied_at: 0,
            version,
            caused_by: None,
        }
    }

    #[test]
    fn test_set_get_and_version() {
        let cache = SectorCache::memory_only(CacheConfig::default());
        assert!(cache.get("sector_0_0_0").is_none());
        assert_eq!(cache.get_version("sector_0_0_0"), 0);

        assert!(cache.set(sector(0), 5));
        assert_eq!(cache.get_version("sector_0_0_0"), 5);
        assert_eq!(
            cache.get("sector_0_0_0").map(|s| s.id.clone()).as_deref(),
            Some("sector_0_0_0")
        );

        let stats = cache.stats();
        assert_eq!(stats.memory_hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_version_never_decreases() {
        let cache = SectorCache::memory_only(CacheConfig::default());
        assert!(cache.set(sector(0), 5));
        assert!(!cache.set(sector(0), 3));
        assert_eq!(cache.get_version("sector_0_0_0"), 5);

        assert!(cache.update_version("sector_0_0_0", 2));
        assert_eq!(cache.get_version("sector_0_0_0"), 5);
        assert!(cache.update_version("sector_0_0_0", 9));
        assert_eq!(cache.get_version("sector_0_0_0"), 9);
        assert!(!cache.update_version("sector_9_9_9", 1));
        assert_eq!(cache.stats().stale_writes, 1);
    }

    #[test]
    fn test_memory_lru_eviction() {
        let cache = SectorCache::memory_only(small_config());
        for x in 0..4 {
            cache.set(sector(x), 0);
        }
        // Touch 0 and 1 so 2 and 3 are the least recent
        let _ = cache.get("sector_0_0_0");
        let _ = cache.get("sector_1_0_0");

        cache.set(sector(4), 0);
        assert_eq!(cache.len(), 3);
        assert!(cache.contains("sector_0_0_0"));
        assert!(cache.contains("sector_1_0_0"));
        assert!(!cache.contains("sector_2_0_0"));
        assert!(!cache.contains("sector_3_0_0"));
        assert!(cache.contains("sector_4_0_0"));
        assert_eq!(cache.stats().memory_evictions, 2);
    }

    #[test]
    fn test_persistent_promotion_and_ttl() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = SectorCache::with_store(CacheConfig::default(), store.clone())
            .with_clock(clock.clone());

        cache.set(sector(0), 2);
        cache.clear_memory();
        assert!(cache.is_empty());

        clock.advance(Duration::from_secs(60));
        assert!(cache.get("sector_0_0_0").is_some());
        assert_eq!(cache.stats().persistent_hits, 1);
        assert_eq!(cache.len(), 1);

        cache.clear_memory();
        clock.advance(Duration::from_secs(8 * 24 * 60 * 60));
        assert!(cache.get("sector_0_0_0").is_none());
        assert_eq!(cache.stats().expired, 1);
        assert_eq!(cache.persistent_len(), 0);
        assert_eq!(store.read("sector_0_0_0").unwrap(), None);
    }

    #[test]
    fn test_index_survives_restart() {
        let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
        {
            let cache = SectorCache::with_store(CacheConfig::default(), store.clone());
            cache.set(sector(0), 1);
            cache.set(sector(1), 4);
        }
        let cache = SectorCache::with_store(CacheConfig::default(), store);
        assert_eq!(cache.persistent_len(), 2);
        assert_eq!(cache.get_version("sector_1_0_0"), 4);
    }

    #[test]
    fn test_persistent_eviction_prefers_oldest_sync() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(10_000));
        let cache =
            SectorCache::with_store(small_config(), store.clone()).with_clock(clock.clone());

        for x in 0..3 {
            cache.set(sector(x), 0);
            clock.advance(Duration::from_secs(1));
        }
        assert!(cache.update_version("sector_0_0_0", 1));
        cache.set(sector(3), 0);

        assert_eq!(cache.persistent_len(), 3);
        assert_eq!(store.read("sector_1_0_0").unwrap(), None);
        assert!(store.read("sector_0_0_0").unwrap().is_some());
        assert_eq!(cache.stats().persistent_evictions, 1);
    }

    #[test]
    fn test_corrupt_record_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let cache = SectorCache::with_store(CacheConfig::default(), store.clone());
        cache.set(sector(0), 1);
        cache.clear_memory();

        store
            .write("sector_0_0_0", &compress_prepend_size(b"not a cache entry"))
            .unwrap();
        assert!(cache.get("sector_0_0_0").is_none());
        assert_eq!(cache.stats().persistent_failures, 1);
        assert_eq!(cache.persistent_len(), 0);

        // Dropped from the index: the next lookup is a plain miss
        assert!(cache.get("sector_0_0_0").is_none());
        assert_eq!(cache.stats().persistent_failures, 1);
    }

    /// Store whose every operation fails while `failing` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: std::sync::atomic::AtomicBool,
    }

    impl FlakyStore {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> std::io::Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(std::io::Error::other("disk unavailable"))
            } else {
                Ok(())
            }
        }
    }

    impl PersistentStore for FlakyStore {
        fn read(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
            self.check()?;
            self.inner.read(key)
        }

        fn write(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
            self.check()?;
            self.inner.write(key, bytes)
        }

        fn remove(&self, key: &str) -> std::io::Result<()> {
            self.check()?;
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failing_store_degrades_to_memory() {
        let store = Arc::new(FlakyStore::default());
        store.set_failing(true);
        let cache = SectorCache::with_store(CacheConfig::default(), store.clone());
        let after_open = cache.stats().persistent_failures;
        assert_eq!(after_open, 1);

        assert!(cache.set(sector(0), 3));
        assert!(cache.stats().persistent_failures > after_open);
        assert_eq!(cache.persistent_len(), 0);
        assert_eq!(cache.get_version("sector_0_0_0"), 3);
        assert!(cache.get("sector_0_0_0").is_some());

        cache.clear_memory();
        assert!(cache.get("sector_0_0_0").is_none());
    }

    #[test]
    fn test_unreadable_record_is_a_miss_and_leaves_index() {
        let store = Arc::new(FlakyStore::default());
        let cache = SectorCache::with_store(CacheConfig::default(), store.clone());
        cache.set(sector(0), 1);
        cache.clear_memory();
        assert_eq!(cache.persistent_len(), 1);

        store.set_failing(true);
        assert!(cache.get("sector_0_0_0").is_none());
        let failures = cache.stats().persistent_failures;
        assert!(failures >= 1);
        assert_eq!(cache.persistent_len(), 0);

        assert!(cache.get("sector_0_0_0").is_none());
        assert_eq!(cache.stats().persistent_failures, failures);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_failed_write_evicts_nothing() {
        let store = Arc::new(FlakyStore::default());
        let cache = SectorCache::with_store(small_config(), store.clone());
        for x in 0..3 {
            cache.set(sector(x), 0);
        }
        assert_eq!(cache.persistent_len(), 3);

        store.set_failing(true);
        cache.set(sector(3), 0);
        store.set_failing(false);

        assert_eq!(cache.persistent_len(), 3);
        assert_eq!(cache.stats().persistent_evictions, 0);
        for x in 0..3 {
            assert!(store.read(&format!("sector_{x}_0_0")).unwrap().is_some());
        }
    }

    #[test]
    fn test_concurrent_writers_keep_highest_version() {
        let cache = Arc::new(SectorCache::with_store(
            CacheConfig::default(),
            Arc::new(MemoryStore::new()),
        ));
        let handles: Vec<_> = (1..=16_u64)
            .map(|version| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.set(sector(0), version);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.get_version("sector_0_0_0"), 16);
        cache.clear_memory();
        assert_eq!(cache.get_version("sector_0_0_0"), 16);
    }

    #[test]
    fn test_delta_table_deduplicates() {
        let cache = SectorCache::memory_only(CacheConfig::default());
        assert_eq!(cache.append_deltas("s", &[delta(2), delta(1)]), 2);
        assert_eq!(cache.append_deltas("s", &[delta(2), delta(3)]), 1);
        let versions: Vec<u64> = cache.cached_deltas("s").iter().map(|d| d.version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(cache.delta_version("s"), 3);

        cache.clear_deltas();
        assert!(cache.cached_deltas("s").is_empty());
    }

    #[test]
    fn test_prefetch_skips_known_and_missing() {
        let cache = SectorCache::memory_only(CacheConfig::default());
        cache.set(sector(0), 0);
        let generator = SectorGenerator::new(42);
        let ids = ["sector_0_0_0", "sector_1_0_0", "not_a_sector"];
        let added = cache.prefetch(ids, |id| {
            astral_procedural::sector_id_to_coords(id).map(|c| generator.generate(c))
        });
        assert_eq!(added, 1);
        assert!(cache.contains("sector_1_0_0"));
    }

    #[test]
    fn test_remove() {
        let cache = SectorCache::with_store(CacheConfig::default(), Arc::new(MemoryStore::new()));
        cache.set(sector(0), 0);
        assert!(cache.remove("sector_0_0_0"));
        assert!(!cache.contains("sector_0_0_0"));
        assert!(!cache.remove("sector_0_0_0"));
    }
}
