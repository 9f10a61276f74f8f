//! In-Process Backend Module
//!
//! HashMap storage with LRU capacity bound and TTL expiration, answering the
//! same commands as a Redis server so the service can run without one.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::backend::KvBackend;
use crate::cache::entry::CacheEntry;
use crate::cache::lru::LruTracker;
use crate::cache::glob;
use crate::cache::stats::{human_bytes, BackendInfo, CacheStats};
use crate::error::StoreResult;

// == Memory State ==
/// Entries, access order and counters, guarded together.
#[derive(Debug)]
struct MemoryState {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// Running total of entry footprints
    used_bytes: usize,
}

impl MemoryState {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            used_bytes: 0,
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.used_bytes = self.used_bytes.saturating_sub(entry.footprint(key));
                self.lru.remove(key);
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, key: String, entry: CacheEntry) {
        self.used_bytes += entry.footprint(&key);
        self.lru.touch(&key);
        if let Some(old) = self.entries.insert(key.clone(), entry) {
            self.used_bytes = self.used_bytes.saturating_sub(old.footprint(&key));
        }
    }
}

// == Memory Backend ==
/// In-process key-value store.
#[derive(Debug)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    /// Maximum number of entries before LRU eviction
    max_entries: usize,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, expired ones included until swept.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.state.write().await.stats.record_command();
        Ok(())
    }

    // == Get ==
    /// Expired entries are removed and counted as misses.
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut state = self.state.write().await;
        state.stats.record_command();

        let lookup = state
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired()).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => {
                state.stats.record_hit();
                state.lru.touch(key);
                Ok(Some(value))
            }
            Some(None) => {
                state.remove(key);
                state.stats.record_miss();
                Ok(None)
            }
            None => {
                state.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Overwrites reset the TTL. At capacity, the least recently used entry goes.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.stats.record_command();

        let is_overwrite = state.entries.contains_key(key);
        if !is_overwrite && state.entries.len() >= self.max_entries {
            if let Some(evicted) = state.lru.evict_oldest() {
                state.remove(&evicted);
                state.stats.record_eviction();
            }
        }

        state.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        state.stats.record_command();

        let mut removed = 0;
        for key in keys {
            let live = state.entries.get(key).is_some_and(|e| !e.is_expired());
            if state.remove(key) && live {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let mut state = self.state.write().await;
        state.stats.record_command();

        Ok(state
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && glob::matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn info(&self) -> StoreResult<BackendInfo> {
        let mut state = self.state.write().await;
        state.stats.record_command();

        Ok(BackendInfo {
            used_memory: human_bytes(state.used_bytes as u64),
            connected_clients: 1,
            commands_processed: state.stats.commands_processed,
            keyspace_hits: state.stats.hits,
            keyspace_misses: state.stats.misses,
        })
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were dropped.
    async fn purge_expired(&self) -> usize {
        let mut state = self.state.write().await;

        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }
        expired.len()
    }
}
