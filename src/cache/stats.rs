//! Cache Statistics Module
//!
//! Store-level counters and the stats snapshot reported to operators.

use serde::Serialize;

// == Cache Stats ==
/// Counters kept by the in-process store.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries evicted by the capacity bound
    pub evictions: u64,
    /// Commands served since start
    pub commands_processed: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_command(&mut self) {
        self.commands_processed += 1;
    }
}

// == Backend Info ==
/// Raw server-side figures reported by a backend (Redis `INFO` or equivalent).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendInfo {
    /// Human readable memory usage, e.g. `1.05M`
    pub used_memory: String,
    pub connected_clients: u64,
    pub commands_processed: u64,
    pub keyspace_hits: u64,
    pub keyspace_misses: u64,
}

// == Store Status ==
/// Connection state of the store client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Connected,
    Disconnected,
    Error,
}

// == Store Stats ==
/// Snapshot returned by `CacheStore::stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub status: StoreStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_memory: Option<String>,
    pub connected_clients: u64,
    pub total_commands_processed: u64,
    pub keyspace_hits: u64,
    pub keyspace_misses: u64,
    /// Percentage of lookups served from cache, two decimals
    pub hit_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreStats {
    /// Stats for a client with no live connection.
    pub fn disconnected() -> Self {
        Self::empty(StoreStatus::Disconnected, None)
    }

    /// Stats for a connected client whose backend failed to report.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::empty(StoreStatus::Error, Some(message.into()))
    }

    /// Stats derived from backend figures.
    pub fn from_info(info: BackendInfo) -> Self {
        Self {
            status: StoreStatus::Connected,
            hit_rate: hit_rate(info.keyspace_hits, info.keyspace_misses),
            used_memory: Some(info.used_memory),
            connected_clients: info.connected_clients,
            total_commands_processed: info.commands_processed,
            keyspace_hits: info.keyspace_hits,
            keyspace_misses: info.keyspace_misses,
            error: None,
        }
    }

    fn empty(status: StoreStatus, error: Option<String>) -> Self {
        Self {
            status,
            used_memory: None,
            connected_clients: 0,
            total_commands_processed: 0,
            keyspace_hits: 0,
            keyspace_misses: 0,
            hit_rate: 0.0,
            error,
        }
    }
}

// == Hit Rate ==
/// `100 * hits / (hits + misses)` rounded to two decimals, `0.0` with no traffic.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        return 0.0;
    }
    let rate = hits as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

// == Memory Formatting ==
/// Formats a byte count the way Redis reports `used_memory_human`.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [(&str, f64); 3] = [
        ("G", 1024.0 * 1024.0 * 1024.0),
        ("M", 1024.0 * 1024.0),
        ("K", 1024.0),
    ];

    for (suffix, size) in UNITS {
        if bytes as f64 >= size {
            return format!("{:.2}{}", bytes as f64 / size, suffix);
        }
    }
    format!("{}B", bytes)
}
