//! Cache Module
//!
//! Key-value store facade over Redis or an in-process backend, plus the
//! caching patterns built on it: fetch-or-compute, entity invalidation,
//! concurrent warming and performance classification.

mod backend;
mod entry;
pub mod glob;
mod invalidation;
pub mod keys;
mod lru;
mod manager;
mod memory;
mod metrics;
mod redis;
mod stats;
mod store;
mod warming;


// Re-export public types
pub use backend::KvBackend;
pub use invalidation::{BulkInvalidationReport, InvalidationReport, InvalidationStatus, Invalidator};
pub use keys::{cache_key, entity_key, entity_pattern, CacheParams};
pub use manager::{CacheManager, Fetched, TtlClass, TtlPolicy};
pub use memory::MemoryBackend;
pub use metrics::{
    efficiency, memory_category, performance_status, Efficiency, MemoryCategory,
    PerformanceMetrics, PerformanceStatus,
};
pub use self::redis::RedisBackend;
pub use stats::{BackendInfo, CacheStats, StoreStats, StoreStatus};
pub use store::{CacheStore, StoreConfig};
pub use warming::{warm_all, WarmTask, WarmingReport};
