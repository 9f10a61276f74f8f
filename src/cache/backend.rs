//! Backend Trait Module
//!
//! The raw command surface a key-value store must offer. Backends speak
//! strings; JSON handling and soft-fail policy live in `CacheStore`.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::BackendInfo;
use crate::error::StoreResult;

/// Raw key-value commands issued by the store client.
///
/// All operations may suspend and all are fallible.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Round-trips a no-op command to prove the connection is alive.
    async fn ping(&self) -> StoreResult<()>;

    /// Returns the stored text for `key`, `None` if absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Deletes `keys`, returning how many existed.
    async fn delete(&self, keys: &[String]) -> StoreResult<u64>;

    /// Lists keys matching a glob `pattern`.
    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>>;

    /// Server-side figures for stats reporting.
    async fn info(&self) -> StoreResult<BackendInfo>;

    /// Drops expired entries the backend does not expire on its own.
    ///
    /// Networked stores expire server-side, so the default does nothing.
    async fn purge_expired(&self) -> usize {
        0
    }
}
