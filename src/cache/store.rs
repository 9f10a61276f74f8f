//! Cache Store Module
//!
//! Failure-tolerant client over a key-value backend. Values travel as UTF-8
//! JSON text; any type with a `Serialize` impl can be written (timestamps
//! through chrono's RFC 3339 form) and everything reads back as
//! `serde_json::Value`.
//!
//! Every public operation except [`CacheStore::connect`] is soft-failing:
//! store faults are logged and turned into a miss, `false` or `0`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::backend::KvBackend;
use crate::cache::memory::MemoryBackend;
use crate::cache::redis::RedisBackend;
use crate::cache::StoreStats;
use crate::config::{BackendKind, Config};
use crate::error::{StoreError, StoreResult};

// == Store Config ==
/// Connection settings for the store client.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub redis_url: String,
    /// Connect and per-command bound
    pub timeout: Duration,
    /// Capacity of the in-process backend
    pub max_entries: usize,
    /// TTL used when a write does not name one
    pub default_ttl: Duration,
}

impl StoreConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backend: config.store_backend,
            redis_url: config.redis_url.clone(),
            timeout: config.store_timeout(),
            max_entries: config.max_entries,
            default_ttl: config.default_ttl(),
        }
    }

    /// In-process store with default settings.
    pub fn memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            ..Self::from_config(&Config::default())
        }
    }
}

// == Cache Store ==
/// Process-wide store handle with an explicit connect/disconnect lifecycle.
pub struct CacheStore {
    config: StoreConfig,
    backend: RwLock<Option<Arc<dyn KvBackend>>>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a disconnected client; call [`connect`](Self::connect) before use.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            backend: RwLock::new(None),
        }
    }

    /// Creates a client already attached to `backend`.
    pub fn with_backend(config: StoreConfig, backend: Arc<dyn KvBackend>) -> Self {
        Self {
            config,
            backend: RwLock::new(Some(backend)),
        }
    }

    /// TTL applied to writes that do not specify one.
    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    // == Lifecycle ==
    /// Establishes the backend connection.
    ///
    /// On failure the client stays disconnected and the error is returned so
    /// the caller may decide to run without caching.
    pub async fn connect(&self) -> StoreResult<()> {
        let connected: StoreResult<Arc<dyn KvBackend>> = match self.config.backend {
            BackendKind::Redis => {
                RedisBackend::connect(&self.config.redis_url, self.config.timeout)
                    .await
                    .map(|backend| Arc::new(backend) as Arc<dyn KvBackend>)
            }
            BackendKind::Memory => Ok(Arc::new(MemoryBackend::new(self.config.max_entries))),
        };

        let mut slot = self.backend.write().await;
        match connected {
            Ok(backend) => {
                info!("Successfully connected to {} store", backend.name());
                *slot = Some(backend);
                Ok(())
            }
            Err(err) => {
                error!("Failed to connect to store: {}", err);
                *slot = None;
                Err(err)
            }
        }
    }

    /// Drops the backend connection.
    pub async fn disconnect(&self) {
        if let Some(backend) = self.backend.write().await.take() {
            info!("Disconnected from {} store", backend.name());
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.backend.read().await.is_some()
    }

    async fn backend(&self) -> Option<Arc<dyn KvBackend>> {
        self.backend.read().await.clone()
    }

    // == Get ==
    /// Returns the cached value, or `None` on miss, decode failure or outage.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let Some(backend) = self.backend().await else {
            debug!("Store not available, skipping cache get for {}", key);
            return None;
        };

        match read_json(backend.as_ref(), key).await {
            Ok(Some(value)) => {
                debug!("Cache hit for key: {}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss for key: {}", key);
                None
            }
            Err(err) => {
                error!("Error getting cache key {}: {}", key, err);
                None
            }
        }
    }

    // == Set ==
    /// Serializes and writes `value`, expiring after `ttl` (store default if `None`).
    ///
    /// Returns `false` on any failure.
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool
    where
        T: Serialize + ?Sized,
    {
        let Some(backend) = self.backend().await else {
            debug!("Store not available, skipping cache set for {}", key);
            return false;
        };

        let ttl = ttl.unwrap_or(self.config.default_ttl);
        match write_json(backend.as_ref(), key, value, ttl).await {
            Ok(()) => {
                debug!("Cache set for key: {} with TTL: {:?}", key, ttl);
                true
            }
            Err(err) => {
                error!("Error setting cache key {}: {}", key, err);
                false
            }
        }
    }

    // == Delete ==
    /// Returns true if the key existed.
    pub async fn delete(&self, key: &str) -> bool {
        let Some(backend) = self.backend().await else {
            debug!("Store not available, skipping cache delete for {}", key);
            return false;
        };

        match backend.delete(&[key.to_string()]).await {
            Ok(deleted) => deleted > 0,
            Err(err) => {
                error!("Error deleting cache key {}: {}", key, err);
                false
            }
        }
    }

    // == Pattern Delete ==
    /// Deletes every key matching `pattern`, returning how many were removed.
    pub async fn delete_pattern(&self, pattern: &str) -> usize {
        match self.try_delete_pattern(pattern).await {
            Ok(deleted) => deleted,
            Err(err) => {
                error!("Error deleting keys with pattern {}: {}", pattern, err);
                0
            }
        }
    }

    /// Like [`delete_pattern`](Self::delete_pattern) but surfaces command errors.
    ///
    /// A disconnected store is not an error here: nothing is cached, so `Ok(0)`.
    pub async fn try_delete_pattern(&self, pattern: &str) -> StoreResult<usize> {
        let Some(backend) = self.backend().await else {
            debug!("Store not available, skipping pattern delete for {}", pattern);
            return Ok(0);
        };

        let keys = backend.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let deleted = backend.delete(&keys).await? as usize;
        info!("Deleted {} keys matching pattern: {}", deleted, pattern);
        Ok(deleted)
    }

    // == Stats ==
    pub async fn stats(&self) -> StoreStats {
        let Some(backend) = self.backend().await else {
            return StoreStats::disconnected();
        };

        match backend.info().await {
            Ok(info) => StoreStats::from_info(info),
            Err(err) => {
                error!("Error getting cache stats: {}", err);
                StoreStats::failed(err.to_string())
            }
        }
    }

    // == Health ==
    /// Pings the backend; false when disconnected or unresponsive.
    pub async fn health_check(&self) -> bool {
        let Some(backend) = self.backend().await else {
            return false;
        };

        match backend.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!("Store health check failed: {}", err);
                false
            }
        }
    }

    /// Sweeps expired entries from backends that do not expire on their own.
    pub async fn purge_expired(&self) -> usize {
        match self.backend().await {
            Some(backend) => backend.purge_expired().await,
            None => 0,
        }
    }
}

async fn read_json(backend: &dyn KvBackend, key: &str) -> StoreResult<Option<Value>> {
    match backend.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

async fn write_json<T>(
    backend: &dyn KvBackend,
    key: &str,
    value: &T,
    ttl: Duration,
) -> StoreResult<()>
where
    T: Serialize + ?Sized,
{
    let serialized = serde_json::to_string(value).map_err(StoreError::Serialization)?;
    backend.set_ex(key, &serialized, ttl).await
}
