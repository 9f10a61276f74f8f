//! Cache-With-Fallback Module
//!
//! The fetch-or-compute primitive: serve from the store, or run the producer,
//! store a non-null result and hand it back.
//!
//! There is no single-flight: concurrent misses on the same cold key each run
//! the producer. Producers are idempotent, so the only cost is redundant work.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use crate::cache::keys::{cache_key, CacheParams};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::ProducerError;

/// Outcome of a producer, and of a cached lookup.
pub type Fetched = Result<Option<Value>, ProducerError>;

// == TTL Classes ==
/// Named TTL durations chosen by the caller at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    /// Short TTL for composite responses
    Default,
    /// Longer TTL for expensive individual sub-queries
    Component,
}

/// Durations behind each [`TtlClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub default: Duration,
    pub component: Duration,
}

impl TtlPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default: config.default_ttl(),
            component: config.component_ttl(),
        }
    }

    pub fn resolve(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Default => self.default,
            TtlClass::Component => self.component,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// == Cache Manager ==
/// Fetch-or-compute over a shared [`CacheStore`].
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<CacheStore>,
    ttl: TtlPolicy,
}

impl CacheManager {
    pub fn new(store: Arc<CacheStore>, ttl: TtlPolicy) -> Self {
        Self { store, ttl }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn ttl(&self, class: TtlClass) -> Duration {
        self.ttl.resolve(class)
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, or runs `producer` on a miss.
    ///
    /// - hit: returned as-is, producer not invoked
    /// - producer value: written with `ttl` (store default if `None`), returned
    /// - producer null: returned without being written
    /// - producer error: propagated, nothing written
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> Fetched
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Fetched>,
    {
        if let Some(cached) = self.store.get(key).await {
            return Ok(Some(cached));
        }

        debug!("Cache miss for key: {}, fetching from source", key);
        let fresh = producer().await.map_err(|err| {
            error!("Error fetching data for cache key {}: {}", key, err);
            err
        })?;

        match fresh {
            Some(value) if !value.is_null() => {
                if self.store.set(key, &value, ttl).await {
                    debug!("Cached fresh data for key: {}", key);
                }
                Ok(Some(value))
            }
            _ => {
                debug!("Producer returned no data for key: {}, not caching", key);
                Ok(None)
            }
        }
    }

    /// [`get_or_compute`](Self::get_or_compute) keyed by `(namespace, params)`.
    pub async fn cached<F, Fut>(
        &self,
        namespace: &str,
        params: &CacheParams,
        ttl: TtlClass,
        producer: F,
    ) -> Fetched
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Fetched>,
    {
        let key = cache_key(namespace, params);
        self.get_or_compute(&key, Some(self.ttl(ttl)), producer).await
    }
}
