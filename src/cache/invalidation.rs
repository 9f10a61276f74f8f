//! Invalidation Module
//!
//! Per-entity eviction across every namespace an entity's aggregates are
//! cached under, plus sequential bulk eviction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::cache::keys::entity_pattern;
use crate::cache::CacheStore;

// == Reports ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationStatus {
    Success,
    Error,
}

/// Result of evicting one entity.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidationReport {
    pub entity_id: String,
    pub deleted_keys: usize,
    pub status: InvalidationStatus,
    /// First pattern delete failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Result of evicting many entities.
#[derive(Debug, Clone, Serialize)]
pub struct BulkInvalidationReport {
    pub total_entities: usize,
    pub total_deleted_keys: usize,
    pub results: Vec<InvalidationReport>,
    pub timestamp: DateTime<Utc>,
}

// == Invalidator ==
/// Evicts entity-scoped entries from a fixed set of namespaces.
#[derive(Clone)]
pub struct Invalidator {
    store: Arc<CacheStore>,
    namespaces: Vec<String>,
}

impl Invalidator {
    pub fn new<I, S>(store: Arc<CacheStore>, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Deletes every entry of `entity_id` in every namespace.
    ///
    /// Each namespace is handled independently: a failing pattern delete is
    /// recorded and the remaining namespaces are still processed.
    pub async fn invalidate_entity(&self, entity_id: &str) -> InvalidationReport {
        info!("Invalidating cache for entity: {}", entity_id);

        let mut deleted_keys = 0;
        let mut first_error = None;
        for namespace in &self.namespaces {
            let pattern = entity_pattern(namespace, entity_id);
            match self.store.try_delete_pattern(&pattern).await {
                Ok(deleted) => deleted_keys += deleted,
                Err(err) => {
                    error!("Error invalidating pattern {}: {}", pattern, err);
                    first_error.get_or_insert_with(|| err.to_string());
                }
            }
        }

        info!(
            "Invalidated {} cache entries for entity: {}",
            deleted_keys, entity_id
        );
        InvalidationReport {
            entity_id: entity_id.to_string(),
            deleted_keys,
            status: if first_error.is_some() {
                InvalidationStatus::Error
            } else {
                InvalidationStatus::Success
            },
            error: first_error,
            timestamp: Utc::now(),
        }
    }

    /// Invalidates each entity in turn, continuing past failures.
    pub async fn bulk_invalidate(&self, entity_ids: &[String]) -> BulkInvalidationReport {
        info!("Bulk invalidating cache for {} entities", entity_ids.len());

        let mut results = Vec::with_capacity(entity_ids.len());
        for entity_id in entity_ids {
            results.push(self.invalidate_entity(entity_id).await);
        }

        BulkInvalidationReport {
            total_entities: entity_ids.len(),
            total_deleted_keys: results.iter().map(|r| r.deleted_keys).sum(),
            results,
            timestamp: Utc::now(),
        }
    }
}
