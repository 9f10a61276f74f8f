//! Dashboard Service
//!
//! Cached component lookups, composite dashboards assembled from them,
//! and the warming and invalidation entry points for a product.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::cache::{
    entity_key, warm_all, BulkInvalidationReport, CacheManager, Fetched, InvalidationReport,
    Invalidator, TtlClass, WarmTask, WarmingReport,
};
use crate::dashboard::component::{
    entity_namespaces, DASHBOARD_NAMESPACE, PRODUCT_DASHBOARD_NAMESPACE,
};
use crate::dashboard::{Component, DashboardQuery, Period};
use crate::source::AnalyticsSource;

/// Components refreshed by a warming run.
const WARMED_COMPONENTS: [Component; 6] = [
    Component::Summary,
    Component::WordCloud,
    Component::Timeline,
    Component::Distribution(Period::Year),
    Component::Distribution(Period::Month),
    Component::SentimentMap,
];

// == Layouts ==
/// Envelope field and the component that fills it.
struct Section {
    field: &'static str,
    component: Component,
}

const fn section(field: &'static str, component: Component) -> Section {
    Section { field, component }
}

/// Shape of a composite response.
struct Layout {
    namespace: &'static str,
    sections: &'static [Section],
    /// Extra `metadata.endpoint` marker
    endpoint: Option<&'static str>,
}

const DASHBOARD: Layout = Layout {
    namespace: DASHBOARD_NAMESPACE,
    sections: &[
        section("summary_statistics", Component::Summary),
        section("word_cloud", Component::WordCloud),
        section("sentiment_timeline", Component::Timeline),
        section("yearly_distribution", Component::Distribution(Period::Year)),
        section("monthly_distribution", Component::Distribution(Period::Month)),
        section("sentiment_map", Component::SentimentMap),
    ],
    endpoint: None,
};

const PRODUCT_DASHBOARD: Layout = Layout {
    namespace: PRODUCT_DASHBOARD_NAMESPACE,
    sections: &[
        section("summary_statistics", Component::Summary),
        section("word_cloud", Component::WordCloud),
        section("sentiment_timeline", Component::Timeline),
        section("sentiment_distribution", Component::Distribution(Period::Year)),
        section("sentiment_map", Component::SentimentMap),
        section("sentiment_pie", Component::SentimentPie),
    ],
    endpoint: Some("product-comprehensive"),
};

// == Dashboard Service ==
pub struct DashboardService {
    cache: CacheManager,
    invalidator: Invalidator,
    source: Arc<dyn AnalyticsSource>,
    warm_timeout: Duration,
}

impl DashboardService {
    pub fn new(
        cache: CacheManager,
        source: Arc<dyn AnalyticsSource>,
        warm_timeout: Duration,
    ) -> Self {
        let invalidator = Invalidator::new(cache.store().clone(), entity_namespaces());
        Self {
            cache,
            invalidator,
            source,
            warm_timeout,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Key of a component entry, scoped to the queried product.
    pub fn component_key(component: Component, query: &DashboardQuery) -> String {
        entity_key(
            component.namespace(),
            &query.parent_asin,
            &query.component_params(component.period()),
        )
    }

    /// Key of a composite entry in `namespace`.
    pub fn composite_key(namespace: &str, query: &DashboardQuery) -> String {
        entity_key(namespace, &query.parent_asin, &query.cache_params())
    }

    /// One component, served from cache or computed with the component TTL.
    pub async fn component(&self, component: Component, query: &DashboardQuery) -> Fetched {
        let key = Self::component_key(component, query);
        let ttl = self.cache.ttl(TtlClass::Component);
        self.cache
            .get_or_compute(&key, Some(ttl), || self.source.fetch(component, query))
            .await
    }

    /// Full dashboard: both distribution periods.
    pub async fn comprehensive(&self, query: &DashboardQuery) -> Value {
        self.composite(&DASHBOARD, query).await
    }

    /// Product dashboard: yearly distribution plus the sentiment pie.
    pub async fn product_comprehensive(&self, query: &DashboardQuery) -> Value {
        self.composite(&PRODUCT_DASHBOARD, query).await
    }

    /// Assembles a composite from concurrently fetched components.
    ///
    /// A failed component becomes a `null` section counted in
    /// `metadata.partial_failures`. Only a composite without failures is
    /// cached.
    async fn composite(&self, layout: &Layout, query: &DashboardQuery) -> Value {
        let key = Self::composite_key(layout.namespace, query);
        if let Some(cached) = self.cache.store().get(&key).await {
            info!("Returning cached {} data for {}", layout.namespace, query.parent_asin);
            return cached;
        }

        info!(
            "Cache miss - assembling {} for {}",
            layout.namespace, query.parent_asin
        );
        let results = join_all(
            layout
                .sections
                .iter()
                .map(|section| self.component(section.component, query)),
        )
        .await;

        let mut body = Map::new();
        body.insert(
            "product_info".to_string(),
            json!({
                "parent_asin": query.parent_asin,
                "filters": {
                    "start_date": query.start_date,
                    "end_date": query.end_date,
                    "cities": query.city_list(),
                },
            }),
        );

        let mut partial_failures = 0;
        for (section, result) in layout.sections.iter().zip(results) {
            let value = match result {
                Ok(value) => value.unwrap_or(Value::Null),
                Err(err) => {
                    error!(
                        "{} component {} failed for {}: {}",
                        layout.namespace, section.component, query.parent_asin, err
                    );
                    partial_failures += 1;
                    Value::Null
                }
            };
            body.insert(section.field.to_string(), value);
        }

        let mut metadata = json!({
            "generated_at": Utc::now(),
            "cache_key": key,
            "partial_failures": partial_failures,
            "total_components": layout.sections.len(),
        });
        if let Some(endpoint) = layout.endpoint {
            metadata["endpoint"] = json!(endpoint);
        }
        body.insert("metadata".to_string(), metadata);
        let body = Value::Object(body);

        if partial_failures == 0 {
            let ttl = self.cache.ttl(TtlClass::Default);
            if self.cache.store().set(&key, &body, Some(ttl)).await {
                info!("Cached {} data for {}", layout.namespace, query.parent_asin);
            }
        } else {
            warn!(
                "Not caching {} for {}: {} of {} components failed",
                layout.namespace,
                query.parent_asin,
                partial_failures,
                layout.sections.len()
            );
        }
        body
    }

    /// Pre-populates the component entries of a product concurrently.
    pub async fn warm(&self, query: &DashboardQuery) -> WarmingReport {
        let tasks = WARMED_COMPONENTS
            .into_iter()
            .map(|component| {
                WarmTask::new(component.name(), self.component(component, query).boxed())
            })
            .collect();
        warm_all(&query.parent_asin, tasks, self.warm_timeout).await
    }

    /// Drops every cached entry of a product.
    pub async fn invalidate(&self, parent_asin: &str) -> InvalidationReport {
        self.invalidator.invalidate_entity(parent_asin).await
    }

    pub async fn bulk_invalidate(&self, parent_asins: &[String]) -> BulkInvalidationReport {
        self.invalidator.bulk_invalidate(parent_asins).await
    }
}
