//! Cache Warming Module
//!
//! Fan-out / gather with partial failure: every named sub-task runs
//! concurrently, one failure never cancels the others, and the report is
//! built only once all of them have settled.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{join_all, BoxFuture};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::manager::Fetched;

/// A named cache-filling operation.
pub struct WarmTask<'a> {
    pub name: String,
    pub run: BoxFuture<'a, Fetched>,
}

impl<'a> WarmTask<'a> {
    pub fn new(name: impl Into<String>, run: BoxFuture<'a, Fetched>) -> Self {
        Self {
            name: name.into(),
            run,
        }
    }
}

/// Counts of a warming run.
#[derive(Debug, Clone, Serialize)]
pub struct WarmingReport {
    pub entity_id: String,
    pub successful: usize,
    pub failed: usize,
    pub total: usize,
    /// Set when the fan-out as a whole could not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Runs every task concurrently and counts outcomes.
///
/// An empty value counts as success: the producer ran, there was just no data.
/// If the whole fan-out exceeds `limit`, the run reports `successful = 0`,
/// `failed = total` with the timeout as its error.
pub async fn warm_all(entity_id: &str, tasks: Vec<WarmTask<'_>>, limit: Duration) -> WarmingReport {
    info!("Starting cache warming for entity: {}", entity_id);

    let total = tasks.len();
    let (names, runs): (Vec<String>, Vec<_>) =
        tasks.into_iter().map(|task| (task.name, task.run)).unzip();

    let outcomes = match tokio::time::timeout(limit, join_all(runs)).await {
        Ok(outcomes) => outcomes,
        Err(_) => {
            let message = format!("cache warming timed out after {:?}", limit);
            error!("Error during cache warming for {}: {}", entity_id, message);
            return WarmingReport {
                entity_id: entity_id.to_string(),
                successful: 0,
                failed: total,
                total,
                error: Some(message),
                timestamp: Utc::now(),
            };
        }
    };

    let mut failed = 0;
    for (name, outcome) in names.iter().zip(&outcomes) {
        if let Err(err) = outcome {
            warn!("Warming task {} failed for {}: {}", name, entity_id, err);
            failed += 1;
        }
    }
    let successful = total - failed;

    info!(
        "Cache warming completed for {}: {} successful, {} failed",
        entity_id, successful, failed
    );
    WarmingReport {
        entity_id: entity_id.to_string(),
        successful,
        failed,
        total,
        error: None,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProducerError;
    use futures::FutureExt;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ok_task(name: &str) -> WarmTask<'static> {
        WarmTask::new(name, async { Ok(Some(json!(1))) }.boxed())
    }

    fn failing_task(name: &str) -> WarmTask<'static> {
        WarmTask::new(name, async { Err(ProducerError::msg("pipeline failed")) }.boxed())
    }

    #[tokio::test]
    async fn test_partial_failures_are_counted() {
        let tasks = vec![
            ok_task("summary"),
            failing_task("wordcloud"),
            ok_task("timeline"),
            ok_task("distribution_year"),
            failing_task("distribution_month"),
            ok_task("sentiment_map"),
        ];

        let report = warm_all("B001", tasks, Duration::from_secs(5)).await;

        assert_eq!(report.successful, 4);
        assert_eq!(report.failed, 2);
        assert_eq!(report.total, 6);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_results_count_as_success() {
        let tasks = vec![WarmTask::new("summary", async { Ok(None) }.boxed())];

        let report = warm_all("B001", tasks, Duration::from_secs(5)).await;
        assert_eq!(report.successful, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_tasks_run_concurrently() {
        let started = AtomicUsize::new(0);
        let started = &started;
        let tasks: Vec<WarmTask<'_>> = (0..3)
            .map(|i| {
                WarmTask::new(
                    format!("task{}", i),
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(Some(json!(i)))
                    }
                    .boxed(),
                )
            })
            .collect();

        let begin = std::time::Instant::now();
        let report = warm_all("B001", tasks, Duration::from_secs(5)).await;

        assert_eq!(report.successful, 3);
        assert_eq!(started.load(Ordering::SeqCst), 3);
        assert!(begin.elapsed() < Duration::from_millis(280));
    }

    #[tokio::test]
    async fn test_timeout_reports_total_failure() {
        let tasks = vec![
            ok_task("summary"),
            WarmTask::new(
                "timeline",
                async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(None)
                }
                .boxed(),
            ),
        ];

        let report = warm_all("B001", tasks, Duration::from_millis(50)).await;

        assert_eq!(report.successful, 0);
        assert_eq!(report.failed, 2);
        assert_eq!(report.total, 2);
        assert!(report.error.unwrap().contains("timed out"));
    }
}
