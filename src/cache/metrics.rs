//! Performance Metrics Module
//!
//! Pure classifiers turning store stats into qualitative health signals for
//! the operations dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{StoreStats, StoreStatus};

/// Cache efficiency tier by hit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Efficiency {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Efficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Efficiency::Excellent => "excellent",
            Efficiency::Good => "good",
            Efficiency::Fair => "fair",
            Efficiency::Poor => "poor",
        }
    }
}

/// Coarse memory usage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCategory {
    Low,
    Medium,
    High,
    Unknown,
}

impl MemoryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Low => "low",
            MemoryCategory::Medium => "medium",
            MemoryCategory::High => "high",
            MemoryCategory::Unknown => "unknown",
        }
    }
}

/// Overall store health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceStatus {
    Optimal,
    Good,
    Degraded,
    Poor,
    Offline,
}

impl PerformanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceStatus::Optimal => "optimal",
            PerformanceStatus::Good => "good",
            PerformanceStatus::Degraded => "degraded",
            PerformanceStatus::Poor => "poor",
            PerformanceStatus::Offline => "offline",
        }
    }
}

/// `>=80` excellent, `>=60` good, `>=40` fair, otherwise poor.
pub fn efficiency(hit_rate: f64) -> Efficiency {
    if hit_rate >= 80.0 {
        Efficiency::Excellent
    } else if hit_rate >= 60.0 {
        Efficiency::Good
    } else if hit_rate >= 40.0 {
        Efficiency::Fair
    } else {
        Efficiency::Poor
    }
}

/// Buckets a human readable size (`512K`, `75.3M`, `2G`).
///
/// Megabytes split at 50 and 100; kilobytes are low and gigabytes high.
/// Suffixes are upper case. Anything else, including a bare byte count, is
/// unknown.
pub fn memory_category(used_memory: &str) -> MemoryCategory {
    let text = used_memory.trim();
    let Some(suffix) = text.chars().last() else {
        return MemoryCategory::Unknown;
    };
    let Ok(amount) = text[..text.len() - suffix.len_utf8()].trim().parse::<f64>() else {
        return MemoryCategory::Unknown;
    };
    if !amount.is_finite() {
        return MemoryCategory::Unknown;
    }

    match suffix {
        'K' => MemoryCategory::Low,
        'G' => MemoryCategory::High,
        'M' if amount > 100.0 => MemoryCategory::High,
        'M' if amount > 50.0 => MemoryCategory::Medium,
        'M' => MemoryCategory::Low,
        _ => MemoryCategory::Unknown,
    }
}

/// Offline unless connected; otherwise graded by hit rate and client count.
pub fn performance_status(stats: &StoreStats) -> PerformanceStatus {
    if stats.status != StoreStatus::Connected {
        return PerformanceStatus::Offline;
    }

    let hit_rate = stats.hit_rate;
    if hit_rate >= 70.0 && stats.connected_clients > 0 {
        PerformanceStatus::Optimal
    } else if hit_rate >= 50.0 {
        PerformanceStatus::Good
    } else if hit_rate >= 30.0 {
        PerformanceStatus::Degraded
    } else {
        PerformanceStatus::Poor
    }
}

// == Performance Metrics ==
/// Store stats enriched with the derived signals.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    #[serde(flatten)]
    pub stats: StoreStats,
    pub cache_efficiency: Efficiency,
    pub memory_usage_category: MemoryCategory,
    pub performance_status: PerformanceStatus,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceMetrics {
    pub fn from_stats(stats: StoreStats) -> Self {
        Self {
            cache_efficiency: efficiency(stats.hit_rate),
            memory_usage_category: memory_category(
                stats.used_memory.as_deref().unwrap_or("0B"),
            ),
            performance_status: performance_status(&stats),
            stats,
            timestamp: Utc::now(),
        }
    }
}
