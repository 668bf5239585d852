//! In-process metrics.
//!
//! Counters and histograms are plain atomics; `GET /metrics` serves a
//! [`MetricsSnapshot`] of the global registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A value that is overwritten rather than accumulated.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latency histogram in milliseconds.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// `(upper bound, count)` per bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Dashboard metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    // HTTP
    pub dashboard_requests: Counter,
    pub analysis_requests: Counter,
    pub request_errors: Counter,

    // Upstream fetches
    pub upstream_fetches: Counter,
    pub upstream_errors: Counter,

    // Pipeline
    pub rows_loaded: Counter,
    pub rows_malformed: Counter,
    pub rows_dropped: Counter,
    pub dataset_rows: Gauge,

    // Latency histograms
    pub summary_latency_ms: Histogram,
    pub upstream_latency_ms: Histogram,
    pub load_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub dashboard_requests: u64,
    pub analysis_requests: u64,
    pub request_errors: u64,
    pub upstream_fetches: u64,
    pub upstream_errors: u64,
    pub rows_loaded: u64,
    pub rows_malformed: u64,
    pub rows_dropped: u64,
    pub dataset_rows: u64,
    pub summary_latency_mean_ms: f64,
    pub upstream_latency_mean_ms: f64,
    pub load_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            dashboard_requests: self.dashboard_requests.get(),
            analysis_requests: self.analysis_requests.get(),
            request_errors: self.request_errors.get(),
            upstream_fetches: self.upstream_fetches.get(),
            upstream_errors: self.upstream_errors.get(),
            rows_loaded: self.rows_loaded.get(),
            rows_malformed: self.rows_malformed.get(),
            rows_dropped: self.rows_dropped.get(),
            dataset_rows: self.dataset_rows.get(),
            summary_latency_mean_ms: self.summary_latency_ms.mean(),
            upstream_latency_mean_ms: self.upstream_latency_ms.mean(),
            load_latency_mean_ms: self.load_latency_ms.mean(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
