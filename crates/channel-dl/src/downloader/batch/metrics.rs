//! Per-batch summaries and downloader-lifetime metrics
//!
//! `BatchSummary` describes one batch and is returned to the caller.
//! `DownloadMetrics` accumulates across every batch run by one downloader.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// One item that did not make it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    /// 1-based position in the enumerated list
    pub index: usize,
    pub item: String,
    pub error: String,
}

/// Outcome of a single batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Raw entries returned by enumeration, empty ones included
    pub total_listed: usize,
    /// Non-empty items the batch started on
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Empty entries that were skipped
    pub skipped_empty: usize,
    /// Title log appends that failed (non-fatal)
    pub log_write_failures: usize,
    pub retries_attempted: usize,
    /// The batch stopped early because it was cancelled
    pub cancelled: bool,
    pub failures: Vec<ItemFailure>,
}

impl BatchSummary {
    pub fn new(total_listed: usize) -> Self {
        Self {
            total_listed,
            ..Self::default()
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub(crate) fn record_failure(&mut self, index: usize, item: &str, error: String) {
        self.attempted += 1;
        self.failed += 1;
        self.failures.push(ItemFailure {
            index,
            item: item.to_string(),
            error,
        });
    }

    /// Calculate success rate (0.0 to 1.0) over attempted items
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted as f64
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Counters across every batch run by one downloader
#[derive(Debug, Default)]
pub struct DownloadMetrics {
    pub batches_started: AtomicU64,
    pub batches_failed: AtomicU64,
    pub items_attempted: AtomicU64,
    pub items_succeeded: AtomicU64,
    pub items_failed: AtomicU64,
    pub retries_attempted: AtomicU64,
    pub log_write_failures: AtomicU64,
}

impl DownloadMetrics {
    pub fn record_batch_started(&self) {
        self.batches_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold a finished batch into the lifetime counters
    pub fn record_summary(&self, summary: &BatchSummary) {
        self.items_attempted.fetch_add(summary.attempted as u64, Ordering::Relaxed);
        self.items_succeeded.fetch_add(summary.succeeded as u64, Ordering::Relaxed);
        self.items_failed.fetch_add(summary.failed as u64, Ordering::Relaxed);
        self.retries_attempted.fetch_add(summary.retries_attempted as u64, Ordering::Relaxed);
        self.log_write_failures.fetch_add(summary.log_write_failures as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> DownloadMetricsSnapshot {
        DownloadMetricsSnapshot {
            batches_started: self.batches_started.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            items_attempted: self.items_attempted.load(Ordering::Relaxed),
            items_succeeded: self.items_succeeded.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
            retries_attempted: self.retries_attempted.load(Ordering::Relaxed),
            log_write_failures: self.log_write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of download metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadMetricsSnapshot {
    pub batches_started: u64,
    pub batches_failed: u64,
    pub items_attempted: u64,
    pub items_succeeded: u64,
    pub items_failed: u64,
    pub retries_attempted: u64,
    pub log_write_failures: u64,
}

impl DownloadMetricsSnapshot {
    /// Calculate success rate as a percentage (0.0 to 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.items_attempted == 0 {
            0.0
        } else {
            self.items_succeeded as f64 / self.items_attempted as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::new(4);
        summary.skipped_empty = 1;
        summary.record_success();
        summary.record_failure(2, "https://y/2", "Failed to download".to_string());

        assert_eq!(summary.attempted, 2);
        assert!(summary.has_failures());
        assert_eq!(summary.success_rate(), 0.5);
    }

    #[test]
    fn test_summary_json_shape() {
        let mut summary = BatchSummary::new(2);
        summary.record_failure(1, "https://y/1", "Private video".to_string());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_listed"], 2);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["cancelled"], false);
        assert_eq!(json["failures"][0]["item"], "https://y/1");
    }

    #[test]
    fn test_metrics_accumulate_summaries() {
        let metrics = DownloadMetrics::default();
        let mut summary = BatchSummary::new(3);
        summary.record_success();
        summary.record_success();
        summary.retries_attempted = 1;

        metrics.record_batch_started();
        metrics.record_summary(&summary);
        metrics.record_batch_started();
        metrics.record_summary(&summary);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_started, 2);
        assert_eq!(snapshot.items_succeeded, 4);
        assert_eq!(snapshot.retries_attempted, 2);
        assert_eq!(snapshot.success_rate(), 1.0);
    }
}
