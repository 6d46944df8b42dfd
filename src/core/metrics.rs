//! Logger metrics for observability
//!
//! Counters shared by every logger derived from one configuration.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use leveled_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_written();
/// metrics.record_sampled_out();
///
/// assert_eq!(metrics.total_written(), 1);
/// assert_eq!(metrics.sampled_out(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records encoded and handed to every target sink
    total_written: AtomicU64,

    /// Records that passed the level gate but were dropped by the sampler
    sampled_out: AtomicU64,

    /// Failed sink writes or flushes
    write_errors: AtomicU64,

    /// Malformed key-value calls reported as diagnostic records
    malformed_calls: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_written: AtomicU64::new(0),
            sampled_out: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            malformed_calls: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_written(&self) -> u64 {
        self.total_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sampled_out(&self) -> u64 {
        self.sampled_out.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn malformed_calls(&self) -> u64 {
        self.malformed_calls.load(Ordering::Relaxed)
    }

    /// Record a written entry, returning the previous count
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.total_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sampled_out(&self) -> u64 {
        self.sampled_out.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_error(&self) -> u64 {
        self.write_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_malformed_call(&self) -> u64 {
        self.malformed_calls.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            total_written: AtomicU64::new(self.total_written()),
            sampled_out: AtomicU64::new(self.sampled_out()),
            write_errors: AtomicU64::new(self.write_errors()),
            malformed_calls: AtomicU64::new(self.malformed_calls()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.total_written(), 0);
        assert_eq!(metrics.sampled_out(), 0);
        assert_eq!(metrics.write_errors(), 0);
        assert_eq!(metrics.malformed_calls(), 0);
    }

    #[test]
    fn test_record_returns_previous() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_write_error(), 0);
        assert_eq!(metrics.record_write_error(), 1);
        assert_eq!(metrics.write_errors(), 2);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_written();

        let snapshot = metrics.clone();
        metrics.record_written();

        assert_eq!(snapshot.total_written(), 1);
        assert_eq!(metrics.total_written(), 2);
    }
}
