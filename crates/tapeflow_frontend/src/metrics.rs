//! Stream Metrics
//!
//! Process-wide counters for the admin frontend. Lock-free atomics, read
//! through [`Metrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics instance
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    pub streams_opened: AtomicU64,
    pub streams_completed: AtomicU64,
    pub streams_failed: AtomicU64,
    pub records_streamed: AtomicU64,
    pub validation_failures: AtomicU64,
    pub bytes_pulled: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            streams_opened: AtomicU64::new(0),
            streams_completed: AtomicU64::new(0),
            streams_failed: AtomicU64::new(0),
            records_streamed: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            bytes_pulled: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn inc_streams_opened(&self) {
        self.streams_opened.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_streams_completed(&self) {
        self.streams_completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_streams_failed(&self) {
        self.streams_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_records_streamed(&self) {
        self.records_streamed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_bytes_pulled(&self, bytes: usize) {
        self.bytes_pulled.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            streams_opened: self.streams_opened.load(Ordering::Relaxed),
            streams_completed: self.streams_completed.load(Ordering::Relaxed),
            streams_failed: self.streams_failed.load(Ordering::Relaxed),
            records_streamed: self.records_streamed.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            bytes_pulled: self.bytes_pulled.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub streams_opened: u64,
    pub streams_completed: u64,
    pub streams_failed: u64,
    pub records_streamed: u64,
    pub validation_failures: u64,
    pub bytes_pulled: u64,
}

impl MetricsSnapshot {
    pub fn summary(&self) -> String {
        format!(
            "Streams: {} opened, {} completed, {} failed | Records: {} | \
             Validation failures: {} | Pulled: {} bytes",
            self.streams_opened,
            self.streams_completed,
            self.streams_failed,
            self.records_streamed,
            self.validation_failures,
            self.bytes_pulled,
        )
    }
}
