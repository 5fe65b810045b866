use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Process-lifetime counters, sampled by the health endpoint.
#[derive(Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    updates_processed: AtomicU64,
    handler_errors: AtomicU64,
    reloads_applied: AtomicU64,
    posts_fired: AtomicU64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub updates_processed: u64,
    pub handler_errors: u64,
    pub reloads_applied: u64,
    pub posts_fired: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_update(&self) {
        self.inner.updates_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_error(&self) {
        self.inner.handler_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reload(&self) {
        self.inner.reloads_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_post_fired(&self) {
        self.inner.posts_fired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            updates_processed: self.inner.updates_processed.load(Ordering::Relaxed),
            handler_errors: self.inner.handler_errors.load(Ordering::Relaxed),
            reloads_applied: self.inner.reloads_applied.load(Ordering::Relaxed),
            posts_fired: self.inner.posts_fired.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.record_update();
        metrics.record_update();
        metrics.record_handler_error();

        let snap = metrics.snapshot();
        assert_eq!(snap.updates_processed, 2);
        assert_eq!(snap.handler_errors, 1);
        assert_eq!(snap.reloads_applied, 0);
    }

    #[test]
    fn test_shared_across_clones() {
        let metrics = Metrics::new();
        let clone = metrics.clone();
        clone.record_reload();
        assert_eq!(metrics.snapshot().reloads_applied, 1);
    }
}
