use dashmap::DashMap;
use quill_dns_application::ports::{MetricHandle, MetricRegistry, StatRegistry};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Named dynamic counters, created on first lookup. Handles stay valid
/// for the registry's lifetime and increment without locking.
pub struct DynMetrics {
    counters: DashMap<Arc<str>, Arc<AtomicU64>, FxBuildHasher>,
}

impl DynMetrics {
    pub fn new() -> Self {
        Self {
            counters: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl Default for DynMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry for DynMetrics {
    fn metric(&self, name: &str) -> MetricHandle {
        let cell = self
            .counters
            .entry(Arc::from(name))
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone();
        MetricHandle::new(cell)
    }
}

/// Read-only statistics snapshots published by the resolver.
pub struct SharedStats {
    values: DashMap<Arc<str>, Arc<AtomicU64>, FxBuildHasher>,
}

impl SharedStats {
    pub fn new() -> Self {
        Self {
            values: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Publish or update a named snapshot value.
    pub fn publish(&self, name: &str, value: u64) {
        self.values
            .entry(Arc::from(name))
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .store(value, Ordering::Relaxed);
    }
}

impl Default for SharedStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatRegistry for SharedStats {
    fn stat(&self, name: &str) -> Option<u64> {
        self.values.get(name).map(|v| v.load(Ordering::Relaxed))
    }
}
