use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle to one named counter. Cheap to clone; all operations are
/// lock-free and safe under concurrent hook execution.
#[derive(Debug, Clone)]
pub struct MetricHandle(Arc<AtomicU64>);

impl MetricHandle {
    pub fn new(cell: Arc<AtomicU64>) -> Self {
        Self(cell)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, by: u64) {
        self.0.fetch_add(by, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, value: u64) {
        self.0.store(value, Ordering::Relaxed);
    }
}

/// Named dynamic counters exposed to hook code.
pub trait MetricRegistry: Send + Sync {
    /// Look up a counter, creating it on first use.
    fn metric(&self, name: &str) -> MetricHandle;
}

/// Read-only named statistics published by the resolver.
pub trait StatRegistry: Send + Sync {
    fn stat(&self, name: &str) -> Option<u64>;
}
