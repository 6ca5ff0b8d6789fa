mod registry;

pub use registry::{DynMetrics, SharedStats};
