//! Quill DNS infrastructure layer: concrete adapters behind the
//! application ports.
pub mod exchange;
pub mod metrics;

pub use exchange::UdpExchange;
pub use metrics::{DynMetrics, SharedStats};
