mod exchange;
mod metrics;
mod resolver;

pub use exchange::ExchangeTransport;
pub use metrics::{MetricHandle, MetricRegistry, StatRegistry};
pub use resolver::{RecursiveResolver, Resolution};

// Re-export for convenience
pub use quill_dns_domain::QueryContext;
