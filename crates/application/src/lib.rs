//! Quill DNS application layer: the collaborator ports and the hook
//! pipeline, followup resolver, and query classifier.
pub mod engine;
pub mod ports;

pub use engine::{
    Classification, ClassifierFn, ClassifierRequest, DispatchOutcome, HeaderSummary, HookFn,
    HookPipeline, HookPipelineBuilder, HookStage, PacketFilterFn,
};
pub use ports::{
    ExchangeTransport, MetricHandle, MetricRegistry, RecursiveResolver, Resolution, StatRegistry,
};
