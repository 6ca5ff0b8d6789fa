mod classifier;
mod followup;
mod pipeline;

pub use classifier::{
    Classification, ClassifierFn, ClassifierRequest, HeaderSummary, PacketFilterFn,
};
pub use pipeline::{DispatchOutcome, HookFn, HookPipeline, HookPipelineBuilder, HookStage};
