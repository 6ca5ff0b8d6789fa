use super::classifier::{ClassifierFn, ClassifierRequest, HeaderSummary, PacketFilterFn};
use crate::ports::{ExchangeTransport, RecursiveResolver};
use quill_dns_domain::{DnsRecord, EngineConfig, HookError, QueryContext, RecordType};
use rustc_hash::FxHashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// A bound hook: inspects and mutates the query context, returns whether
/// it handled the stage.
pub type HookFn = Arc<dyn Fn(&mut QueryContext) -> bool + Send + Sync>;

/// The named extension points of the resolution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    PreRpz,
    PreResolve,
    OnNodata,
    OnNxdomain,
    PostResolve,
    PreOutgoingQuery,
}

impl HookStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookStage::PreRpz => "pre-rpz",
            HookStage::PreResolve => "pre-resolve",
            HookStage::OnNodata => "on-nodata",
            HookStage::OnNxdomain => "on-nxdomain",
            HookStage::PostResolve => "post-resolve",
            HookStage::PreOutgoingQuery => "pre-outgoing-query",
        }
    }
}

/// What a dispatch reports back to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub handled: bool,
    pub rcode: i32,
}

/// Collects hook bindings before the pipeline is frozen. Each stage is
/// bound at most once; bindings cannot change after `build`.
pub struct HookPipelineBuilder {
    config: EngineConfig,
    pre_rpz: Option<HookFn>,
    pre_resolve: Option<HookFn>,
    on_nodata: Option<HookFn>,
    on_nxdomain: Option<HookFn>,
    post_resolve: Option<HookFn>,
    pre_outgoing_query: Option<HookFn>,
    packet_filter: Option<PacketFilterFn>,
    classifier: Option<ClassifierFn>,
    continuations: FxHashMap<String, HookFn>,
}

impl HookPipelineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            pre_rpz: None,
            pre_resolve: None,
            on_nodata: None,
            on_nxdomain: None,
            post_resolve: None,
            pre_outgoing_query: None,
            packet_filter: None,
            classifier: None,
            continuations: FxHashMap::default(),
        }
    }

    pub fn on_pre_rpz(mut self, hook: HookFn) -> Self {
        self.pre_rpz = Some(hook);
        self
    }

    pub fn on_pre_resolve(mut self, hook: HookFn) -> Self {
        self.pre_resolve = Some(hook);
        self
    }

    pub fn on_nodata(mut self, hook: HookFn) -> Self {
        self.on_nodata = Some(hook);
        self
    }

    pub fn on_nxdomain(mut self, hook: HookFn) -> Self {
        self.on_nxdomain = Some(hook);
        self
    }

    pub fn on_post_resolve(mut self, hook: HookFn) -> Self {
        self.post_resolve = Some(hook);
        self
    }

    pub fn on_pre_outgoing_query(mut self, hook: HookFn) -> Self {
        self.pre_outgoing_query = Some(hook);
        self
    }

    pub fn with_packet_filter(mut self, filter: PacketFilterFn) -> Self {
        self.packet_filter = Some(filter);
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierFn) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Register a continuation hook reachable by name from the
    /// outgoing-exchange followup.
    pub fn bind_continuation(mut self, name: impl Into<String>, hook: HookFn) -> Self {
        self.continuations.insert(name.into(), hook);
        self
    }

    pub fn build(
        self,
        resolver: Arc<dyn RecursiveResolver>,
        exchange: Arc<dyn ExchangeTransport>,
    ) -> HookPipeline {
        HookPipeline {
            config: self.config,
            pre_rpz: self.pre_rpz,
            pre_resolve: self.pre_resolve,
            on_nodata: self.on_nodata,
            on_nxdomain: self.on_nxdomain,
            post_resolve: self.post_resolve,
            pre_outgoing_query: self.pre_outgoing_query,
            packet_filter: self.packet_filter,
            classifier: self.classifier,
            continuations: self.continuations,
            resolver,
            exchange,
        }
    }
}

/// The frozen hook registry plus its collaborators. Immutable after
/// build: concurrent dispatch for independent queries needs no locking.
pub struct HookPipeline {
    pub(crate) config: EngineConfig,
    pre_rpz: Option<HookFn>,
    pre_resolve: Option<HookFn>,
    on_nodata: Option<HookFn>,
    on_nxdomain: Option<HookFn>,
    post_resolve: Option<HookFn>,
    pre_outgoing_query: Option<HookFn>,
    packet_filter: Option<PacketFilterFn>,
    classifier: Option<ClassifierFn>,
    continuations: FxHashMap<String, HookFn>,
    pub(crate) resolver: Arc<dyn RecursiveResolver>,
    pub(crate) exchange: Arc<dyn ExchangeTransport>,
}

impl HookPipeline {
    pub fn builder(config: EngineConfig) -> HookPipelineBuilder {
        HookPipelineBuilder::new(config)
    }

    fn stage_hook(&self, stage: HookStage) -> Option<&HookFn> {
        match stage {
            HookStage::PreRpz => self.pre_rpz.as_ref(),
            HookStage::PreResolve => self.pre_resolve.as_ref(),
            HookStage::OnNodata => self.on_nodata.as_ref(),
            HookStage::OnNxdomain => self.on_nxdomain.as_ref(),
            HookStage::PostResolve => self.post_resolve.as_ref(),
            HookStage::PreOutgoingQuery => self.pre_outgoing_query.as_ref(),
        }
    }

    pub fn is_bound(&self, stage: HookStage) -> bool {
        self.stage_hook(stage).is_some()
    }

    pub(crate) fn continuation(&self, name: &str) -> Option<HookFn> {
        self.continuations.get(name).cloned()
    }

    /// Dispatch the hook bound to `stage` against `ctx` with the
    /// resolver's current result code `ret`.
    ///
    /// When a buffer is supplied it seeds the context record set and, if
    /// the stage ends handled, receives the final record set back. The
    /// followup left by a handled hook is drained before returning; a
    /// followup chain that exceeds the configured cap is an error, not a
    /// truncation.
    pub async fn dispatch(
        &self,
        stage: HookStage,
        ctx: &mut QueryContext,
        ret: i32,
        mut buffer: Option<&mut Vec<DnsRecord>>,
    ) -> Result<DispatchOutcome, HookError> {
        match buffer.as_deref() {
            Some(buf) => ctx.records = buf.clone(),
            None => ctx.records.clear(),
        }
        ctx.clear_followup();
        ctx.rcode = ret;

        let hook = match self.stage_hook(stage) {
            Some(hook) => hook,
            None => {
                return Ok(DispatchOutcome {
                    handled: false,
                    rcode: ret,
                })
            }
        };

        if !hook(ctx) {
            debug!(stage = stage.as_str(), qname = %ctx.qname(), "Hook declined");
            return Ok(DispatchOutcome {
                handled: false,
                rcode: ret,
            });
        }

        let outcome = self.run_followups(ctx).await?;

        if outcome.handled {
            if let Some(buf) = buffer.as_deref_mut() {
                *buf = ctx.records.clone();
            }
        }

        Ok(outcome)
    }

    /// Dispatch for outgoing-query preparation. The context is built ad
    /// hoc: the nameserver about to be queried is the remote endpoint and
    /// the requestor is the local one; results travel through `records`.
    pub async fn dispatch_outgoing(
        &self,
        dest: SocketAddr,
        requestor: SocketAddr,
        qname: &str,
        qtype: RecordType,
        tcp: bool,
        records: &mut Vec<DnsRecord>,
        ret: i32,
    ) -> Result<DispatchOutcome, HookError> {
        let mut ctx = QueryContext::new(qname, qtype, tcp, requestor, dest);
        self.dispatch(HookStage::PreOutgoingQuery, &mut ctx, ret, Some(records))
            .await
    }

    /// Early packet admission, evaluated before any query context exists.
    /// Unbound (or disabled) means never block.
    pub fn should_block(
        &self,
        remote: SocketAddr,
        local: SocketAddr,
        header: &HeaderSummary,
    ) -> bool {
        if !self.config.packet_filter_enabled {
            return false;
        }
        match &self.packet_filter {
            Some(filter) => filter(remote, local, header),
            None => false,
        }
    }

    /// Classify an inbound query before resolution begins.
    ///
    /// Returned tag strings append to `policy_tags` only when the caller
    /// supplied a destination; without one they are computed and
    /// discarded. The remaining outputs overwrite context values only
    /// when the classifier actually produced them.
    pub fn classify(
        &self,
        request: &ClassifierRequest<'_>,
        policy_tags: Option<&mut Vec<String>>,
        ctx: &mut QueryContext,
    ) -> u32 {
        if !self.config.classifier_enabled {
            return 0;
        }
        let classifier = match &self.classifier {
            Some(classifier) => classifier,
            None => return 0,
        };

        let result = classifier(request);

        if let (Some(dest), Some(tags)) = (policy_tags, result.policy_tags) {
            dest.extend(tags);
        }
        if let Some(data) = result.data {
            ctx.data = data;
        }
        if let Some(requestor_id) = result.requestor_id {
            ctx.requestor_id = requestor_id;
        }
        if let Some(device_id) = result.device_id {
            ctx.device_id = device_id;
        }
        ctx.tag = result.tag;
        result.tag
    }
}
