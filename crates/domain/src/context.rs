use crate::edns::EdnsView;
use crate::policy::AppliedPolicy;
use crate::record::{DnsRecord, RecordSection, RecordType};
use crate::validation::ValidationState;
use bytes::Bytes;
use rustc_hash::FxHashSet;
use std::net::SocketAddr;
use std::sync::Arc;

const DEFAULT_RECORD_TTL: u32 = 3600;

/// Followup work a hook may leave behind for the engine to drain after it
/// returns handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Followup {
    #[default]
    None,
    ChaseCname,
    SynthesizeAaaa,
    SynthesizePtr,
    OutgoingExchange,
}

/// The mutable per-query record threaded through every hook invocation for
/// one query. Owned by the resolver, borrowed by the engine for the
/// duration of each hook call; never reused across queries.
///
/// The query identity (name, type, transport, endpoints, validation state)
/// is read-only to hook code: the setters exist but silently ignore the
/// write, so callers that assign to them defensively keep working.
#[derive(Debug, Clone)]
pub struct QueryContext {
    qname: Arc<str>,
    qtype: RecordType,
    tcp: bool,
    local: SocketAddr,
    remote: SocketAddr,
    validation_state: ValidationState,
    edns: EdnsView,

    /// Result code for the stage, seeded by dispatch, read back after.
    pub rcode: i32,
    /// Classification tag assigned before resolution.
    pub tag: u32,
    /// Opaque per-query state shared between hooks of the same query.
    pub data: serde_json::Value,
    /// Marks the answer as client-dependent (never cacheable as-is).
    pub variable_answer: bool,
    /// Whether the query should still pass through policy filtering.
    pub wants_policy_filtering: bool,
    pub requestor_id: String,
    pub device_id: String,

    /// The record set for the current stage. Seeded from the resolver's
    /// buffer (or emptied) at every dispatch; authoritative for that stage
    /// only.
    pub records: Vec<DnsRecord>,

    policy_tags: Option<Vec<String>>,
    discarded_policies: Option<FxHashSet<String>>,
    pub applied_policy: AppliedPolicy,

    // Followup scratch, cleared at the start of every hook invocation.
    pub followup: Followup,
    pub followup_prefix: String,
    pub followup_name: String,
    pub exchange_dest: Option<SocketAddr>,
    pub exchange_query: Bytes,
    pub exchange_answer: Bytes,
    pub exchange_callback: String,
}

impl QueryContext {
    pub fn new(
        qname: impl Into<Arc<str>>,
        qtype: RecordType,
        tcp: bool,
        local: SocketAddr,
        remote: SocketAddr,
    ) -> Self {
        Self {
            qname: qname.into(),
            qtype,
            tcp,
            local,
            remote,
            validation_state: ValidationState::default(),
            edns: EdnsView::default(),
            rcode: 0,
            tag: 0,
            data: serde_json::Value::Null,
            variable_answer: false,
            wants_policy_filtering: false,
            requestor_id: String::new(),
            device_id: String::new(),
            records: Vec::new(),
            policy_tags: None,
            discarded_policies: None,
            applied_policy: AppliedPolicy::default(),
            followup: Followup::None,
            followup_prefix: String::new(),
            followup_name: String::new(),
            exchange_dest: None,
            exchange_query: Bytes::new(),
            exchange_answer: Bytes::new(),
            exchange_callback: String::new(),
        }
    }

    pub fn with_edns(mut self, edns: EdnsView) -> Self {
        self.edns = edns;
        self
    }

    pub fn with_validation_state(mut self, state: ValidationState) -> Self {
        self.validation_state = state;
        self
    }

    /// Enables the policy-tag destination for this query. Call sites that
    /// skip this leave tagging disabled: tag writes become no-ops.
    pub fn with_policy_tags(mut self) -> Self {
        self.policy_tags = Some(Vec::new());
        self
    }

    /// Enables the discarded-policy set for this query.
    pub fn with_discarded_policies(mut self) -> Self {
        self.discarded_policies = Some(FxHashSet::default());
        self
    }

    // Identity accessors.

    pub fn qname(&self) -> &str {
        &self.qname
    }

    pub fn qtype(&self) -> RecordType {
        self.qtype
    }

    pub fn is_tcp(&self) -> bool {
        self.tcp
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    pub fn validation_state(&self) -> ValidationState {
        self.validation_state
    }

    pub fn edns(&self) -> &EdnsView {
        &self.edns
    }

    // Identity setters: assignments are accepted and ignored so that hook
    // code written against a fully-writable record keeps working.

    pub fn set_qname(&mut self, _qname: &str) {}

    pub fn set_qtype(&mut self, _qtype: RecordType) {}

    pub fn set_tcp(&mut self, _tcp: bool) {}

    pub fn set_local_addr(&mut self, _addr: SocketAddr) {}

    pub fn set_remote_addr(&mut self, _addr: SocketAddr) {}

    pub fn set_validation_state(&mut self, _state: ValidationState) {}

    // Record helpers.

    /// Append a record. Owner name defaults to the query name, ttl to
    /// 3600 seconds.
    pub fn add_record(
        &mut self,
        rtype: RecordType,
        content: impl Into<String>,
        section: RecordSection,
        ttl: Option<u32>,
        name: Option<&str>,
    ) {
        let owner: Arc<str> = match name {
            Some(n) => n.into(),
            None => Arc::clone(&self.qname),
        };
        self.records.push(DnsRecord::new(
            owner,
            rtype,
            ttl.unwrap_or(DEFAULT_RECORD_TTL),
            section,
            content,
        ));
    }

    pub fn add_answer(
        &mut self,
        rtype: RecordType,
        content: impl Into<String>,
        ttl: Option<u32>,
        name: Option<&str>,
    ) {
        self.add_record(rtype, content, RecordSection::Answer, ttl, name);
    }

    // Policy tagging. All writes are gated on the optional destination:
    // when tagging is disabled for this call site nothing happens.

    pub fn add_policy_tag(&mut self, tag: impl Into<String>) {
        if let Some(tags) = &mut self.policy_tags {
            tags.push(tag.into());
        }
    }

    pub fn set_policy_tags(&mut self, new_tags: Vec<String>) {
        if let Some(tags) = &mut self.policy_tags {
            *tags = new_tags;
        }
    }

    pub fn policy_tags(&self) -> Option<&[String]> {
        self.policy_tags.as_deref()
    }

    pub fn take_policy_tags(&mut self) -> Option<Vec<String>> {
        self.policy_tags.take()
    }

    pub fn discard_policy(&mut self, name: impl Into<String>) {
        if let Some(discarded) = &mut self.discarded_policies {
            discarded.insert(name.into());
        }
    }

    pub fn discarded_policies(&self) -> Option<&FxHashSet<String>> {
        self.discarded_policies.as_ref()
    }

    /// Reset all followup scratch fields. Dispatch calls this
    /// unconditionally before invoking a hook so no followup state leaks
    /// between invocations.
    pub fn clear_followup(&mut self) {
        self.followup = Followup::None;
        self.followup_prefix.clear();
        self.followup_name.clear();
        self.exchange_dest = None;
        self.exchange_query = Bytes::new();
        self.exchange_answer = Bytes::new();
        self.exchange_callback.clear();
    }

    // Followup request helpers for hook code.

    pub fn request_cname_chase(&mut self) {
        self.followup = Followup::ChaseCname;
    }

    pub fn request_aaaa_synthesis(&mut self, prefix: impl Into<String>) {
        self.followup = Followup::SynthesizeAaaa;
        self.followup_prefix = prefix.into();
    }

    pub fn request_ptr_synthesis(&mut self, reverse_name: impl Into<String>) {
        self.followup = Followup::SynthesizePtr;
        self.followup_name = reverse_name.into();
    }

    /// Request one external query/response round trip. The continuation
    /// named by `callback` runs on the answer; it must replace or clear
    /// the followup, since a still-pending exchange followup requests
    /// another round trip.
    pub fn request_exchange(
        &mut self,
        dest: SocketAddr,
        query: impl Into<Bytes>,
        callback: impl Into<String>,
    ) {
        self.followup = Followup::OutgoingExchange;
        self.exchange_dest = Some(dest);
        self.exchange_query = query.into();
        self.exchange_callback = callback.into();
    }
}
