use ipnetwork::IpNetwork;
use quill_dns_domain::{EdnsOption, RecordType};
use std::net::SocketAddr;
use std::sync::Arc;

/// Header-level view of an inbound packet, available before any query
/// context exists. The packet filter sees nothing deeper than this.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSummary {
    pub id: u16,
    pub opcode: u8,
    pub response: bool,
    pub recursion_desired: bool,
    pub checking_disabled: bool,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

/// Early admission predicate: `true` means drop the packet.
pub type PacketFilterFn =
    Arc<dyn Fn(SocketAddr, SocketAddr, &HeaderSummary) -> bool + Send + Sync>;

/// Inputs to the query classifier.
#[derive(Debug, Clone)]
pub struct ClassifierRequest<'a> {
    pub remote: SocketAddr,
    pub client_subnet: Option<IpNetwork>,
    pub local: SocketAddr,
    pub qname: &'a str,
    pub qtype: RecordType,
    pub edns_options: &'a [EdnsOption],
    pub tcp: bool,
}

/// Classifier output. Optional fields that come back `None` leave the
/// corresponding context values untouched.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub tag: u32,
    pub policy_tags: Option<Vec<String>>,
    pub data: Option<serde_json::Value>,
    pub requestor_id: Option<String>,
    pub device_id: Option<String>,
}

pub type ClassifierFn = Arc<dyn Fn(&ClassifierRequest<'_>) -> Classification + Send + Sync>;
