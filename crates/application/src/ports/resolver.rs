use async_trait::async_trait;
use quill_dns_domain::{DnsClass, DnsRecord, HookError, RecordType};

/// Outcome of one recursive/cache resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Status code as defined by the resolver; the engine passes it
    /// through verbatim.
    pub rcode: i32,
    pub records: Vec<DnsRecord>,
}

impl Resolution {
    pub fn new(rcode: i32, records: Vec<DnsRecord>) -> Self {
        Self { rcode, records }
    }
}

/// Boundary to the external resolution engine. The engine issues every
/// internal resolve with class IN.
#[async_trait]
pub trait RecursiveResolver: Send + Sync {
    async fn resolve(
        &self,
        name: &str,
        rtype: RecordType,
        class: DnsClass,
    ) -> Result<Resolution, HookError>;
}
