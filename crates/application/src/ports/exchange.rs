use async_trait::async_trait;
use bytes::Bytes;
use quill_dns_domain::HookError;
use std::net::SocketAddr;
use std::time::Duration;

/// One-shot external query/response transport used by the
/// outgoing-exchange followup.
#[async_trait]
pub trait ExchangeTransport: Send + Sync {
    async fn exchange(
        &self,
        dest: SocketAddr,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, HookError>;
}
