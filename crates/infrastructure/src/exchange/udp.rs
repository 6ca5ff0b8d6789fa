//! One-shot UDP exchange used by the outgoing-exchange followup.
//!
//! Messages are sent as-is (no framing). The reply buffer allows for
//! EDNS(0)-sized responses; anything larger is truncated by the network
//! layer and is the continuation hook's problem.

use async_trait::async_trait;
use bytes::Bytes;
use quill_dns_application::ports::ExchangeTransport;
use quill_dns_domain::HookError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpExchange;

impl UdpExchange {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UdpExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExchangeTransport for UdpExchange {
    async fn exchange(
        &self,
        dest: SocketAddr,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, HookError> {
        // Bind to an ephemeral port matching the destination family.
        let bind_addr: SocketAddr = if dest.is_ipv4() {
            (IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0).into()
        } else {
            (IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| HookError::ExchangeFailure {
                dest: dest.to_string(),
                reason: format!("bind failed: {}", e),
            })?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send_to(request, dest))
            .await
            .map_err(|_| HookError::ExchangeFailure {
                dest: dest.to_string(),
                reason: "send timed out".to_string(),
            })?
            .map_err(|e| HookError::ExchangeFailure {
                dest: dest.to_string(),
                reason: format!("send failed: {}", e),
            })?;

        debug!(dest = %dest, bytes_sent = bytes_sent, "Exchange query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let (bytes_received, from_addr) =
            tokio::time::timeout(timeout, socket.recv_from(&mut recv_buf))
                .await
                .map_err(|_| HookError::ExchangeFailure {
                    dest: dest.to_string(),
                    reason: "response timed out".to_string(),
                })?
                .map_err(|e| HookError::ExchangeFailure {
                    dest: dest.to_string(),
                    reason: format!("receive failed: {}", e),
                })?;

        if from_addr.ip() != dest.ip() {
            warn!(
                expected = %dest,
                received_from = %from_addr,
                "Exchange response from unexpected source"
            );
        }

        recv_buf.truncate(bytes_received);

        debug!(dest = %dest, bytes_received = bytes_received, "Exchange response received");

        Ok(Bytes::from(recv_buf))
    }
}
