//! OSC driver - encodes messages with rosc and sends them over UDP

use crate::drivers::OutputSink;
use crate::engine::OutboundMessage;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rosc::{encoder, OscMessage, OscPacket};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, info};

/// Sends each message as one OSC packet to a fixed destination
pub struct OscDriver {
    socket: UdpSocket,
    target: SocketAddr,
    sent: AtomicU64,
}

impl OscDriver {
    /// Resolve `target` (`host:port`) and bind a local socket for sending
    pub async fn connect(target: &str) -> Result<Self> {
        let target = lookup_host(target)
            .await
            .with_context(|| format!("Failed to resolve OSC target: {}", target))?
            .next()
            .ok_or_else(|| anyhow!("OSC target '{}' resolved to no address", target))?;

        let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .context("Failed to bind OSC socket")?;

        info!("OSC output → {}", target);

        Ok(Self {
            socket,
            target,
            sent: AtomicU64::new(0),
        })
    }

    /// Number of packets sent so far
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Encode a message as an OSC packet
    pub fn encode(message: &OutboundMessage) -> Result<Vec<u8>> {
        let packet = OscPacket::Message(OscMessage {
            addr: message.address.clone(),
            args: vec![message.payload.to_osc()],
        });

        encoder::encode(&packet).map_err(|e| anyhow!("Failed to encode OSC packet: {:?}", e))
    }
}

#[async_trait]
impl OutputSink for OscDriver {
    fn name(&self) -> &str {
        "osc"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let buf = Self::encode(message)?;

        self.socket
            .send_to(&buf, self.target)
            .await
            .with_context(|| format!("Failed to send {} to {}", message.address, self.target))?;

        self.sent.fetch_add(1, Ordering::Relaxed);
        debug!("OSC sent: {}", message);
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        info!("OSC driver shutting down ({} packets sent)", self.sent_count());
        Ok(())
    }
}
