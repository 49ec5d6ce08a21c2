//! Console driver - logs all outbound messages instead of sending them

use crate::drivers::OutputSink;
use crate::engine::OutboundMessage;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// ConsoleDriver logs every message it is given
///
/// Used by `--dry-run` to try mappings without a DAW listening, and by tests
/// to observe what the bridge emits.
pub struct ConsoleDriver {
    name: String,
    /// Messages received so far, in order
    sent: Arc<RwLock<Vec<OutboundMessage>>>,
}

impl ConsoleDriver {
    /// Create a new ConsoleDriver with a given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Copy of every message received so far
    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.read().await.clone()
    }

    /// Number of messages received so far
    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }
}

#[async_trait]
impl OutputSink for ConsoleDriver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let mut sent = self.sent.write().await;
        sent.push(message.clone());
        let count = sent.len();
        drop(sent);

        info!(
            "[{}] {} → {} [msg #{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.name,
            message,
            count
        );

        debug!(
            driver = %self.name,
            address = %message.address,
            payload = %message.payload,
            "ConsoleDriver send"
        );

        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        info!(
            "ConsoleDriver '{}' shutting down ({} messages logged)",
            self.name,
            self.sent_count().await
        );
        Ok(())
    }
}
