//! Output drivers (OSC over UDP, console)
//!
//! A driver receives the messages produced by the mapping engine and delivers
//! them. Delivery is fire-and-forget: the bridge logs driver errors and carries
//! on with the next event.

use anyhow::Result;
use async_trait::async_trait;

use crate::engine::OutboundMessage;

/// Output sink trait - all outbound transports implement this
///
/// Note: All methods take &self (not &mut self) to support Arc<dyn OutputSink>.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Get the driver name (e.g., "osc", "console")
    fn name(&self) -> &str;

    /// Deliver one message
    async fn send(&self, message: &OutboundMessage) -> Result<()>;

    /// Release resources. Default: nothing to release.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

pub mod console;
pub mod osc;

pub use console::ConsoleDriver;
pub use osc::OscDriver;
