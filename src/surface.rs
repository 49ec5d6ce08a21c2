//! Control-surface input
//!
//! Opens the configured MIDI input port and forwards every incoming message to
//! a single consumer through a channel. The midir callback runs on the MIDI
//! driver's own thread and never blocks.

use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{MidiConfig, PortMatch};
use crate::midi::{format_hex, MidiMessage};

/// Capacity of the event channel between the MIDI thread and the bridge
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// MIDI event from the surface
#[derive(Debug, Clone)]
pub struct SurfaceEvent {
    pub timestamp: Instant,
    pub message: MidiMessage,
    pub raw_data: Vec<u8>,
}

/// Errors opening the surface
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("No input {name} device found (available: {})", format_available(.available))]
    DeviceNotFound { name: String, available: Vec<String> },

    #[error("Failed to create MIDI input: {0}")]
    Init(#[from] midir::InitError),

    #[error("Failed to connect to input port {port}: {reason}")]
    Connect { port: String, reason: String },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

/// Whether a discovered port name satisfies the configured name
pub fn port_matches(candidate: &str, wanted: &str, mode: PortMatch) -> bool {
    match mode {
        PortMatch::Exact => candidate == wanted,
        PortMatch::Contains => candidate.to_lowercase().contains(&wanted.to_lowercase()),
    }
}

/// Input side of the control surface
pub struct SurfaceInput {
    /// MIDI input connection, kept alive while connected
    input_conn: Option<MidiInputConnection<()>>,

    /// Event sender for incoming MIDI
    event_tx: mpsc::Sender<SurfaceEvent>,

    /// Event receiver
    event_rx: Option<mpsc::Receiver<SurfaceEvent>>,

    /// Configured port name
    port_name: String,

    /// How `port_name` is matched
    port_match: PortMatch,
}

impl SurfaceInput {
    /// Create a new, unconnected surface input
    pub fn new(config: &MidiConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            input_conn: None,
            event_tx,
            event_rx: Some(event_rx),
            port_name: config.input_port.clone(),
            port_match: config.port_match,
        }
    }

    /// Find the configured input port
    fn find_input_port(&self, midi_in: &MidiInput) -> Option<(MidiInputPort, String)> {
        for port in midi_in.ports() {
            if let Ok(name) = midi_in.port_name(&port) {
                if port_matches(&name, &self.port_name, self.port_match) {
                    debug!("Found port '{}' matching '{}'", name, self.port_name);
                    return Some((port, name));
                }
            }
        }
        None
    }

    /// Open the configured device. Returns the name of the opened port.
    pub fn connect(&mut self) -> Result<String, SurfaceError> {
        self.disconnect();

        info!("Connecting to MIDI input '{}' ({:?} match)", self.port_name, self.port_match);

        let midi_in = MidiInput::new("nanokontrol-osc-input")?;
        debug!("Found {} MIDI input ports", midi_in.port_count());

        let Some((in_port, port_name)) = self.find_input_port(&midi_in) else {
            let available = discovery::discover_input_ports()
                .map(|ports| ports.into_iter().map(|p| p.name).collect())
                .unwrap_or_default();
            return Err(SurfaceError::DeviceNotFound {
                name: self.port_name.clone(),
                available,
            });
        };

        let event_tx = self.event_tx.clone();

        let input_conn = midi_in
            .connect(
                &in_port,
                "nanokontrol-osc",
                move |_timestamp, data, _| {
                    let Some(message) = MidiMessage::parse(data) else {
                        debug!("Failed to parse MIDI: {}", format_hex(data));
                        return;
                    };

                    let event = SurfaceEvent {
                        timestamp: Instant::now(),
                        message,
                        raw_data: data.to_vec(),
                    };

                    // Never block the MIDI thread
                    if event_tx.try_send(event).is_err() {
                        warn!("Surface event queue full or closed, dropping {}", format_hex(data));
                    }
                },
                (),
            )
            .map_err(|e| SurfaceError::Connect {
                port: port_name.clone(),
                reason: e.to_string(),
            })?;

        self.input_conn = Some(input_conn);
        info!("Connected to input port: {}", port_name);

        Ok(port_name)
    }

    /// Close the input port
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.input_conn.take() {
            conn.close();
            info!("MIDI input disconnected");
        }
    }

    /// Take the event receiver (for the bridge loop to consume)
    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<SurfaceEvent>> {
        self.event_rx.take()
    }
}

impl Drop for SurfaceInput {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Port discovery utilities
pub mod discovery {
    use super::*;

    /// Information about a MIDI port
    #[derive(Debug, Clone)]
    pub struct PortInfo {
        pub index: usize,
        pub name: String,
    }

    /// Discover input ports
    pub fn discover_input_ports() -> Result<Vec<PortInfo>, SurfaceError> {
        let midi_in = MidiInput::new("nanokontrol-osc-discovery")?;

        Ok(midi_in
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(index, port)| {
                midi_in
                    .port_name(port)
                    .ok()
                    .map(|name| PortInfo { index, name })
            })
            .collect())
    }
}
