//! Bridge - connects surface events, the mapping engine and the output driver
//!
//! Every event runs to completion: decode → engine (under a single lock) →
//! status echo → driver send. Each page or group change echoes exactly one
//! status line. Driver failures are logged and never stop the bridge.


use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::drivers::OutputSink;
use crate::engine::{Dispatch, MappingEngine};
use crate::midi::{ElementEvent, MidiMessage};
use crate::state::SessionState;

/// Owns the engine and the output driver for one session
pub struct Bridge {
    /// Mapping engine; the lock serializes state changes across callers
    engine: Mutex<MappingEngine>,
    /// Output driver
    sink: Arc<dyn OutputSink>,
    /// Where operator status lines are echoed, one per change
    status_out: Option<Mutex<Box<dyn Write + Send>>>,
}

impl Bridge {
    /// Create a bridge that echoes status lines to stdout
    pub fn new(engine: MappingEngine, sink: Arc<dyn OutputSink>) -> Self {
        info!(
            "Bridge ready: layout {}, {} policy, output '{}'",
            engine.layout().name(),
            engine.policy_name(),
            sink.name()
        );

        Self {
            engine: Mutex::new(engine),
            sink,
            status_out: Some(Mutex::new(Box::new(io::stdout()))),
        }
    }

    /// Disable the status echo (status lines are still logged at debug)
    pub fn without_status_echo(mut self) -> Self {
        self.status_out = None;
        self
    }

    /// Echo status lines to `writer` instead of stdout
    pub fn with_status_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.status_out = Some(Mutex::new(Box::new(writer)));
        self
    }

    /// Snapshot of the session state
    pub fn session(&self) -> SessionState {
        self.engine.lock().session().clone()
    }

    /// Status line for the current state
    pub fn status_line(&self) -> String {
        self.engine.lock().status_line()
    }

    /// Print the current status line
    pub fn print_status(&self) {
        let line = self.status_line();
        self.emit_status(&line);
    }

    /// Process raw MIDI bytes from the surface
    ///
    /// Returns None when the bytes do not carry an element event.
    pub async fn on_midi_from_surface(&self, raw: &[u8]) -> Option<Dispatch> {
        let Some(message) = MidiMessage::parse(raw) else {
            trace!("Ignoring unparsable MIDI: {:02X?}", raw);
            return None;
        };

        self.on_message(&message).await
    }

    /// Process an already decoded MIDI message
    ///
    /// Returns None when the message does not address a surface element.
    pub async fn on_message(&self, message: &MidiMessage) -> Option<Dispatch> {
        let Some(event) = message.element_event() else {
            trace!("Ignoring non-element MIDI: {}", message);
            return None;
        };

        Some(self.on_element(event).await)
    }

    /// Process one element event
    pub async fn on_element(&self, event: ElementEvent) -> Dispatch {
        // The guard is dropped before any await
        let dispatch = self.engine.lock().handle(event);

        if let Some(line) = &dispatch.status {
            self.emit_status(line);
        }

        if let Some(message) = &dispatch.message {
            debug!("→ {} {}", self.sink.name(), message);
            if let Err(e) = self.sink.send(message).await {
                warn!("Failed to send {} via {}: {:#}", message, self.sink.name(), e);
            }
        }

        dispatch
    }

    /// Shut down the output driver
    pub async fn shutdown(&self) {
        if let Err(e) = self.sink.shutdown().await {
            warn!("Driver '{}' shutdown failed: {:#}", self.sink.name(), e);
        }
    }

    fn emit_status(&self, line: &str) {
        debug!("Status: {}", line);

        let Some(out) = &self.status_out else {
            return;
        };
        let mut out = out.lock();
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!("Failed to write status line: {}", e);
        }
    }
}
