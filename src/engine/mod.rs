//! Mapping engine - turns surface element events into outbound OSC messages
//!
//! The engine owns the session state (page, active group, aliases) and decides,
//! for each `(element, value)` event:
//! - whether it changes the page or the active group
//! - which address and payload to emit, if any
//! - which status line to show the operator
//!
//! It performs no I/O; the bridge hands its output to a driver.

mod page;
pub mod policy;

#[cfg(test)]
mod tests;

use anyhow::Result;
use rosc::OscType;
use std::fmt;
use tracing::{debug, trace};

use crate::aliases::AliasTable;
use crate::config::{AppConfig, EngineMode, PayloadFormat, TransportTrigger};
use crate::layout::{
    BankKind, ControllerLayout, ElementClass, TransportCommand, BUTTON_PRESSED,
};
use crate::midi::{convert, ElementEvent};
use crate::state::{GroupToken, SessionState};

pub use policy::{DirectPolicy, GroupedPolicy, MappingPolicy};

/// Numeric payload of an outbound message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    Int(i32),
    Float(f32),
}

impl Payload {
    /// Rescale a 7-bit input value onto 0..=255 in the requested format
    pub fn from_7bit(value: u8, format: PayloadFormat) -> Self {
        match format {
            PayloadFormat::Int => Payload::Int(convert::to_8bit_rounded(value) as i32),
            PayloadFormat::Float => Payload::Float(convert::scale_7bit_to_8bit(value)),
        }
    }

    /// Constant full-scale payload (255) used by transport commands
    pub fn full_scale(format: PayloadFormat) -> Self {
        match format {
            PayloadFormat::Int => Payload::Int(convert::MAX_8BIT as i32),
            PayloadFormat::Float => Payload::Float(convert::MAX_8BIT as f32),
        }
    }

    /// OSC argument for this payload
    pub fn to_osc(self) -> OscType {
        match self {
            Payload::Int(v) => OscType::Int(v),
            Payload::Float(v) => OscType::Float(v),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Int(v) => write!(f, "{}", v),
            Payload::Float(v) => write!(f, "{:.3}", v),
        }
    }
}

/// Address and payload handed to the output driver
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub address: String,
    pub payload: Payload,
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.payload)
    }
}

/// Result of handling one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    /// Message to send, if the event produces one
    pub message: Option<OutboundMessage>,
    /// Operator status line, if the page or group changed
    pub status: Option<String>,
}

impl Dispatch {
    fn send(message: OutboundMessage) -> Self {
        Self {
            message: Some(message),
            status: None,
        }
    }

    fn status(line: String) -> Self {
        Self {
            message: None,
            status: Some(line),
        }
    }

    /// True when the event had no observable effect
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.status.is_none()
    }
}

/// Engine settings derived from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    pub mode: EngineMode,
    pub payload: PayloadFormat,
    pub transport_trigger: TransportTrigger,
    pub default_group: GroupToken,
}

impl EngineOptions {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            mode: config.engine.mode,
            payload: config.osc.payload,
            transport_trigger: config.engine.transport_trigger,
            default_group: config.default_group()?,
        })
    }
}

/// Stateful translator from element events to outbound messages
pub struct MappingEngine {
    pub(crate) layout: ControllerLayout,
    pub(crate) session: SessionState,
    pub(crate) policy: Box<dyn MappingPolicy>,
    pub(crate) payload: PayloadFormat,
    pub(crate) transport_trigger: TransportTrigger,
}

impl MappingEngine {
    /// Create an engine for the given layout
    pub fn new(layout: ControllerLayout, options: EngineOptions, aliases: AliasTable) -> Self {
        Self {
            layout,
            session: SessionState::new(options.default_group, aliases),
            policy: policy::for_mode(options.mode),
            payload: options.payload,
            transport_trigger: options.transport_trigger,
        }
    }

    /// Create an engine for the built-in nanoKONTROL2 layout
    pub fn nano_kontrol2(options: EngineOptions, aliases: AliasTable) -> Self {
        Self::new(ControllerLayout::nano_kontrol2(), options, aliases)
    }

    /// Current session state
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Name of the active address policy
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Layout used for classification
    pub fn layout(&self) -> &ControllerLayout {
        &self.layout
    }

    /// Status line for the current state
    pub fn status_line(&self) -> String {
        self.policy.status_line(&self.session)
    }

    /// Handle one surface event
    pub fn handle(&mut self, event: ElementEvent) -> Dispatch {
        let ElementEvent { element, value } = event;
        let pressed = value == BUTTON_PRESSED;
        let class = self.layout.classify(element);

        let dispatch = match class {
            ElementClass::TrackPrev if pressed => self.prev_page(),
            ElementClass::TrackNext if pressed => self.next_page(),
            ElementClass::TrackPrev | ElementClass::TrackNext => Dispatch::default(),
            ElementClass::Bank { kind, position } => self.on_bank(kind, position, value),
            ElementClass::Transport(cmd) => self.on_transport(cmd, value),
            ElementClass::Unmapped => {
                trace!("Ignoring unmapped element {} (value {})", element, value);
                Dispatch::default()
            }
        };

        if !dispatch.is_empty() {
            debug!(
                "Element {} ({}) value {} → {:?}",
                element, class, value, dispatch
            );
        }

        dispatch
    }

    fn on_bank(&mut self, kind: BankKind, position: u8, value: u8) -> Dispatch {
        if kind.is_button() && self.policy.selects_groups() {
            if value != BUTTON_PRESSED {
                return Dispatch::default();
            }
            return self.select_group(kind, position);
        }

        let channel = position as u32 + self.session.page.channel_offset();
        Dispatch::send(OutboundMessage {
            address: self.policy.channel_address(&self.session, kind, channel),
            payload: Payload::from_7bit(value, self.payload),
        })
    }

    fn select_group(&mut self, kind: BankKind, position: u8) -> Dispatch {
        let Some(group) = GroupToken::from_bank(kind, position) else {
            return Dispatch::default();
        };

        self.session.active_group = group;
        Dispatch::status(self.status_line())
    }

    fn on_transport(&self, cmd: TransportCommand, value: u8) -> Dispatch {
        if self.transport_trigger == TransportTrigger::Pressed && value != BUTTON_PRESSED {
            return Dispatch::default();
        }

        Dispatch::send(OutboundMessage {
            address: format!("/{}", cmd.address_suffix()),
            payload: Payload::full_scale(self.payload),
        })
    }
}
