//! nanoKONTROL OSC - control-surface to DAW bridge
//!
//! Translates Korg nanoKONTROL2 slider, knob and button events into OSC
//! messages. Paging multiplies the eight physical channels into 64 logical
//! ones; in grouped mode the solo/mute/record buttons select the group that
//! prefixes every address.

pub mod aliases;
pub mod bridge;
pub mod config;
pub mod drivers;
pub mod engine;
pub mod layout;
pub mod midi;
pub mod sniffer;
pub mod state;
pub mod surface;
