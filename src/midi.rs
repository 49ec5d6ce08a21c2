//! MIDI utilities and message types
//!
//! Decodes the raw bytes delivered by the surface into messages, extracts the
//! (element, value) pair the mapping engine works on, and provides the value
//! conversions used when building outbound payloads.

use std::fmt;

/// MIDI message types understood by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },

    /// Pitch Bend: channel (0-15), value (0-16383, 14-bit)
    PitchBend { channel: u8, value: u16 },

    /// System Exclusive payload without the F0/F7 framing
    SysEx { data: Vec<u8> },

    /// Any other system message, kept only for display
    System { status: u8 },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;

        // Running status is not produced by the nanoKONTROL2
        if status < 0x80 {
            return None;
        }

        if status >= 0xF0 {
            if status == 0xF0 {
                let end = rest.iter().position(|&b| b == 0xF7)?;
                return Some(MidiMessage::SysEx {
                    data: rest[..end].to_vec(),
                });
            }
            return Some(MidiMessage::System { status });
        }

        let channel = status & 0x0F;
        match status & 0xF0 {
            0x80 => {
                let [note, velocity] = two_data_bytes(rest)?;
                Some(MidiMessage::NoteOff { channel, note, velocity })
            }
            0x90 => {
                // Note On with velocity 0 is a Note Off
                let [note, velocity] = two_data_bytes(rest)?;
                if velocity == 0 {
                    Some(MidiMessage::NoteOff { channel, note, velocity: 0 })
                } else {
                    Some(MidiMessage::NoteOn { channel, note, velocity })
                }
            }
            0xB0 => {
                let [cc, value] = two_data_bytes(rest)?;
                Some(MidiMessage::ControlChange { channel, cc, value })
            }
            0xC0 => {
                let program = *rest.first()? & 0x7F;
                Some(MidiMessage::ProgramChange { channel, program })
            }
            0xE0 => {
                let [lsb, msb] = two_data_bytes(rest)?;
                Some(MidiMessage::PitchBend {
                    channel,
                    value: ((msb as u16) << 7) | lsb as u16,
                })
            }
            _ => None,
        }
    }

    /// The (element, value) pair carried by this message, if it addresses a
    /// surface element.
    ///
    /// Control Change yields (cc, value); Note On and Note Off both yield
    /// (note, velocity). A Note On with velocity 0 was already turned into a
    /// Note Off with value 0 by [`MidiMessage::parse`].
    pub fn element_event(&self) -> Option<ElementEvent> {
        match *self {
            MidiMessage::ControlChange { cc, value, .. } => Some(ElementEvent {
                element: cc,
                value,
            }),
            MidiMessage::NoteOn { note, velocity, .. }
            | MidiMessage::NoteOff { note, velocity, .. } => Some(ElementEvent {
                element: note,
                value: velocity,
            }),
            _ => None,
        }
    }
}

fn two_data_bytes(rest: &[u8]) -> Option<[u8; 2]> {
    match rest {
        [a, b, ..] => Some([a & 0x7F, b & 0x7F]),
        _ => None,
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "ProgramChange ch:{} p:{}", channel + 1, program)
            }
            MidiMessage::PitchBend { channel, value } => {
                write!(f, "PitchBend ch:{} v:{}", channel + 1, value)
            }
            MidiMessage::SysEx { ref data } => write!(f, "SysEx {} bytes", data.len()),
            MidiMessage::System { status } => write!(f, "System {:02X}", status),
        }
    }
}

/// A raw surface event: which element moved and its 7-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementEvent {
    pub element: u8,
    pub value: u8,
}

/// MIDI value conversion utilities
pub mod convert {
    /// Largest 7-bit MIDI value
    pub const MAX_7BIT: u8 = 127;

    /// Largest 8-bit output value
    pub const MAX_8BIT: u8 = 255;

    /// Scale a 7-bit value onto 0.0..=255.0 without rounding
    pub fn scale_7bit_to_8bit(value: u8) -> f32 {
        let value = value.min(MAX_7BIT);
        value as f32 / MAX_7BIT as f32 * MAX_8BIT as f32
    }

    /// Scale a 7-bit value onto 0..=255, rounding half away from zero
    pub fn to_8bit_rounded(value: u8) -> u8 {
        scale_7bit_to_8bit(value).round() as u8
    }
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_change() {
        let data = vec![0xB0, 16, 100];
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(
            msg,
            MidiMessage::ControlChange {
                channel: 0,
                cc: 16,
                value: 100,
            }
        );
        assert_eq!(
            msg.element_event(),
            Some(ElementEvent {
                element: 16,
                value: 100
            })
        );
    }

    #[test]
    fn test_note_on_velocity_zero_is_release() {
        let msg = MidiMessage::parse(&[0x90, 41, 0]).unwrap();

        assert_eq!(
            msg,
            MidiMessage::NoteOff {
                channel: 0,
                note: 41,
                velocity: 0,
            }
        );
        assert_eq!(msg.element_event().unwrap().value, 0);
    }

    #[test]
    fn test_note_off_forwards_release_velocity() {
        let msg = MidiMessage::parse(&[0x80, 41, 64]).unwrap();
        assert_eq!(
            msg.element_event(),
            Some(ElementEvent {
                element: 41,
                value: 64
            })
        );
    }

    #[test]
    fn test_pitch_bend() {
        let msg = MidiMessage::parse(&[0xE0, 0x00, 0x40]).unwrap();
        assert_eq!(msg, MidiMessage::PitchBend { channel: 0, value: 8192 });
        assert_eq!(msg.element_event(), None);
    }

    #[test]
    fn test_truncated_and_running_status_rejected() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0xB0, 7]), None);
        assert_eq!(MidiMessage::parse(&[0x07, 100]), None);
    }

    #[test]
    fn test_sysex_and_system() {
        let msg = MidiMessage::parse(&[0xF0, 0x42, 0x40, 0xF7]).unwrap();
        assert_eq!(msg, MidiMessage::SysEx { data: vec![0x42, 0x40] });

        let clock = MidiMessage::parse(&[0xF8]).unwrap();
        assert_eq!(clock, MidiMessage::System { status: 0xF8 });
        assert_eq!(clock.element_event(), None);
    }

    #[test]
    fn test_8bit_rescale_endpoints() {
        assert_eq!(convert::to_8bit_rounded(0), 0);
        assert_eq!(convert::to_8bit_rounded(127), 255);
        // 64/127*255 = 128.50...
        assert_eq!(convert::to_8bit_rounded(64), 129);
        // 63/127*255 = 126.49...
        assert_eq!(convert::to_8bit_rounded(63), 126);
        // Out-of-range input is clamped to the 7-bit domain
        assert_eq!(convert::to_8bit_rounded(200), 255);
    }

    #[test]
    fn test_8bit_rescale_unrounded() {
        assert_eq!(convert::scale_7bit_to_8bit(0), 0.0);
        assert_eq!(convert::scale_7bit_to_8bit(127), 255.0);
        assert!((convert::scale_7bit_to_8bit(64) - 128.503_94).abs() < 1e-3);
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0xB0, 0x00, 0x7F]), "B0 00 7F");
    }
}
