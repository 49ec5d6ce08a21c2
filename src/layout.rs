//! Control-surface layout and element classification
//!
//! Maps raw element identifiers (CC numbers on the nanoKONTROL2) to the class of
//! control they belong to. Banks of eight identical controls are described by an
//! inclusive range plus the delta that turns an identifier into its 1-based
//! position; single buttons are exact matches.

use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Number of physical controls in each bank
pub const BANK_SIZE: u8 = 8;

/// Value sent by buttons when pressed
pub const BUTTON_PRESSED: u8 = 127;

/// Raw element identifiers of the nanoKONTROL2 in its default scene
pub mod element {
    pub const SLIDER_1: u8 = 0;
    pub const SLIDER_8: u8 = 7;
    pub const KNOB_1: u8 = 16;
    pub const KNOB_8: u8 = 23;
    pub const SOLO_1: u8 = 32;
    pub const SOLO_8: u8 = 39;
    pub const MUTE_1: u8 = 48;
    pub const MUTE_8: u8 = 55;
    pub const RECORD_1: u8 = 64;
    pub const RECORD_8: u8 = 71;

    pub const TRACK_PREVIOUS: u8 = 58;
    pub const TRACK_NEXT: u8 = 59;
    pub const CYCLE: u8 = 46;
    pub const MARKER_SET: u8 = 60;
    pub const MARKER_PREVIOUS: u8 = 61;
    pub const MARKER_NEXT: u8 = 62;
    pub const REWIND: u8 = 43;
    pub const FORWARD: u8 = 44;
    pub const STOP: u8 = 42;
    pub const PLAY: u8 = 41;
    pub const RECORD: u8 = 45;
}

/// Kind of an eight-wide bank of controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankKind {
    Slider,
    Knob,
    Solo,
    Mute,
    Record,
}

impl BankKind {
    /// Path segment used in outbound addresses
    pub fn class_name(self) -> &'static str {
        match self {
            BankKind::Slider => "slider",
            BankKind::Knob => "knob",
            BankKind::Solo => "solo",
            BankKind::Mute => "mute",
            BankKind::Record => "record",
        }
    }

    /// Letter used in group tokens; only button banks select groups
    pub fn group_letter(self) -> Option<char> {
        match self {
            BankKind::Solo => Some('s'),
            BankKind::Mute => Some('m'),
            BankKind::Record => Some('r'),
            BankKind::Slider | BankKind::Knob => None,
        }
    }

    /// Inverse of [`BankKind::group_letter`]
    pub fn from_group_letter(letter: char) -> Option<Self> {
        match letter {
            's' => Some(BankKind::Solo),
            'm' => Some(BankKind::Mute),
            'r' => Some(BankKind::Record),
            _ => None,
        }
    }

    /// Whether the bank is made of buttons (press/release) rather than
    /// continuous controls
    pub fn is_button(self) -> bool {
        self.group_letter().is_some()
    }
}

impl fmt::Display for BankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Single-purpose transport buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportCommand {
    Cycle,
    MarkerSet,
    MarkerPrevious,
    MarkerNext,
    Rewind,
    Forward,
    Stop,
    Play,
    Record,
}

impl TransportCommand {
    /// Address suffix, without the leading slash
    pub fn address_suffix(self) -> &'static str {
        match self {
            TransportCommand::Cycle => "cycle",
            TransportCommand::MarkerSet => "marker/set",
            TransportCommand::MarkerPrevious => "marker/previous",
            TransportCommand::MarkerNext => "marker/next",
            TransportCommand::Rewind => "rewind",
            TransportCommand::Forward => "forward",
            TransportCommand::Stop => "stop",
            TransportCommand::Play => "play",
            TransportCommand::Record => "record",
        }
    }
}

/// Classification of a raw element identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementClass {
    TrackPrev,
    TrackNext,
    /// A control inside a bank, with its 1-based position (1..=8)
    Bank { kind: BankKind, position: u8 },
    Transport(TransportCommand),
    Unmapped,
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementClass::TrackPrev => f.write_str("track previous"),
            ElementClass::TrackNext => f.write_str("track next"),
            ElementClass::Bank { kind, position } => write!(f, "{} #{}", kind, position),
            ElementClass::Transport(cmd) => write!(f, "transport {}", cmd.address_suffix()),
            ElementClass::Unmapped => f.write_str("unmapped"),
        }
    }
}

/// A bank of controls: contiguous identifiers plus the delta to a 1-based index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankRange {
    pub kind: BankKind,
    pub ids: RangeInclusive<u8>,
    pub delta: i16,
}

/// A single button bound to one class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonBinding {
    pub id: u8,
    pub class: ElementClass,
}

/// Layout validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("bank {kind} must span exactly 8 identifiers, got {len}")]
    BankSize { kind: BankKind, len: usize },

    #[error("bank {kind} delta {delta} does not map its first control to position 1")]
    BankDelta { kind: BankKind, delta: i16 },

    #[error("element {id} is claimed by both {first} and {second}")]
    Overlap { id: u8, first: String, second: String },
}

/// Table-driven description of a control surface
#[derive(Debug, Clone)]
pub struct ControllerLayout {
    name: String,
    banks: Vec<BankRange>,
    buttons: Vec<ButtonBinding>,
}

impl ControllerLayout {
    /// Build a layout and check that no identifier belongs to two classes
    pub fn new(
        name: impl Into<String>,
        banks: Vec<BankRange>,
        buttons: Vec<ButtonBinding>,
    ) -> Result<Self, LayoutError> {
        let layout = Self {
            name: name.into(),
            banks,
            buttons,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Built-in layout of the Korg nanoKONTROL2 (CC mode, default scene)
    pub fn nano_kontrol2() -> Self {
        use element::*;

        let bank = |kind, first: u8, last: u8| BankRange {
            kind,
            ids: first..=last,
            delta: 1 - first as i16,
        };
        let transport = |id, cmd| ButtonBinding {
            id,
            class: ElementClass::Transport(cmd),
        };

        Self {
            name: "nanoKONTROL2".to_string(),
            banks: vec![
                bank(BankKind::Slider, SLIDER_1, SLIDER_8),
                bank(BankKind::Knob, KNOB_1, KNOB_8),
                bank(BankKind::Solo, SOLO_1, SOLO_8),
                bank(BankKind::Mute, MUTE_1, MUTE_8),
                bank(BankKind::Record, RECORD_1, RECORD_8),
            ],
            buttons: vec![
                ButtonBinding {
                    id: TRACK_PREVIOUS,
                    class: ElementClass::TrackPrev,
                },
                ButtonBinding {
                    id: TRACK_NEXT,
                    class: ElementClass::TrackNext,
                },
                transport(CYCLE, TransportCommand::Cycle),
                transport(MARKER_SET, TransportCommand::MarkerSet),
                transport(MARKER_PREVIOUS, TransportCommand::MarkerPrevious),
                transport(MARKER_NEXT, TransportCommand::MarkerNext),
                transport(REWIND, TransportCommand::Rewind),
                transport(FORWARD, TransportCommand::Forward),
                transport(STOP, TransportCommand::Stop),
                transport(PLAY, TransportCommand::Play),
                transport(RECORD, TransportCommand::Record),
            ],
        }
    }

    /// Layout name, for logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classify a raw element identifier. Unknown identifiers are `Unmapped`.
    pub fn classify(&self, id: u8) -> ElementClass {
        if let Some(button) = self.buttons.iter().find(|b| b.id == id) {
            return button.class;
        }

        self.banks
            .iter()
            .find(|bank| bank.ids.contains(&id))
            .map(|bank| ElementClass::Bank {
                kind: bank.kind,
                // validate() guarantees the result is in 1..=BANK_SIZE
                position: (id as i16 + bank.delta) as u8,
            })
            .unwrap_or(ElementClass::Unmapped)
    }

    /// Check bank sizes, deltas, and that ranges and buttons are disjoint
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut owners: Vec<(u8, String)> = Vec::new();

        for bank in &self.banks {
            let len = bank.ids.clone().count();
            if len != BANK_SIZE as usize {
                return Err(LayoutError::BankSize { kind: bank.kind, len });
            }
            if *bank.ids.start() as i16 + bank.delta != 1 {
                return Err(LayoutError::BankDelta {
                    kind: bank.kind,
                    delta: bank.delta,
                });
            }
            for id in bank.ids.clone() {
                claim(&mut owners, id, bank.kind.to_string())?;
            }
        }

        for button in &self.buttons {
            claim(&mut owners, button.id, button.class.to_string())?;
        }

        Ok(())
    }
}

impl Default for ControllerLayout {
    fn default() -> Self {
        Self::nano_kontrol2()
    }
}

fn claim(owners: &mut Vec<(u8, String)>, id: u8, owner: String) -> Result<(), LayoutError> {
    if let Some((_, first)) = owners.iter().find(|(claimed, _)| *claimed == id) {
        return Err(LayoutError::Overlap {
            id,
            first: first.clone(),
            second: owner,
        });
    }
    owners.push((id, owner));
    Ok(())
}
