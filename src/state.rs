//! Session state owned by the mapping engine
//!
//! Holds the current page, the selected group and the read-only alias table.
//! The state lives as long as the process and is never persisted.

use crate::aliases::AliasTable;
use crate::layout::{BankKind, BANK_SIZE};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of selectable pages
pub const PAGE_COUNT: u8 = 8;

/// Page of logical channels, always within 1..=PAGE_COUNT
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Page(u8);

impl Page {
    pub const FIRST: Page = Page(1);
    pub const LAST: Page = Page(PAGE_COUNT);

    /// Build a page, rejecting values outside 1..=8
    pub fn new(number: u8) -> Option<Self> {
        (1..=PAGE_COUNT).contains(&number).then_some(Page(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Next page, or None at the last page
    pub fn next(self) -> Option<Self> {
        Page::new(self.0 + 1)
    }

    /// Previous page, or None at the first page
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).and_then(Page::new)
    }

    /// Offset added to a bank position to get the logical channel
    pub fn channel_offset(self) -> u32 {
        (self.0 as u32 - 1) * BANK_SIZE as u32
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::FIRST
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Selected mixer group, e.g. `s3` (solo group 3) or `m1` (mute group 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupToken {
    kind: BankKind,
    index: u8,
}

/// Invalid group token text
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid group token '{0}': expected s, m or r followed by 1-8")]
pub struct GroupTokenError(pub String);

impl GroupToken {
    /// Token for the button at a 1-based bank position. Only solo, mute and
    /// record banks form groups.
    pub fn from_bank(kind: BankKind, index: u8) -> Option<Self> {
        kind.group_letter()?;
        (1..=BANK_SIZE)
            .contains(&index)
            .then_some(GroupToken { kind, index })
    }

    pub fn kind(&self) -> BankKind {
        self.kind
    }

    pub fn index(&self) -> u8 {
        self.index
    }
}

impl Default for GroupToken {
    fn default() -> Self {
        GroupToken {
            kind: BankKind::Solo,
            index: 1,
        }
    }
}

impl fmt::Display for GroupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // from_bank only admits kinds with a letter
        let letter = self.kind.group_letter().unwrap_or('?');
        write!(f, "{}{}", letter, self.index)
    }
}

impl FromStr for GroupToken {
    type Err = GroupTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GroupTokenError(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(err)?;
        let kind = BankKind::from_group_letter(letter).ok_or_else(err)?;
        let index = chars.as_str().parse::<u8>().map_err(|_| err())?;
        GroupToken::from_bank(kind, index).ok_or_else(err)
    }
}

/// Mutable state of one bridge session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub page: Page,
    pub active_group: GroupToken,
    pub aliases: AliasTable,
}

impl SessionState {
    pub fn new(default_group: GroupToken, aliases: AliasTable) -> Self {
        Self {
            page: Page::FIRST,
            active_group: default_group,
            aliases,
        }
    }

    /// Active group with its display name, e.g. `s2 (Drums)`
    pub fn group_display(&self) -> String {
        let token = self.active_group.to_string();
        match self.aliases.get(&token) {
            Some(name) => format!("{} ({})", token, name),
            None => token,
        }
    }
}
