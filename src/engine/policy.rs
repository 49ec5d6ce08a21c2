//! Address policies
//!
//! Both policies share classification and paging; they differ in whether
//! solo/mute/record buttons select a group and in how channel addresses and the
//! status line are built.

use crate::config::EngineMode;
use crate::layout::BankKind;
use crate::state::SessionState;

/// Strategy deciding address construction for bank controls
pub trait MappingPolicy: Send + Sync {
    /// Policy name, for logs
    fn name(&self) -> &'static str;

    /// Whether pressing a solo/mute/record button selects a group instead of
    /// emitting a channel message
    fn selects_groups(&self) -> bool;

    /// Address for a bank control on a logical channel
    fn channel_address(&self, session: &SessionState, kind: BankKind, channel: u32) -> String;

    /// Operator status line for the current state
    fn status_line(&self, session: &SessionState) -> String;
}

/// `/<group>/<class>/<channel>`; button banks select the group
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupedPolicy;

impl MappingPolicy for GroupedPolicy {
    fn name(&self) -> &'static str {
        "grouped"
    }

    fn selects_groups(&self) -> bool {
        true
    }

    fn channel_address(&self, session: &SessionState, kind: BankKind, channel: u32) -> String {
        format!("/{}/{}/{}", session.active_group, kind.class_name(), channel)
    }

    fn status_line(&self, session: &SessionState) -> String {
        format!("Group: {}, Page: {}", session.group_display(), session.page)
    }
}

/// `/<class>/<channel>` for every bank control
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectPolicy;

impl MappingPolicy for DirectPolicy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn selects_groups(&self) -> bool {
        false
    }

    fn channel_address(&self, _session: &SessionState, kind: BankKind, channel: u32) -> String {
        format!("/{}/{}", kind.class_name(), channel)
    }

    fn status_line(&self, session: &SessionState) -> String {
        format!("Page: {}", session.page)
    }
}

/// Policy object for a configured mode
pub fn for_mode(mode: EngineMode) -> Box<dyn MappingPolicy> {
    match mode {
        EngineMode::Grouped => Box::new(GroupedPolicy),
        EngineMode::Direct => Box::new(DirectPolicy),
    }
}
