//! Self-block tracking and the developer killswitch toggle.

use crate::presentation::Dialog;
use crate::session::Session;

pub const BLOCKED_MESSAGE: &str =
    "A developer blocked you, no further interaction with the rover possible";

/// Block state of this client's ip address, as last pushed by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfBlockState {
    pub ip_address: String,
    pub is_blocked: bool,
}

/// A change of [`SelfBlockState::is_blocked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTransition {
    Blocked,
    Unblocked,
}

impl SelfBlockState {
    /// Record a push. Returns the transition, if the flag changed.
    pub fn apply(&mut self, ip_address: String, is_blocked: bool) -> Option<BlockTransition> {
        self.ip_address = ip_address;
        if self.is_blocked == is_blocked {
            return None;
        }
        self.is_blocked = is_blocked;
        Some(if is_blocked {
            BlockTransition::Blocked
        } else {
            BlockTransition::Unblocked
        })
    }
}

impl BlockTransition {
    pub(crate) fn blocked_dialog() -> Dialog {
        Dialog {
            title: "Blocked".to_string(),
            message: BLOCKED_MESSAGE.to_string(),
            click_outside_to_close: false,
        }
    }
}

/// The developer view's killswitch switch.
#[derive(Debug, Clone)]
pub struct KillswitchToggle {
    label: &'static str,
}

impl Default for KillswitchToggle {
    fn default() -> Self {
        Self {
            label: Self::ALLOWED,
        }
    }
}

impl KillswitchToggle {
    pub const ALLOWED: &'static str = "allowed";
    pub const BLOCKED: &'static str = "blocked";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Forward the switch position to the server and mirror it in the label.
    pub fn on_change(&mut self, session: &Session, killswitch_enabled: bool) {
        let (label, message) = if killswitch_enabled {
            (Self::BLOCKED, "Rover interaction has been blocked by a developer")
        } else {
            (Self::ALLOWED, "Rover interaction is allowed again")
        };
        self.label = label;
        tracing::debug!("killswitch toggled to {}", label);
        session.set_killswitch(killswitch_enabled, message);
    }
}
