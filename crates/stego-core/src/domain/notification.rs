//! The shared status banner.
//!
//! [`NotificationRelay`] is a single slot holding the most recent user-facing
//! status message.  Both operation controllers write to it; the presentation
//! shell reads it and renders a dismissible banner.
//!
//! # Last write wins (for beginners)
//!
//! There is no queue.  Two quick `show` calls leave only the second message
//! visible.  Notifications are transient feedback, not an audit trail, so
//! losing an intermediate message is acceptable.
//!
//! The relay is an explicit handle (`Clone` shares the same slot) rather than
//! a global, so each controller receives it at construction time and tests can
//! create isolated relays.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Categorical importance of a status message, used to drive styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(label)
    }
}

/// Snapshot of the banner.
///
/// Dismissing hides the banner but keeps the last message and severity, so a
/// renderer can fade it out without the text disappearing first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    pub visible: bool,
    pub message: String,
    pub severity: Severity,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self {
            visible: false,
            message: String::new(),
            severity: Severity::Success,
        }
    }
}

/// Process-wide, single-slot notification state.
#[derive(Debug, Clone, Default)]
pub struct NotificationRelay {
    slot: Arc<Mutex<NotificationState>>,
}

impl NotificationRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the slot and makes the banner visible.
    pub fn show(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        debug!(%severity, %message, "notification shown");
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = NotificationState {
            visible: true,
            message,
            severity,
        };
    }

    /// Hides the banner.  Calling it on a hidden banner is a no-op.
    pub fn dismiss(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.visible = false;
    }

    /// Returns a copy of the current slot contents.
    pub fn current(&self) -> NotificationState {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_visible(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .visible
    }
}
