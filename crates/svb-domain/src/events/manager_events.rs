//! Service manager notifications
//!
//! Play-state changes and lifecycle failures published by a manager. Failures
//! are not visible through the play-state alone: a failed creation leaves the
//! manager `Pending`, so observers learn the cause from these events.

use crate::value_objects::PlayState;
use serde::{Deserialize, Serialize};

/// Notification emitted by a service manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ManagerEvent {
    /// The manager's play-state changed
    StateChanged {
        /// Manager name
        manager: String,
        /// New state
        state: PlayState,
        /// State before the change
        previous: PlayState,
    },
    /// The lifecycle returned a new instance for a dependency change
    ServiceReplaced {
        /// Manager name
        manager: String,
        /// Slot whose change caused the replacement
        slot: String,
    },
    /// The lifecycle failed to create the service
    CreationFailed {
        /// Manager name
        manager: String,
        /// Failure description
        message: String,
    },
    /// The lifecycle failed to react to a dependency change
    UpdateFailed {
        /// Manager name
        manager: String,
        /// Slot whose change was being applied
        slot: String,
        /// Failure description
        message: String,
    },
    /// The lifecycle failed to dispose the service
    DisposalFailed {
        /// Manager name
        manager: String,
        /// Failure description
        message: String,
    },
}

impl ManagerEvent {
    /// Name of the manager that emitted the event
    pub fn manager(&self) -> &str {
        match self {
            Self::StateChanged { manager, .. }
            | Self::ServiceReplaced { manager, .. }
            | Self::CreationFailed { manager, .. }
            | Self::UpdateFailed { manager, .. }
            | Self::DisposalFailed { manager, .. } => manager,
        }
    }

    /// Whether the event reports a lifecycle failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::CreationFailed { .. } | Self::UpdateFailed { .. } | Self::DisposalFailed { .. }
        )
    }
}
