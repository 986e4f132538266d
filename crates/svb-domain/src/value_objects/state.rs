//! Manager play-state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable state of a service manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    /// Waiting for mandatory dependencies (or after a failed creation)
    #[default]
    Pending,
    /// Service instance is live
    Running,
    /// Manager has been stopped; terminal
    Stopped,
}

impl PlayState {
    /// Compact encoding for atomic storage
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Running => 1,
            Self::Stopped => 2,
        }
    }

    /// Decode from [`PlayState::as_u8`]; unknown values read as `Stopped`
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Pending,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}
