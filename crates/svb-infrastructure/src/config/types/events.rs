//! Event bus configuration types

use crate::constants::DEFAULT_EVENT_CAPACITY;
use serde::{Deserialize, Serialize};

/// Manager event bus configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Number of events buffered per subscriber before the oldest are dropped
    pub capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
