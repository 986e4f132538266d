//! Per-manager configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use svb_domain::value_objects::BindingOverride;

/// Settings applied when a manager of this name is built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Binding overrides keyed by slot name
    pub bindings: HashMap<String, BindingOverride>,
}

impl ManagerConfig {
    /// Override for one slot
    pub fn binding(&self, slot: &str) -> Option<&BindingOverride> {
        self.bindings.get(slot)
    }
}
