//! Service references
//!
//! A [`Reference`] is the registry's handle to one registered service
//! instance. Its identity survives property modifications; the registry never
//! reuses an id for a different instance.

use crate::constants::OBJECT_CLASS;
use crate::value_objects::filter::PropertyLookup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque registry-assigned identity of a registered instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceId(u64);

impl ReferenceId {
    /// Wrap a raw id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to one discovered dependency instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    id: ReferenceId,
    interfaces: Vec<String>,
    properties: BTreeMap<String, String>,
}

impl Reference {
    /// Create a reference exposing a single interface
    pub fn new(id: ReferenceId, interface: impl Into<String>) -> Self {
        Self {
            id,
            interfaces: vec![interface.into()],
            properties: BTreeMap::new(),
        }
    }

    /// Add another interface the instance is registered under
    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Set a property
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replace the whole property bag, keeping identity and interfaces
    #[must_use]
    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    /// Registry identity
    pub fn id(&self) -> ReferenceId {
        self.id
    }

    /// Interfaces the instance is registered under
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Whether the instance is registered under `class_name`
    pub fn provides(&self, class_name: &str) -> bool {
        self.interfaces.iter().any(|i| i == class_name)
    }

    /// Property bag
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Single property value
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl PropertyLookup for Reference {
    fn values(&self, key: &str) -> Vec<&str> {
        if key == OBJECT_CLASS {
            return self.interfaces.iter().map(String::as_str).collect();
        }
        PropertyLookup::values(&self.properties, key)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.id, self.interfaces.join(","))
    }
}
