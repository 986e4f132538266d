//! Target descriptors for dependency slots

use crate::constants::OBJECT_CLASS;
use crate::error::{Error, Result};
use crate::value_objects::filter::Filter;
use crate::value_objects::reference::Reference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class name plus optional property filter selecting candidate references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
}

impl ServiceDescriptor {
    /// Descriptor matching every reference registered under `class_name`
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            filter: None,
        }
    }

    /// Restrict the descriptor with an additional filter (AND-combined)
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_also(filter),
            None => filter,
        });
        self
    }

    /// Parse and apply a filter string
    pub fn with_filter_str(self, filter: &str) -> Result<Self> {
        Ok(self.with_filter(Filter::parse(filter)?))
    }

    /// Target class name
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Property filter, if any
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Whether `reference` is a candidate for this descriptor
    pub fn matches(&self, reference: &Reference) -> bool {
        reference.provides(&self.class_name)
            && self.filter.as_ref().is_none_or(|f| f.matches(reference))
    }

    /// Full registry filter: the class constraint combined with the property filter
    pub fn to_filter(&self) -> Filter {
        let class = Filter::equal(OBJECT_CLASS, self.class_name.clone());
        match &self.filter {
            Some(filter) => class.and_also(filter.clone()),
            None => class,
        }
    }

    /// Rendered registry filter string
    pub fn to_filter_string(&self) -> String {
        self.to_filter().to_string()
    }

    /// Reject descriptors that can never match anything
    pub fn validate(&self) -> Result<()> {
        if self.class_name.trim().is_empty() {
            return Err(Error::invalid_argument(
                "service descriptor requires a class name",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_filter())
    }
}
