//! Dependency declarations and binding specifications
//!
//! A lifecycle declares its slots as [`DependencySpec`]s. When a manager is
//! built for a concrete lifecycle instance each spec is turned into a
//! [`BindingSpec`], optionally adjusted by a configured [`BindingOverride`].

use crate::error::Result;
use crate::value_objects::descriptor::ServiceDescriptor;
use crate::value_objects::filter::Filter;
use serde::{Deserialize, Serialize};

/// How many references a slot binds and whether it must be satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly one reference, required for readiness
    MandatoryUnary,
    /// Zero or one reference
    OptionalUnary,
    /// One or more references, required for readiness
    MandatoryMultiple,
    /// Zero or more references
    OptionalMultiple,
}

impl Cardinality {
    /// Whether the slot must be satisfied before the service is created
    pub fn is_mandatory(self) -> bool {
        matches!(self, Self::MandatoryUnary | Self::MandatoryMultiple)
    }

    /// Whether the slot binds a list of references
    pub fn is_multiple(self) -> bool {
        matches!(self, Self::MandatoryMultiple | Self::OptionalMultiple)
    }
}

/// Whether a bound value may be replaced after the initial binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStrategy {
    /// Bind once; later arrivals are ignored and a lost binding is never replaced
    Static,
    /// Keep the first match until it disappears, then rebind
    #[default]
    Lazy,
    /// Always prefer the most recently arrived match
    Eager,
}

/// Which matching reference is preferred when several are available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStrategy {
    /// Most recently arrived first
    Eager,
    /// Earliest arrived first
    Lazy,
}

impl From<UpdateStrategy> for BindingStrategy {
    fn from(update: UpdateStrategy) -> Self {
        match update {
            UpdateStrategy::Eager => Self::Eager,
            UpdateStrategy::Lazy | UpdateStrategy::Static => Self::Lazy,
        }
    }
}

/// Static declaration of one dependency slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Slot name, unique within the lifecycle
    pub name: String,
    /// Target descriptor
    pub descriptor: ServiceDescriptor,
    /// Cardinality of the slot
    pub cardinality: Cardinality,
    /// Update strategy of the slot
    #[serde(default)]
    pub update_strategy: UpdateStrategy,
}

impl DependencySpec {
    /// Declare a slot
    pub fn new(
        name: impl Into<String>,
        descriptor: ServiceDescriptor,
        cardinality: Cardinality,
        update_strategy: UpdateStrategy,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor,
            cardinality,
            update_strategy,
        }
    }

    /// Mandatory single-valued slot with the default (lazy) strategy
    pub fn mandatory(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self::new(
            name,
            ServiceDescriptor::new(class_name),
            Cardinality::MandatoryUnary,
            UpdateStrategy::default(),
        )
    }

    /// Optional single-valued slot with the default (lazy) strategy
    pub fn optional(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self::new(
            name,
            ServiceDescriptor::new(class_name),
            Cardinality::OptionalUnary,
            UpdateStrategy::default(),
        )
    }

    /// Change the cardinality
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Change the update strategy
    #[must_use]
    pub fn with_update_strategy(mut self, update_strategy: UpdateStrategy) -> Self {
        self.update_strategy = update_strategy;
        self
    }

    /// Narrow the descriptor with a property filter
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.descriptor = self.descriptor.with_filter(filter);
        self
    }
}

/// Per-slot adjustments supplied by configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingOverride {
    /// Extra filter AND-combined with the declared descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Replacement update strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_strategy: Option<UpdateStrategy>,
    /// Replacement binding strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding_strategy: Option<BindingStrategy>,
}

/// A dependency spec resolved for one manager instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    dependency: DependencySpec,
    descriptor: ServiceDescriptor,
    update_strategy: UpdateStrategy,
    binding_strategy: BindingStrategy,
}

impl BindingSpec {
    /// Binding using the declaration as-is
    pub fn from_dependency(dependency: DependencySpec) -> Self {
        let update_strategy = dependency.update_strategy;
        Self {
            descriptor: dependency.descriptor.clone(),
            update_strategy,
            binding_strategy: update_strategy.into(),
            dependency,
        }
    }

    /// Binding with configured overrides applied
    ///
    /// The update strategy falls back to the declaration's; the binding
    /// strategy falls back to the one implied by the effective update
    /// strategy.
    pub fn resolve(
        dependency: DependencySpec,
        overrides: Option<&BindingOverride>,
    ) -> Result<Self> {
        dependency.descriptor.validate()?;
        let Some(overrides) = overrides else {
            return Ok(Self::from_dependency(dependency));
        };
        let update_strategy = overrides
            .update_strategy
            .unwrap_or(dependency.update_strategy);
        let binding_strategy = overrides
            .binding_strategy
            .unwrap_or_else(|| update_strategy.into());
        let descriptor = match &overrides.filter {
            Some(filter) => dependency.descriptor.clone().with_filter(filter.clone()),
            None => dependency.descriptor.clone(),
        };
        Ok(Self {
            dependency,
            descriptor,
            update_strategy,
            binding_strategy,
        })
    }

    /// Replace the binding strategy
    #[must_use]
    pub fn with_binding_strategy(mut self, binding_strategy: BindingStrategy) -> Self {
        self.binding_strategy = binding_strategy;
        self
    }

    /// Slot name
    pub fn name(&self) -> &str {
        &self.dependency.name
    }

    /// The originating declaration
    pub fn dependency(&self) -> &DependencySpec {
        &self.dependency
    }

    /// Effective descriptor (declaration narrowed by overrides)
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// Slot cardinality
    pub fn cardinality(&self) -> Cardinality {
        self.dependency.cardinality
    }

    /// Effective update strategy
    pub fn update_strategy(&self) -> UpdateStrategy {
        self.update_strategy
    }

    /// Effective binding strategy
    pub fn binding_strategy(&self) -> BindingStrategy {
        self.binding_strategy
    }

    /// Whether the slot must be satisfied for readiness
    pub fn is_mandatory(&self) -> bool {
        self.dependency.cardinality.is_mandatory()
    }
}
