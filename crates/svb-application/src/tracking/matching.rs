//! Arrival-ordered set of matching references

use super::TrackedRef;
use svb_domain::error::{Error, Result};
use svb_domain::value_objects::{BindingSpec, BindingStrategy, Reference, ReferenceId};

#[derive(Debug, Default)]
pub(super) struct MatchingSet {
    entries: Vec<TrackedRef>,
}

impl MatchingSet {
    /// Append a newly arrived reference after checking it belongs to the slot
    pub(super) fn insert(&mut self, binding: &BindingSpec, tracked: TrackedRef) -> Result<()> {
        check_matches(binding, tracked.reference())?;
        if self.contains(tracked.id()) {
            return Err(Error::contract_violation(format!(
                "reference {} added twice to slot '{}'",
                tracked.id(),
                binding.name()
            )));
        }
        self.entries.push(tracked);
        Ok(())
    }

    /// Swap in a modified reference, keeping its arrival position
    pub(super) fn replace(
        &mut self,
        binding: &BindingSpec,
        tracked: TrackedRef,
    ) -> Result<TrackedRef> {
        check_matches(binding, tracked.reference())?;
        let slot = self
            .entries
            .iter_mut()
            .find(|entry| entry.id() == tracked.id())
            .ok_or_else(|| unknown(binding, tracked.reference()))?;
        Ok(std::mem::replace(slot, tracked))
    }

    pub(super) fn remove(
        &mut self,
        binding: &BindingSpec,
        reference: &Reference,
    ) -> Result<TrackedRef> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id() == reference.id())
            .ok_or_else(|| unknown(binding, reference))?;
        Ok(self.entries.remove(index))
    }

    pub(super) fn contains(&self, id: ReferenceId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    pub(super) fn get(&self, id: ReferenceId) -> Option<&TrackedRef> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Most preferred reference under `strategy`
    pub(super) fn preferred(&self, strategy: BindingStrategy) -> Option<&TrackedRef> {
        match strategy {
            BindingStrategy::Eager => self.entries.last(),
            BindingStrategy::Lazy => self.entries.first(),
        }
    }

    /// References in arrival order
    pub(super) fn iter(&self) -> impl DoubleEndedIterator<Item = &TrackedRef> {
        self.entries.iter()
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn check_matches(binding: &BindingSpec, reference: &Reference) -> Result<()> {
    if binding.descriptor().matches(reference) {
        Ok(())
    } else {
        Err(Error::contract_violation(format!(
            "reference {} does not match {} of slot '{}'",
            reference,
            binding.descriptor(),
            binding.name()
        )))
    }
}

fn unknown(binding: &BindingSpec, reference: &Reference) -> Error {
    Error::contract_violation(format!(
        "reference {} is not tracked by slot '{}'",
        reference,
        binding.name()
    ))
}
