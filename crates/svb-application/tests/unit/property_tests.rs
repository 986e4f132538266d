//! Property tests: tracker bindings and manager readiness under random
//! add/remove sequences

use crate::test_utils::{
    Call, IFACE_A, RecordingLifecycle, binding, ids, provider_resolver, reference, tracked,
};
use proptest::prelude::*;
use svb_application::{
    DependencyTracker, DependencyTracking, MultiDependencyTracker, ServiceManager,
};
use svb_domain::{Cardinality, DependencySpec, PlayState, RegistryEventKind, UpdateStrategy};

/// (add?, reference id) pairs; invalid steps are skipped by the driver
fn ops() -> impl Strategy<Value = Vec<(bool, u64)>> {
    prop::collection::vec((any::<bool>(), 0u64..6), 0..40)
}

/// Apply `op` to `model` and return whether it is a valid registry event
fn step(model: &mut Vec<u64>, (is_add, id): (bool, u64)) -> bool {
    let present = model.contains(&id);
    if is_add && !present {
        model.push(id);
        true
    } else if !is_add && present {
        model.retain(|x| *x != id);
        true
    } else {
        false
    }
}

fn apply(tracker: &mut dyn DependencyTracking, is_add: bool, id: u64) {
    if is_add {
        tracker.on_reference_added(tracked(id, IFACE_A)).unwrap();
    } else {
        tracker.on_reference_removed(&reference(id, IFACE_A)).unwrap();
    }
}

proptest! {
    #[test]
    fn unary_binding_follows_strategy(ops in ops(), eager in any::<bool>()) {
        let update = if eager { UpdateStrategy::Eager } else { UpdateStrategy::Lazy };
        let mut tracker =
            DependencyTracker::new(binding(Cardinality::MandatoryUnary, update)).unwrap();
        let mut model = Vec::new();

        for op in ops {
            if !step(&mut model, op) {
                continue;
            }
            apply(&mut tracker, op.0, op.1);

            let expected = if eager { model.last() } else { model.first() };
            let expected: Vec<u64> = expected.copied().into_iter().collect();
            prop_assert_eq!(ids(tracker.tracked_dependency()), expected);
            prop_assert_eq!(tracker.matching_count(), model.len());
        }
    }

    #[test]
    fn static_unary_binding_never_rebinds(ops in ops()) {
        let mut tracker = DependencyTracker::new(binding(
            Cardinality::MandatoryUnary,
            UpdateStrategy::Static,
        ))
        .unwrap();
        let mut model = Vec::new();
        let mut bound: Option<u64> = None;
        let mut exhausted = false;

        for op in ops {
            if !step(&mut model, op) {
                continue;
            }
            apply(&mut tracker, op.0, op.1);

            let (is_add, id) = op;
            if is_add && bound.is_none() && !exhausted {
                bound = Some(id);
            } else if !is_add && bound == Some(id) {
                bound = None;
                exhausted = true;
            }
            let expected: Vec<u64> = bound.into_iter().collect();
            prop_assert_eq!(ids(tracker.tracked_dependency()), expected);
            prop_assert_eq!(tracker.is_exhausted(), exhausted);
            prop_assert_eq!(tracker.matching_count(), model.len());
        }
    }

    #[test]
    fn multiple_binding_lists_every_match(ops in ops(), eager in any::<bool>()) {
        let update = if eager { UpdateStrategy::Eager } else { UpdateStrategy::Lazy };
        let mut tracker =
            MultiDependencyTracker::new(binding(Cardinality::OptionalMultiple, update)).unwrap();
        let mut model = Vec::new();

        for op in ops {
            if !step(&mut model, op) {
                continue;
            }
            apply(&mut tracker, op.0, op.1);

            let mut expected = model.clone();
            if eager {
                expected.reverse();
            }
            prop_assert_eq!(ids(tracker.tracked_dependency()), expected);
        }
    }

    #[test]
    fn manager_is_running_exactly_when_bound(ops in ops()) {
        let manager = ServiceManager::new(
            "prop",
            RecordingLifecycle::new(vec![DependencySpec::mandatory("a", IFACE_A)]),
        )
        .unwrap();
        manager.start().unwrap();
        let mut model = Vec::new();

        for op in ops {
            if !step(&mut model, op) {
                continue;
            }
            let kind = if op.0 {
                RegistryEventKind::Added
            } else {
                RegistryEventKind::Removed
            };
            manager
                .notify("a", kind, reference(op.1, IFACE_A), provider_resolver())
                .unwrap();

            let live = !model.is_empty();
            prop_assert_eq!(manager.service().is_some(), live);
            prop_assert_eq!(manager.play_state() == PlayState::Running, live);

            let calls = manager.lifecycle().calls();
            let created = calls.iter().filter(|c| matches!(c, Call::Create(_))).count();
            let disposed = calls.iter().filter(|c| matches!(c, Call::Dispose(_))).count();
            prop_assert_eq!(created - disposed, usize::from(live));
        }

        manager.stop().unwrap();
        prop_assert_eq!(manager.play_state(), PlayState::Stopped);
        prop_assert!(manager.service().is_none());
        let calls = manager.lifecycle().take_calls();
        let created = calls.iter().filter(|c| matches!(c, Call::Create(_))).count();
        let disposed = calls.iter().filter(|c| matches!(c, Call::Dispose(_))).count();
        prop_assert_eq!(created, disposed);

        manager
            .notify("a", RegistryEventKind::Added, reference(99, IFACE_A), provider_resolver())
            .unwrap();
        prop_assert!(manager.lifecycle().calls().is_empty());
        prop_assert!(manager.service().is_none());
    }
}
