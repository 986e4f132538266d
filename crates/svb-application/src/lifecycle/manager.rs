//! Service manager
//!
//! One manager drives one lifecycle instance. All tracker mutation and every
//! lifecycle call happen under a single manager-wide lock, so the lifecycle
//! never sees overlapping invocations for the same service. The play-state
//! and the live service are published through lock-free cells and can be
//! read from anywhere, including from inside lifecycle callbacks.

use super::builder::ServiceManagerBuilder;
use crate::ports::lifecycle::{ChangeOutcome, DependencyChange, DependencyMap, ServiceLifecycle};
use crate::ports::registry::{
    InstanceResolver, RegistryListener, RegistryNotification, ServiceRegistry, WatchId,
};
use crate::tracking::{BindingTransition, DependencyTracking, TrackedRef, TrackedValue};
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use svb_domain::error::{Error, Result};
use svb_domain::events::{ManagerEvent, RegistryEventKind};
use svb_domain::ports::{Listener, ListenerId, Notifier};
use svb_domain::value_objects::{BindingSpec, PlayState, Reference};
use tracing::{debug, error, info, warn};

pub(super) struct ManagerState<S> {
    trackers: Vec<Box<dyn DependencyTracking>>,
    service: Option<Arc<S>>,
    /// Map handed to the lifecycle at the last create or update
    dependencies: DependencyMap,
    watches: Vec<WatchId>,
    starting: bool,
    started: bool,
    stopped: bool,
}

impl<S> ManagerState<S> {
    pub(super) fn new(trackers: Vec<Box<dyn DependencyTracking>>) -> Self {
        Self {
            trackers,
            service: None,
            dependencies: DependencyMap::new(),
            watches: Vec::new(),
            starting: false,
            started: false,
            stopped: false,
        }
    }

    fn tracker(&self, slot: &str) -> Option<&dyn DependencyTracking> {
        self.trackers
            .iter()
            .find(|t| t.slot() == slot)
            .map(|tracker| &**tracker)
    }

    fn tracker_mut(&mut self, slot: &str) -> Option<&mut Box<dyn DependencyTracking>> {
        self.trackers.iter_mut().find(|t| t.slot() == slot)
    }

    fn is_ready(&self) -> bool {
        self.trackers
            .iter()
            .filter(|t| t.binding().is_mandatory())
            .all(|t| t.is_satisfied())
    }
}

pub(super) struct ManagerCore<L: ServiceLifecycle> {
    name: String,
    lifecycle: L,
    registry: Option<Arc<dyn ServiceRegistry>>,
    bindings: Vec<BindingSpec>,
    state: Mutex<ManagerState<L::Service>>,
    play_state: AtomicU8,
    live: ArcSwapOption<L::Service>,
    pub(super) listeners: Notifier<ManagerEvent>,
}

impl<L: ServiceLifecycle> ManagerCore<L> {
    pub(super) fn new(
        name: String,
        lifecycle: L,
        registry: Option<Arc<dyn ServiceRegistry>>,
        state: ManagerState<L::Service>,
    ) -> Self {
        let bindings = state
            .trackers
            .iter()
            .map(|t| t.binding().clone())
            .collect();
        Self {
            name,
            lifecycle,
            registry,
            bindings,
            state: Mutex::new(state),
            play_state: AtomicU8::new(PlayState::Pending.as_u8()),
            live: ArcSwapOption::empty(),
            listeners: Notifier::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ManagerState<L::Service>>> {
        self.state.lock().map_err(|_| {
            Error::internal(format!(
                "state lock of service manager '{}' is poisoned",
                self.name
            ))
        })
    }

    fn notify(
        &self,
        slot: &str,
        kind: RegistryEventKind,
        reference: Reference,
        resolver: Arc<dyn InstanceResolver>,
    ) -> Result<()> {
        let mut state = self.lock()?;
        if state.stopped {
            debug!(
                manager = %self.name,
                slot,
                reference = %reference,
                "Ignoring notification after stop"
            );
            return Ok(());
        }

        let tracker = state
            .tracker_mut(slot)
            .ok_or_else(|| Error::unknown_slot(slot))?;
        let known = tracker.is_matching(reference.id());
        let matches = tracker.binding().descriptor().matches(&reference);
        let tracked = TrackedRef::new(reference, resolver);

        let transitions = match kind {
            RegistryEventKind::Added => tracker.on_reference_added(tracked)?,
            RegistryEventKind::Modified => match (known, matches) {
                (true, true) => tracker.on_reference_modified(tracked)?,
                (true, false) => tracker.on_reference_removed(tracked.reference())?,
                (false, true) => tracker.on_reference_added(tracked)?,
                (false, false) => Vec::new(),
            },
            RegistryEventKind::Removed if known => {
                tracker.on_reference_removed(tracked.reference())?
            }
            RegistryEventKind::Removed => {
                debug!(
                    manager = %self.name,
                    slot,
                    reference = %tracked.reference(),
                    "Ignoring removal of a reference the slot never matched"
                );
                Vec::new()
            }
        };

        if state.started && !transitions.is_empty() {
            self.evaluate(&mut state, &transitions);
        }
        Ok(())
    }

    /// Recompute readiness from every tracker and act on it
    fn evaluate(&self, state: &mut ManagerState<L::Service>, transitions: &[BindingTransition]) {
        match (state.service.is_some(), state.is_ready()) {
            (false, true) => self.create_service(state),
            (true, false) => {
                info!(manager = %self.name, "Mandatory dependency lost; disposing service");
                self.dispose_service(state, PlayState::Pending);
            }
            (true, true) => {
                for transition in transitions {
                    if state.service.is_none() {
                        break;
                    }
                    if self.is_refilled_gap(state, transition) {
                        continue;
                    }
                    self.apply_change(state, transition);
                }
            }
            (false, false) => {}
        }
    }

    /// A mandatory slot emptied and refilled within one step never lost its value
    fn is_refilled_gap(
        &self,
        state: &ManagerState<L::Service>,
        transition: &BindingTransition,
    ) -> bool {
        let mandatory = state
            .tracker(&transition.slot)
            .is_some_and(|tracker| tracker.binding().is_mandatory());
        if mandatory && transition.current.is_none() {
            debug!(
                manager = %self.name,
                slot = %transition.slot,
                "Mandatory slot rebound in the same step; skipping interim loss"
            );
            return true;
        }
        false
    }

    fn resolve_dependencies(&self, state: &ManagerState<L::Service>) -> DependencyMap {
        let mut map = DependencyMap::new();
        for tracker in &state.trackers {
            let value = tracker.tracked_dependency().and_then(|tracked| {
                let resolved = tracked.resolve();
                if resolved.is_none() {
                    warn!(
                        manager = %self.name,
                        slot = tracker.slot(),
                        "Bound references could not be resolved to instances"
                    );
                }
                resolved
            });
            map.insert(tracker.slot(), value);
        }
        map
    }

    fn create_service(&self, state: &mut ManagerState<L::Service>) {
        let dependencies = self.resolve_dependencies(state);
        debug!(
            manager = %self.name,
            slots = dependencies.len(),
            "Mandatory dependencies satisfied; creating service"
        );

        match self.lifecycle.create(&dependencies) {
            Ok(service) => {
                let service = Arc::new(service);
                state.service = Some(Arc::clone(&service));
                state.dependencies = dependencies;
                for tracker in &mut state.trackers {
                    tracker.freeze();
                }
                self.live.store(Some(service));
                info!(manager = %self.name, "Service created");
                self.set_play_state(PlayState::Running);
            }
            Err(e) => {
                error!(manager = %self.name, error = %e, "Service creation failed");
                self.publish(&ManagerEvent::CreationFailed {
                    manager: self.name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn dispose_service(&self, state: &mut ManagerState<L::Service>, next: PlayState) {
        if let Some(service) = state.service.take() {
            self.live.store(None);
            let dependencies = std::mem::take(&mut state.dependencies);
            match self.lifecycle.dispose(service, &dependencies) {
                Ok(()) => info!(manager = %self.name, "Service disposed"),
                Err(e) => {
                    error!(manager = %self.name, error = %e, "Service disposal failed");
                    self.publish(&ManagerEvent::DisposalFailed {
                        manager: self.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
        self.set_play_state(next);
    }

    fn apply_change(&self, state: &mut ManagerState<L::Service>, transition: &BindingTransition) {
        let Some(service) = state.service.clone() else {
            return;
        };
        let dependencies = self.resolve_dependencies(state);
        let new_value = transition.current.as_ref().and_then(TrackedValue::resolve);
        debug!(
            manager = %self.name,
            slot = %transition.slot,
            kind = ?transition.kind,
            "Dependency changed while service is live"
        );

        let outcome = {
            let change = DependencyChange {
                kind: transition.kind,
                slot: &transition.slot,
                previous: transition.previous.as_ref(),
                current: transition.current.as_ref(),
                new_value: new_value.as_ref(),
                dependencies: &dependencies,
            };
            self.lifecycle.on_dependency_change(&service, &change)
        };
        state.dependencies = dependencies;

        match outcome {
            Ok(ChangeOutcome::Unchanged) => {}
            Ok(ChangeOutcome::Replace(next)) => {
                let next = Arc::new(next);
                state.service = Some(Arc::clone(&next));
                self.live.store(Some(next));
                info!(manager = %self.name, slot = %transition.slot, "Service instance replaced");
                self.publish(&ManagerEvent::ServiceReplaced {
                    manager: self.name.clone(),
                    slot: transition.slot.clone(),
                });
            }
            Ok(ChangeOutcome::Dispose) => {
                info!(
                    manager = %self.name,
                    slot = %transition.slot,
                    "Lifecycle requested disposal"
                );
                self.dispose_service(state, PlayState::Pending);
            }
            Err(e) => {
                error!(
                    manager = %self.name,
                    slot = %transition.slot,
                    error = %e,
                    "Dependency change handling failed; keeping current instance"
                );
                self.publish(&ManagerEvent::UpdateFailed {
                    manager: self.name.clone(),
                    slot: transition.slot.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn set_play_state(&self, next: PlayState) {
        let previous = PlayState::from_u8(self.play_state.swap(next.as_u8(), Ordering::SeqCst));
        if previous != next {
            info!(manager = %self.name, from = %previous, to = %next, "Play-state changed");
            self.publish(&ManagerEvent::StateChanged {
                manager: self.name.clone(),
                state: next,
                previous,
            });
        }
    }

    fn publish(&self, event: &ManagerEvent) {
        self.listeners.notify(event);
    }

    fn unwatch_all(&self, watches: Vec<WatchId>) {
        if let Some(registry) = &self.registry {
            for id in watches {
                registry.unwatch(id);
            }
        }
    }
}

impl<L: ServiceLifecycle> Drop for ManagerCore<L> {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        let watches = std::mem::take(&mut state.watches);
        self.unwatch_all(watches);
    }
}

/// Routes registry notifications for one slot into its manager
struct SlotListener<L: ServiceLifecycle> {
    slot: String,
    core: Weak<ManagerCore<L>>,
}

impl<L: ServiceLifecycle> RegistryListener for SlotListener<L> {
    fn notify(&self, notification: RegistryNotification) -> Result<()> {
        match self.core.upgrade() {
            Some(core) => core.notify(
                &self.slot,
                notification.kind,
                notification.reference,
                notification.resolver,
            ),
            None => Ok(()),
        }
    }
}

/// Orchestrates one lifecycle instance from its dependency trackers
///
/// Cloning yields another handle to the same manager.
///
/// Methods that inspect tracker state take the manager lock and must not be
/// called from the lifecycle's own callbacks; [`ServiceManager::play_state`]
/// and [`ServiceManager::service`] are lock-free and safe everywhere.
pub struct ServiceManager<L: ServiceLifecycle> {
    core: Arc<ManagerCore<L>>,
}

impl<L: ServiceLifecycle> Clone for ServiceManager<L> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<L: ServiceLifecycle> ServiceManager<L> {
    /// Start configuring a manager for `lifecycle`
    pub fn builder(name: impl Into<String>, lifecycle: L) -> ServiceManagerBuilder<L> {
        ServiceManagerBuilder::new(name, lifecycle)
    }

    /// Manager without registry or overrides; notifications are injected
    /// through [`ServiceManager::notify`]
    pub fn new(name: impl Into<String>, lifecycle: L) -> Result<Self> {
        Self::builder(name, lifecycle).build()
    }

    pub(super) fn from_core(core: Arc<ManagerCore<L>>) -> Self {
        Self { core }
    }

    /// Manager name
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// The managed lifecycle
    pub fn lifecycle(&self) -> &L {
        &self.core.lifecycle
    }

    /// Resolved bindings in declaration order
    pub fn bindings(&self) -> &[BindingSpec] {
        &self.core.bindings
    }

    /// Current play-state
    pub fn play_state(&self) -> PlayState {
        PlayState::from_u8(self.core.play_state.load(Ordering::SeqCst))
    }

    /// Live service instance, if any
    pub fn service(&self) -> Option<Arc<L::Service>> {
        self.core.live.load_full()
    }

    /// Subscribe to this manager's events
    pub fn add_listener(&self, listener: Arc<dyn Listener<ManagerEvent>>) -> ListenerId {
        self.core.listeners.add_listener(listener)
    }

    /// Unsubscribe a listener
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.core.listeners.remove_listener(id)
    }

    /// Watch every slot's descriptor and evaluate readiness once
    ///
    /// Starting twice is a no-op; starting a stopped manager fails.
    pub fn start(&self) -> Result<()> {
        let core = &self.core;
        {
            let mut state = core.lock()?;
            if state.stopped {
                return Err(Error::ManagerStopped {
                    manager: core.name.clone(),
                });
            }
            if state.started || state.starting {
                return Ok(());
            }
            state.starting = true;
        }

        // Registries may replay matches synchronously; the lock is not held here.
        let watches = match self.subscribe() {
            Ok(watches) => watches,
            Err(e) => {
                core.lock()?.starting = false;
                return Err(e);
            }
        };

        let mut state = core.lock()?;
        state.starting = false;
        if state.stopped {
            drop(state);
            core.unwatch_all(watches);
            return Err(Error::ManagerStopped {
                manager: core.name.clone(),
            });
        }
        state.watches = watches;
        state.started = true;
        info!(manager = %core.name, slots = core.bindings.len(), "Service manager started");
        core.evaluate(&mut state, &[]);
        Ok(())
    }

    fn subscribe(&self) -> Result<Vec<WatchId>> {
        let Some(registry) = &self.core.registry else {
            return Ok(Vec::new());
        };
        let mut watches = Vec::with_capacity(self.core.bindings.len());
        for binding in &self.core.bindings {
            let listener: Arc<dyn RegistryListener> = Arc::new(SlotListener {
                slot: binding.name().to_string(),
                core: Arc::downgrade(&self.core),
            });
            match registry.watch(binding.descriptor(), listener) {
                Ok(id) => {
                    debug!(
                        manager = %self.core.name,
                        slot = binding.name(),
                        filter = %binding.descriptor(),
                        "Watching slot"
                    );
                    watches.push(id);
                }
                Err(e) => {
                    self.core.unwatch_all(watches);
                    return Err(e);
                }
            }
        }
        Ok(watches)
    }

    /// Dispose the live service (if any) and stop watching the registry
    ///
    /// Idempotent. Once it returns, no further create, update or dispose
    /// call is made and later notifications are ignored.
    pub fn stop(&self) -> Result<()> {
        let watches = {
            let mut state = self.core.lock()?;
            if state.stopped {
                return Ok(());
            }
            state.stopped = true;
            self.core.dispose_service(&mut state, PlayState::Stopped);
            std::mem::take(&mut state.watches)
        };
        self.core.unwatch_all(watches);
        info!(manager = %self.core.name, "Service manager stopped");
        Ok(())
    }

    /// Apply one registry change to `slot`
    ///
    /// `Modified` for a reference that stopped matching counts as a removal,
    /// for a newly matching one as an addition. `Removed` for a reference the
    /// slot never matched is ignored. A contract violation is returned as an
    /// error and leaves the tracker unchanged.
    pub fn notify(
        &self,
        slot: &str,
        kind: RegistryEventKind,
        reference: Reference,
        resolver: Arc<dyn InstanceResolver>,
    ) -> Result<()> {
        self.core.notify(slot, kind, reference, resolver)
    }

    /// Listener feeding `slot`, for registries driven outside [`Self::start`]
    pub fn slot_listener(&self, slot: &str) -> Result<Arc<dyn RegistryListener>> {
        if !self.core.bindings.iter().any(|b| b.name() == slot) {
            return Err(Error::unknown_slot(slot));
        }
        Ok(Arc::new(SlotListener {
            slot: slot.to_string(),
            core: Arc::downgrade(&self.core),
        }))
    }

    /// Whether every mandatory slot is bound
    pub fn is_ready(&self) -> Result<bool> {
        Ok(self.core.lock()?.is_ready())
    }

    /// Bound value of one slot
    pub fn tracked_dependency(&self, slot: &str) -> Result<Option<TrackedValue>> {
        let state = self.core.lock()?;
        let tracker = state
            .tracker(slot)
            .ok_or_else(|| Error::unknown_slot(slot))?;
        Ok(tracker.tracked_dependency())
    }

    /// Freshly resolved map of every slot
    pub fn dependency_map(&self) -> Result<DependencyMap> {
        let state = self.core.lock()?;
        Ok(self.core.resolve_dependencies(&state))
    }
}

impl<L: ServiceLifecycle> std::fmt::Debug for ServiceManager<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceManager")
            .field("name", &self.core.name)
            .field("state", &self.play_state())
            .field(
                "slots",
                &self
                    .core
                    .bindings
                    .iter()
                    .map(BindingSpec::name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
