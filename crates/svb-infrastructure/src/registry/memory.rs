//! In-process service registry
//!
//! Every change is turned into per-watch deliveries under the state lock and
//! appended to a queue. Whichever caller finds the queue idle drains it with
//! the lock released, so listeners see one totally ordered event sequence and
//! may call back into the registry (register from inside `create`, unwatch
//! from a listener) without deadlocking. A change made while another thread is
//! draining is delivered by the draining thread, possibly after the changing
//! call has returned.
//!
//! An unregistered instance stays resolvable until its `Removed` deliveries
//! have been handed out, so listeners reacting to the removal can still reach
//! it. Stream watches resolve later and may find it gone.

use dashmap::DashMap;
use futures::stream;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use svb_application::ports::lifecycle::ServiceInstance;
use svb_application::ports::registry::{
    InstanceResolver, RegistryListener, RegistryNotification, ServiceRegistry, WatchId,
};
use svb_domain::constants::SERVICE_ID;
use svb_domain::error::{Error, Result};
use svb_domain::events::RegistryEventKind;
use svb_domain::value_objects::{Reference, ReferenceId, ServiceDescriptor};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::NotificationStream;

/// Instances behind registered references
#[derive(Default)]
struct InstanceTable(DashMap<ReferenceId, ServiceInstance>);

impl InstanceResolver for InstanceTable {
    fn resolve(&self, reference: &Reference) -> Option<ServiceInstance> {
        self.0.get(&reference.id()).map(|entry| Arc::clone(entry.value()))
    }
}

struct Watch {
    id: WatchId,
    descriptor: ServiceDescriptor,
    listener: Arc<dyn RegistryListener>,
}

struct Delivery {
    watch: WatchId,
    listener: Arc<dyn RegistryListener>,
    kind: RegistryEventKind,
    reference: Reference,
}

enum Queued {
    Deliver(Delivery),
    /// Drop the instance once every earlier delivery has gone out
    Release(ReferenceId),
}

#[derive(Default)]
struct RegistryState {
    references: BTreeMap<ReferenceId, Reference>,
    watches: Vec<Watch>,
    queue: VecDeque<Queued>,
    draining: bool,
}

impl RegistryState {
    /// Queue `kind` for every watch whose descriptor matches `reference`
    fn enqueue_matching(&mut self, kind: RegistryEventKind, reference: &Reference) {
        let deliveries: Vec<Delivery> = self
            .watches
            .iter()
            .filter(|watch| watch.descriptor.matches(reference))
            .map(|watch| delivery_for(watch, kind, reference))
            .collect();
        self.queue.extend(deliveries.into_iter().map(Queued::Deliver));
    }

    fn is_watching(&self, id: WatchId) -> bool {
        self.watches.iter().any(|w| w.id == id)
    }
}

/// Registry holding references and their instances in memory
pub struct InMemoryRegistry {
    state: Mutex<RegistryState>,
    instances: Arc<InstanceTable>,
    next_reference: AtomicU64,
    next_watch: AtomicU64,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            instances: Arc::new(InstanceTable::default()),
            next_reference: AtomicU64::new(1),
            next_watch: AtomicU64::new(1),
        }
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // Queue and reference bookkeeping never panics mid-update, so a poisoned
    // lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `instance` under `interfaces` with the given properties
    ///
    /// The registry assigns the reference id and records it under the
    /// `service.id` property.
    pub fn register(
        &self,
        interfaces: &[&str],
        properties: BTreeMap<String, String>,
        instance: ServiceInstance,
    ) -> Result<Reference> {
        let Some((first, rest)) = interfaces.split_first() else {
            return Err(Error::invalid_argument(
                "a service must be registered under at least one interface",
            ));
        };
        let id = ReferenceId::new(self.next_reference.fetch_add(1, Ordering::SeqCst));
        let reference = rest
            .iter()
            .fold(Reference::new(id, *first), |r, iface| r.with_interface(*iface))
            .with_properties(properties)
            .with_property(SERVICE_ID, id.get().to_string());

        {
            let mut state = self.lock();
            self.instances.0.insert(id, instance);
            state.references.insert(id, reference.clone());
            state.enqueue_matching(RegistryEventKind::Added, &reference);
        }
        debug!(reference = %reference, "Registered service");
        self.drain();
        Ok(reference)
    }

    /// Replace the properties of a registered reference
    ///
    /// Watches the reference enters receive `Added`, watches it leaves
    /// receive `Removed`, and watches it stays in receive `Modified`.
    pub fn modify(
        &self,
        id: ReferenceId,
        properties: BTreeMap<String, String>,
    ) -> Result<Reference> {
        let updated = {
            let mut state = self.lock();
            let previous = state
                .references
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("reference {id}")))?;
            let updated = previous
                .clone()
                .with_properties(properties)
                .with_property(SERVICE_ID, id.get().to_string());
            state.references.insert(id, updated.clone());

            let mut deliveries = Vec::new();
            for watch in &state.watches {
                let kind = match (
                    watch.descriptor.matches(&previous),
                    watch.descriptor.matches(&updated),
                ) {
                    (true, true) => RegistryEventKind::Modified,
                    (true, false) => RegistryEventKind::Removed,
                    (false, true) => RegistryEventKind::Added,
                    (false, false) => continue,
                };
                deliveries.push(delivery_for(watch, kind, &updated));
            }
            state
                .queue
                .extend(deliveries.into_iter().map(Queued::Deliver));
            updated
        };
        debug!(reference = %updated, "Modified service properties");
        self.drain();
        Ok(updated)
    }

    /// Withdraw a registered reference
    ///
    /// The reference disappears at once; its instance is released after the
    /// `Removed` notifications have been delivered.
    pub fn unregister(&self, id: ReferenceId) -> Result<Reference> {
        let removed = {
            let mut state = self.lock();
            let removed = state
                .references
                .remove(&id)
                .ok_or_else(|| Error::not_found(format!("reference {id}")))?;
            state.enqueue_matching(RegistryEventKind::Removed, &removed);
            state.queue.push_back(Queued::Release(id));
            removed
        };
        debug!(reference = %removed, "Unregistered service");
        self.drain();
        Ok(removed)
    }

    /// Reference registered under `id`
    pub fn get(&self, id: ReferenceId) -> Option<Reference> {
        self.lock().references.get(&id).cloned()
    }

    /// All registered references in registration order
    pub fn references(&self) -> Vec<Reference> {
        self.lock().references.values().cloned().collect()
    }

    /// References matching `descriptor` in registration order
    pub fn find(&self, descriptor: &ServiceDescriptor) -> Vec<Reference> {
        self.lock()
            .references
            .values()
            .filter(|r| descriptor.matches(*r))
            .cloned()
            .collect()
    }

    /// Instance behind `reference`, if still registered
    pub fn resolve(&self, reference: &Reference) -> Option<ServiceInstance> {
        self.instances.resolve(reference)
    }

    /// Number of registered references
    pub fn len(&self) -> usize {
        self.lock().references.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of active watches
    pub fn watch_count(&self) -> usize {
        self.lock().watches.len()
    }

    /// Watch `descriptor` as an async stream of notifications
    ///
    /// Existing matches arrive first as `Added`. The watch stays active until
    /// [`ServiceRegistry::unwatch`] is called with the returned id; once the
    /// stream is dropped further notifications are discarded.
    pub fn watch_stream(
        &self,
        descriptor: &ServiceDescriptor,
    ) -> Result<(WatchId, NotificationStream)> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.watch(descriptor, Arc::new(StreamListener { sender }))?;

        let stream = stream::unfold(receiver, |mut rx| async move {
            rx.recv().await.map(|notification| (notification, rx))
        });
        Ok((id, Box::pin(stream)))
    }

    fn drain(&self) {
        {
            let mut state = self.lock();
            if state.draining {
                return;
            }
            state.draining = true;
        }
        let _guard = DrainGuard(self);

        loop {
            let next = {
                let mut state = self.lock();
                let mut next = None;
                while let Some(queued) = state.queue.pop_front() {
                    match queued {
                        Queued::Deliver(delivery) if state.is_watching(delivery.watch) => {
                            next = Some(delivery);
                            break;
                        }
                        Queued::Deliver(_) => {}
                        Queued::Release(id) => {
                            self.instances.0.remove(&id);
                        }
                    }
                }
                if next.is_none() {
                    state.draining = false;
                }
                next
            };
            let Some(delivery) = next else {
                return;
            };

            let resolver: Arc<dyn InstanceResolver> = self.instances.clone();
            let notification =
                RegistryNotification::new(delivery.kind, delivery.reference, resolver);
            if let Err(e) = delivery.listener.notify(notification) {
                warn!(
                    watch = delivery.watch.get(),
                    error = %e,
                    "Watch listener rejected notification"
                );
            }
        }
    }
}

/// Releases the drain flag if a listener panics mid-delivery
struct DrainGuard<'a>(&'a InMemoryRegistry);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().draining = false;
        }
    }
}

fn delivery_for(watch: &Watch, kind: RegistryEventKind, reference: &Reference) -> Delivery {
    Delivery {
        watch: watch.id,
        listener: Arc::clone(&watch.listener),
        kind,
        reference: reference.clone(),
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("InMemoryRegistry")
            .field("references", &state.references.len())
            .field("watches", &state.watches.len())
            .field("queued", &state.queue.len())
            .finish()
    }
}

impl ServiceRegistry for InMemoryRegistry {
    fn watch(
        &self,
        descriptor: &ServiceDescriptor,
        listener: Arc<dyn RegistryListener>,
    ) -> Result<WatchId> {
        descriptor.validate()?;
        let id = WatchId::new(self.next_watch.fetch_add(1, Ordering::SeqCst));
        {
            let mut state = self.lock();
            let watch = Watch {
                id,
                descriptor: descriptor.clone(),
                listener,
            };
            let replay: Vec<Delivery> = state
                .references
                .values()
                .filter(|r| descriptor.matches(*r))
                .map(|r| delivery_for(&watch, RegistryEventKind::Added, r))
                .collect();
            state.queue.extend(replay.into_iter().map(Queued::Deliver));
            state.watches.push(watch);
        }
        debug!(watch = id.get(), filter = %descriptor, "Watch registered");
        self.drain();
        Ok(id)
    }

    fn unwatch(&self, id: WatchId) -> bool {
        let mut state = self.lock();
        let before = state.watches.len();
        state.watches.retain(|w| w.id != id);
        let removed = state.watches.len() != before;
        if removed {
            debug!(watch = id.get(), "Watch removed");
        }
        removed
    }
}

/// Forwards notifications into an async channel
struct StreamListener {
    sender: mpsc::UnboundedSender<RegistryNotification>,
}

impl RegistryListener for StreamListener {
    fn notify(&self, notification: RegistryNotification) -> Result<()> {
        if self.sender.send(notification).is_err() {
            debug!("Watch stream dropped; discarding notification");
        }
        Ok(())
    }
}
