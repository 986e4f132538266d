//! Notification pump tests

use crate::test_utils::{GreeterLifecycle, STORE, Store, store};
use futures::stream;
use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use svb_application::{
    DependencyMap, InstanceResolver, RegistryNotification, ServiceLifecycle, ServiceManager,
    ServiceRegistry,
};
use svb_domain::{
    DependencySpec, Error, PlayState, Reference, ReferenceId, RegistryEventKind, Result,
    ServiceDescriptor,
};
use svb_infrastructure::{InMemoryRegistry, pump_notifications, spawn_notification_pump};

fn notification(kind: RegistryEventKind, id: u64) -> RegistryNotification {
    let resolver: Arc<dyn InstanceResolver> = Arc::new(|_: &Reference| Some(store("pumped")));
    RegistryNotification::new(kind, Reference::new(ReferenceId::new(id), STORE), resolver)
}

fn started_greeter() -> ServiceManager<GreeterLifecycle> {
    let manager = ServiceManager::new("greeter", GreeterLifecycle::new()).unwrap();
    manager.start().unwrap();
    manager
}

#[tokio::test]
async fn test_pump_counts_accepted_notifications() {
    let manager = started_greeter();
    let events = stream::iter(vec![
        Some(notification(RegistryEventKind::Added, 1)),
        None,
        Some(notification(RegistryEventKind::Added, 1)),
        Some(notification(RegistryEventKind::Removed, 9)),
    ]);

    let accepted = pump_notifications(
        manager.clone(),
        "store".to_string(),
        events,
        |event: Option<RegistryNotification>| event,
    )
    .await;

    // The duplicate addition is rejected; the unknown removal is ignored.
    assert_eq!(accepted, 2);
    assert_eq!(manager.play_state(), PlayState::Running);
    assert_eq!(manager.service().unwrap().store.name, "pumped");
}

#[tokio::test]
async fn test_pump_into_unknown_slot_accepts_nothing() {
    let manager = started_greeter();
    let events = stream::iter(vec![notification(RegistryEventKind::Added, 1)]);

    let accepted = pump_notifications(manager.clone(), "missing".to_string(), events, Some).await;

    assert_eq!(accepted, 0);
    assert_eq!(manager.play_state(), PlayState::Pending);
}

#[tokio::test]
async fn test_spawned_pump_follows_registry_stream() {
    let registry = InMemoryRegistry::new_shared();
    let manager = started_greeter();

    let (watch, events) = registry
        .watch_stream(&ServiceDescriptor::new(STORE))
        .unwrap();
    let handle = spawn_notification_pump(manager.clone(), "store", events, Some);

    let a = registry.register(&[STORE], BTreeMap::new(), store("a")).unwrap();
    registry.register(&[STORE], BTreeMap::new(), store("b")).unwrap();
    registry.unregister(a.id()).unwrap();

    // Dropping the watch closes the stream and ends the pump.
    assert!(registry.unwatch(watch));
    let accepted = handle.await.unwrap();

    assert_eq!(accepted, 3);
    assert_eq!(manager.play_state(), PlayState::Running);
    let bound: Arc<Store> = manager
        .dependency_map()
        .unwrap()
        .single::<Store>("store")
        .unwrap();
    assert_eq!(bound.name, "b");
}

/// Creation waits for a signal sent from another task on the same runtime
struct GatedLifecycle {
    gate: Mutex<Receiver<()>>,
}

impl ServiceLifecycle for GatedLifecycle {
    type Service = ();

    fn dependencies(&self) -> Vec<DependencySpec> {
        vec![DependencySpec::mandatory("store", STORE)]
    }

    fn create(&self, _dependencies: &DependencyMap) -> Result<()> {
        let gate = self.gate.lock().unwrap();
        gate.recv_timeout(Duration::from_secs(5))
            .map_err(|_| Error::internal("gate never opened"))
    }
}

#[tokio::test]
async fn test_blocking_lifecycle_does_not_stall_the_runtime() {
    let (open, gate) = channel();
    let manager = ServiceManager::new(
        "gated",
        GatedLifecycle {
            gate: Mutex::new(gate),
        },
    )
    .unwrap();
    manager.start().unwrap();

    let opener = tokio::spawn(async move {
        let _ = open.send(());
    });
    let events = stream::iter(vec![notification(RegistryEventKind::Added, 1)]);
    let accepted = pump_notifications(manager.clone(), "store".to_string(), events, Some).await;
    opener.await.unwrap();

    assert_eq!(accepted, 1);
    assert_eq!(manager.play_state(), PlayState::Running);
}
