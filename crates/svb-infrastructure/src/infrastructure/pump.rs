//! Notification pump
//!
//! Drives a [`ServiceManager`] slot from an async stream of backend events
//! (an etcd-style watch, a broker subscription, or
//! [`InMemoryRegistry::watch_stream`](crate::registry::InMemoryRegistry::watch_stream)).
//! An [`Adapter`] translates each backend event into a registry notification;
//! events it maps to `None` are skipped.
//!
//! Each notification is applied on the blocking pool: the manager takes its
//! state lock and runs lifecycle callbacks synchronously, which must not
//! stall the async worker driving the stream.

use futures::{Stream, StreamExt};
use svb_application::lifecycle::ServiceManager;
use svb_application::ports::lifecycle::ServiceLifecycle;
use svb_application::ports::registry::RegistryNotification;
use svb_domain::ports::Adapter;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Feed `stream` into `slot` of `manager` until the stream ends
///
/// Returns the number of notifications the manager accepted. Rejected
/// notifications are logged and skipped.
pub async fn pump_notifications<L, S, E, A>(
    manager: ServiceManager<L>,
    slot: String,
    mut stream: S,
    adapter: A,
) -> usize
where
    L: ServiceLifecycle,
    S: Stream<Item = E> + Unpin,
    A: Adapter<E, Option<RegistryNotification>>,
{
    let mut accepted = 0;
    while let Some(event) = stream.next().await {
        let Some(notification) = adapter.adapt(event) else {
            continue;
        };
        let reference = notification.reference.to_string();
        let target = manager.clone();
        let target_slot = slot.clone();
        let applied = tokio::task::spawn_blocking(move || {
            target.notify(
                &target_slot,
                notification.kind,
                notification.reference,
                notification.resolver,
            )
        })
        .await;
        match applied {
            Ok(Ok(())) => accepted += 1,
            Ok(Err(e)) => {
                warn!(
                    manager = %manager.name(),
                    slot = %slot,
                    reference = %reference,
                    error = %e,
                    "Notification rejected"
                );
            }
            Err(e) => {
                warn!(
                    manager = %manager.name(),
                    slot = %slot,
                    reference = %reference,
                    error = %e,
                    "Notification task failed"
                );
            }
        }
    }
    debug!(
        manager = %manager.name(),
        slot = %slot,
        accepted,
        "Notification stream ended"
    );
    accepted
}

/// Spawn [`pump_notifications`] on the current tokio runtime
pub fn spawn_notification_pump<L, S, E, A>(
    manager: ServiceManager<L>,
    slot: impl Into<String>,
    stream: S,
    adapter: A,
) -> JoinHandle<usize>
where
    L: ServiceLifecycle,
    S: Stream<Item = E> + Unpin + Send + 'static,
    E: Send + 'static,
    A: Adapter<E, Option<RegistryNotification>> + 'static,
{
    tokio::spawn(pump_notifications(manager, slot.into(), stream, adapter))
}
