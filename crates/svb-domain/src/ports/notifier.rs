//! Listener fan-out

use super::Listener;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Handle returned by [`Notifier::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered list of listeners sharing one event type
///
/// Listeners are invoked in registration order on a snapshot of the list, so
/// a listener may add or remove listeners while being notified.
pub struct Notifier<E> {
    listeners: RwLock<Vec<(ListenerId, Arc<dyn Listener<E>>)>>,
    next_id: AtomicU64,
}

impl<E> Notifier<E> {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener
    pub fn add_listener(&self, listener: Arc<dyn Listener<E>>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Unregister a listener; returns whether it was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener
    pub fn notify(&self, event: &E) {
        let snapshot: Vec<Arc<dyn Listener<E>>> = self
            .listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener.on_event(event);
        }
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .finish()
    }
}
