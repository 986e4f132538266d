//! Manager Event Bus
//!
//! Fans manager events out to async subscribers over a tokio broadcast
//! channel. Events are not persisted; a subscriber that falls behind by more
//! than the channel capacity loses the oldest events.

use crate::config::EventBusConfig;
use crate::constants::DEFAULT_EVENT_CAPACITY;
use futures::{Stream, stream};
use std::pin::Pin;
use std::sync::Arc;
use svb_domain::events::ManagerEvent;
use svb_domain::ports::Listener;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Stream of manager events
pub type ManagerEventStream = Pin<Box<dyn Stream<Item = ManagerEvent> + Send>>;

/// Event bus using tokio broadcast channels
///
/// Implements [`Listener`], so it can be attached to any number of managers.
#[derive(Clone)]
pub struct ManagerEventBus {
    sender: Arc<broadcast::Sender<ManagerEvent>>,
    capacity: usize,
}

impl ManagerEventBus {
    /// Create a new event bus with default capacity (1024)
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
            capacity,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &EventBusConfig) -> Self {
        Self::with_capacity(config.capacity)
    }

    /// Publish an event to every current subscriber
    pub fn publish(&self, event: ManagerEvent) {
        match self.sender.send(event) {
            Ok(count) => debug!("Published manager event to {} subscribers", count),
            Err(_) => debug!("Published manager event but no subscribers"),
        }
    }

    /// Subscribe to events published from now on
    pub fn subscribe_events(&self) -> ManagerEventStream {
        let receiver = self.sender.subscribe();

        let stream = stream::unfold(receiver, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Manager event stream lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Box::pin(stream)
    }

    /// Whether anyone is subscribed
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }

    /// Get the current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ManagerEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManagerEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerEventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl Listener<ManagerEvent> for ManagerEventBus {
    fn on_event(&self, event: &ManagerEvent) {
        self.publish(event.clone());
    }
}
