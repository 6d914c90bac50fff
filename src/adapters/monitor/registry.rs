//! Observer registry for live call monitoring.
//!
//! Every connected monitor gets every event. Publishing never waits on
//! observers: the broadcast channel drops the oldest messages for anyone
//! who falls behind.
//!
//! ```text
//! webhook / handler ──publish──▶ broadcast::Sender<CallEvent>
//!                                  ├── monitor client a
//!                                  ├── monitor client b
//!                                  └── monitor client c
//! ```

use std::collections::HashSet;

use tokio::sync::{broadcast, RwLock};

use crate::domain::dispatch::CallEvent;
use crate::domain::foundation::ClientId;
use crate::ports::CallObserver;

/// Default buffer size for the broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Registry of connected monitor clients.
pub struct ObserverRegistry {
    sender: broadcast::Sender<CallEvent>,

    /// Connected clients, for status reporting and cleanup.
    clients: RwLock<HashSet<ClientId>>,
}

impl ObserverRegistry {
    /// Create a registry whose channel buffers `channel_capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `channel_capacity` is zero. Configuration validation
    /// rejects zero before this is reached.
    pub fn new(channel_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity);
        Self {
            sender,
            clients: RwLock::new(HashSet::new()),
        }
    }

    /// Register a new observer. Returns its id and event receiver.
    pub async fn add(&self) -> (ClientId, broadcast::Receiver<CallEvent>) {
        let client_id = ClientId::new();
        let receiver = self.sender.subscribe();
        self.clients.write().await.insert(client_id);
        tracing::debug!(client_id = %client_id, "Monitor connected");
        (client_id, receiver)
    }

    /// Unregister an observer. Unknown ids are ignored.
    pub async fn remove(&self, client_id: &ClientId) {
        if self.clients.write().await.remove(client_id) {
            tracing::debug!(client_id = %client_id, "Monitor disconnected");
        }
    }

    /// Number of registered clients.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_registered(&self, client_id: &ClientId) -> bool {
        self.clients.read().await.contains(client_id)
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl CallObserver for ObserverRegistry {
    fn publish(&self, event: CallEvent) {
        // No receivers is not an error
        let _ = self.sender.send(event);
    }

    fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CallId;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    fn event(name: &str) -> CallEvent {
        CallEvent::webhook_received(
            CallId::new("call_1").unwrap(),
            name,
            serde_json::Value::Null,
        )
    }

    #[tokio::test]
    async fn publish_without_observers_is_a_no_op() {
        let registry = ObserverRegistry::default();
        registry.publish(event("call_started"));
        assert_eq!(registry.observer_count(), 0);
    }

    #[tokio::test]
    async fn every_observer_receives_every_event() {
        let registry = ObserverRegistry::default();
        let (_, mut a) = registry.add().await;
        let (_, mut b) = registry.add().await;

        registry.publish(event("call_started"));

        assert_eq!(a.recv().await.unwrap().event_type(), "call.webhook_received.v1");
        assert_eq!(b.recv().await.unwrap().event_type(), "call.webhook_received.v1");
        assert_eq!(registry.client_count().await, 2);
    }

    #[tokio::test]
    async fn remove_unregisters_client() {
        let registry = ObserverRegistry::default();
        let (client_id, receiver) = registry.add().await;
        assert!(registry.is_registered(&client_id).await);

        registry.remove(&client_id).await;
        drop(receiver);

        assert!(!registry.is_registered(&client_id).await);
        assert_eq!(registry.client_count().await, 0);
        assert_eq!(registry.observer_count(), 0);
    }

    #[tokio::test]
    async fn events_before_subscribing_are_not_delivered() {
        let registry = ObserverRegistry::default();
        registry.publish(event("early"));
        let (_, mut rx) = registry.add().await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn slow_observer_lags_instead_of_blocking() {
        let registry = ObserverRegistry::new(2);
        let (_, mut rx) = registry.add().await;

        for i in 0..5 {
            registry.publish(event(&format!("event_{}", i)));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert!(rx.recv().await.is_ok());
    }
}
