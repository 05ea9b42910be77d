//! Subscriber registry for the status fan-out channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::events::StatusEvent;

pub type StatusSender = mpsc::UnboundedSender<StatusEvent>;

/// Handle identifying one subscription, for targeted removal on disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Per-process registry of live subscriber connections, keyed by identity.
///
/// One identity may hold several concurrent connections (multiple tabs);
/// every one of them receives each published event once. No persistence, no
/// retry: a send into a closed channel is ignored.
#[derive(Clone, Default)]
pub struct StatusFeed {
    subscribers: Arc<RwLock<HashMap<Uuid, Vec<(u64, StatusSender)>>>>,
    next_id: Arc<AtomicU64>,
}

impl StatusFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under `user_id`.
    pub async fn subscribe(&self, user_id: Uuid, sender: StatusSender) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self.subscribers.write().await;
        subscribers.entry(user_id).or_default().push((id, sender));
        SubscriptionId(id)
    }

    /// Drop one connection. The identity's entry is removed once its last
    /// connection goes away.
    pub async fn unsubscribe(&self, user_id: Uuid, subscription: SubscriptionId) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(senders) = subscribers.get_mut(&user_id) {
            senders.retain(|(id, _)| *id != subscription.0);
            if senders.is_empty() {
                subscribers.remove(&user_id);
            }
        }
    }

    /// Deliver `event` to every connection subscribed under its owner.
    /// Publishing with no subscribers is a silent no-op.
    pub async fn publish(&self, event: StatusEvent) {
        let subscribers = self.subscribers.read().await;
        if let Some(senders) = subscribers.get(&event.user_id) {
            for (_, sender) in senders {
                // Closed connections are cleaned up on unsubscribe.
                let _ = sender.send(event);
            }
        }
    }

    pub async fn connection_count(&self, user_id: Uuid) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers.get(&user_id).map(Vec::len).unwrap_or(0)
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ShipmentStatus;

    fn event_for(user_id: Uuid) -> StatusEvent {
        StatusEvent::new(user_id, Uuid::new_v4(), ShipmentStatus::Delivered)
    }

    #[tokio::test]
    async fn subscriber_receives_exactly_one_event() {
        let feed = StatusFeed::new();
        let user = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        feed.subscribe(user, tx).await;

        let event = event_for(user);
        feed.publish(event).await;

        assert_eq!(rx.recv().await, Some(event));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_silent() {
        let feed = StatusFeed::new();
        // Must neither error nor panic.
        feed.publish(event_for(Uuid::new_v4())).await;
        assert_eq!(feed.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn events_are_routed_by_identity() {
        let feed = StatusFeed::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (alice_tx, mut alice_rx) = mpsc::unbounded_channel();
        let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();
        feed.subscribe(alice, alice_tx).await;
        feed.subscribe(bob, bob_tx).await;

        let event = event_for(alice);
        feed.publish(event).await;

        assert_eq!(alice_rx.recv().await, Some(event));
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn every_connection_of_an_identity_receives_the_event() {
        let feed = StatusFeed::new();
        let user = Uuid::new_v4();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        feed.subscribe(user, tx1).await;
        feed.subscribe(user, tx2).await;

        let event = event_for(user);
        feed.publish(event).await;

        assert_eq!(rx1.recv().await, Some(event));
        assert_eq!(rx2.recv().await, Some(event));
    }

    #[tokio::test]
    async fn unsubscribe_removes_only_that_connection() {
        let feed = StatusFeed::new();
        let user = Uuid::new_v4();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let first = feed.subscribe(user, tx1).await;
        feed.subscribe(user, tx2).await;

        feed.unsubscribe(user, first).await;
        assert_eq!(feed.connection_count(user).await, 1);

        let event = event_for(user);
        feed.publish(event).await;
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.recv().await, Some(event));
    }

    #[tokio::test]
    async fn last_unsubscribe_clears_the_identity_entry() {
        let feed = StatusFeed::new();
        let user = Uuid::new_v4();
        let (tx, _rx) = mpsc::unbounded_channel();
        let sub = feed.subscribe(user, tx).await;

        feed.unsubscribe(user, sub).await;
        assert_eq!(feed.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_poison_the_feed() {
        let feed = StatusFeed::new();
        let user = Uuid::new_v4();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        feed.subscribe(user, tx_dead).await;
        feed.subscribe(user, tx_live).await;
        drop(rx_dead);

        let event = event_for(user);
        feed.publish(event).await;
        assert_eq!(rx_live.recv().await, Some(event));
    }
}
