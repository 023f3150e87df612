//! In-process broadcast bus
//!
//! The ledger is the single publisher; any number of collaborators
//! subscribe. Publishing is non-blocking: a subscriber that falls more
//! than `capacity` envelopes behind observes a `Lagged` error on its
//! receiver and skips forward, the ledger never waits.

use crate::notification::{Envelope, Notification};
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast bus for domain notifications
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Envelope>,
}

impl EventBus {
    /// Create a bus retaining up to `capacity` envelopes per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification, returning the envelope it was wrapped in
    ///
    /// A bus with no subscribers swallows the envelope; emission is
    /// fire-and-forget by contract.
    pub fn publish(&self, notification: Notification) -> Envelope {
        let envelope = Envelope::new(notification);
        debug!(subject = %envelope.subject, id = %envelope.id, "publishing notification");
        let _ = self.sender.send(envelope.clone());
        envelope
    }

    /// Subscribe to all notifications from this point on
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
