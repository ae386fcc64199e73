//! Change-notification channel shared by store implementations.
//!
//! Each subscriber owns one unbounded `mpsc` receiver, so messages reach it in
//! publish order. Dropping the [`Subscription`] unregisters it from the feed
//! immediately; nothing is left behind to receive further events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::mpsc;

use super::{ChangeEvent, FeedMessage};

type Registry = Mutex<HashMap<u64, mpsc::UnboundedSender<FeedMessage>>>;

/// Publisher side of a store's change feed.
#[derive(Default)]
pub struct ChangeFeed {
    registry: Arc<Registry>,
    next_id: AtomicU64,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, sender);

        Subscription {
            receiver,
            registration: Some(Registration {
                id,
                registry: Arc::downgrade(&self.registry),
            }),
        }
    }

    /// Deliver a change event to every live subscriber.
    pub fn publish(&self, event: ChangeEvent) {
        self.broadcast(&FeedMessage::Event(event));
    }

    /// Report a transport failure to every live subscriber.
    pub fn publish_error(&self, reason: impl Into<String>) {
        self.broadcast(&FeedMessage::TransportError(reason.into()));
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn broadcast(&self, message: &FeedMessage) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.retain(|_, sender| sender.send(message.clone()).is_ok());
    }
}

struct Registration {
    id: u64,
    registry: Weak<Registry>,
}

/// A live change-feed channel. Released on [`Subscription::cancel`] or drop.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<FeedMessage>,
    registration: Option<Registration>,
}

impl Subscription {
    /// Wrap a receiver fed by some other transport (polling, websocket, ...).
    pub const fn from_receiver(receiver: mpsc::UnboundedReceiver<FeedMessage>) -> Self {
        Self {
            receiver,
            registration: None,
        }
    }

    /// Wait for the next message. `None` once the store side is gone.
    pub async fn recv(&mut self) -> Option<FeedMessage> {
        self.receiver.recv().await
    }

    /// Release the channel.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.receiver.close();
        let Some(registration) = self.registration.take() else {
            return;
        };
        if let Some(registry) = registration.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&registration.id);
        }
    }
}
