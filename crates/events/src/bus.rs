//! Filtered fan-out event bus with per-subscriber bounded mailboxes.
//!
//! Delivery is non-blocking by construction: a publish attempts a
//! `try_send` into each matching mailbox and silently drops the event for
//! any subscriber whose mailbox is full. A slow observer can therefore
//! never stall job processing or starve other observers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;

use crate::event::{Event, EventFilter};

/// Fixed capacity of each subscriber's mailbox.
pub const MAILBOX_CAPACITY: usize = 64;

struct SubscriberEntry {
    filter: EventFilter,
    tx: mpsc::Sender<Event>,
}

type Registry = Arc<RwLock<HashMap<String, SubscriberEntry>>>;

/// In-process publish/subscribe hub.
///
/// Designed to be shared via `Arc<EventBus>`; all methods take `&self` and
/// are safe to call concurrently. The bus retains no history: a new
/// subscriber sees nothing published before it subscribed.
pub struct EventBus {
    subscribers: Registry,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new subscriber with a bounded mailbox.
    ///
    /// The returned [`Subscription`] unsubscribes when dropped.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);

        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), SubscriberEntry { filter, tx });

        Subscription {
            guard: SubscriptionGuard {
                id,
                registry: Arc::clone(&self.subscribers),
            },
            rx,
        }
    }

    /// Publish an event to every matching subscriber.
    ///
    /// Assigns the next monotonically increasing identifier and returns it.
    /// Never blocks: a full mailbox drops the event for that subscriber
    /// only, and the publisher does not learn about the loss.
    pub fn publish(&self, mut event: Event) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        event.id = id;

        let subs = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for entry in subs.values() {
            if entry.filter.matches(&event) {
                let _ = entry.tx.try_send(event.clone());
            }
        }
        id
    }

    /// Number of currently active subscribers. Observability only.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription: the receiving half of one subscriber's mailbox.
///
/// Dropping the subscription removes the subscriber from the fan-out set
/// first and only then closes the mailbox (the guard field is declared
/// before the receiver, so it drops first), meaning an in-flight publish
/// never observes a closed mailbox that is still registered.
pub struct Subscription {
    guard: SubscriptionGuard,
    rx: mpsc::Receiver<Event>,
}

impl Subscription {
    /// The subscriber's identity.
    pub fn id(&self) -> &str {
        &self.guard.id
    }

    /// Wait for the next delivered event.
    ///
    /// Returns `None` once the subscription has been unsubscribed and its
    /// mailbox drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Non-blocking receive, for polling consumers and tests.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Split into the unsubscribe guard and the raw receiver, for stream
    /// adaptation at a transport boundary. The registration stays alive
    /// until the guard is dropped.
    pub fn into_parts(self) -> (SubscriptionGuard, mpsc::Receiver<Event>) {
        (self.guard, self.rx)
    }
}

/// Keeps a subscriber registered while its receiver lives elsewhere;
/// unsubscribes on drop.
pub struct SubscriptionGuard {
    id: String,
    registry: Registry,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
