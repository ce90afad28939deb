// crates/server/src/jobs/broadcast.rs
//! Ordered multi-subscriber channel for started/progress events.
//!
//! Each category keeps its subscribers in registration order. `publish`
//! works on a stable snapshot of the current senders, so subscribe and
//! unsubscribe interleave safely with delivery, and a dead subscriber is
//! pruned without affecting the others. There is no replay: a subscriber
//! registered after a job started catches up through `status()`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::types::{ProgressEvent, StartedEvent};

type SubscriberList<T> = Mutex<Vec<(u64, UnboundedSender<T>)>>;

/// One event category's subscriber registry.
struct Registry<T> {
    next_id: AtomicU64,
    subscribers: Arc<SubscriberList<T>>,
}

impl<T: Clone> Registry<T> {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn subscribe(&self) -> (Subscription<T>, UnboundedReceiver<T>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        match self.subscribers.lock() {
            Ok(mut subs) => subs.push((id, tx)),
            Err(e) => tracing::error!("subscriber list poisoned on subscribe: {e}"),
        }
        (
            Subscription {
                id,
                subscribers: Arc::downgrade(&self.subscribers),
            },
            rx,
        )
    }

    fn publish(&self, event: T) {
        // Snapshot the current senders so delivery order is the
        // registration order at publish time, regardless of concurrent
        // (un)subscribes.
        let snapshot: Vec<(u64, UnboundedSender<T>)> = match self.subscribers.lock() {
            Ok(subs) => subs.clone(),
            Err(e) => {
                tracing::error!("subscriber list poisoned on publish: {e}");
                return;
            }
        };

        let mut dead: Vec<u64> = Vec::new();
        for (id, tx) in &snapshot {
            if tx.send(event.clone()).is_err() {
                dead.push(*id);
            }
        }

        if !dead.is_empty() {
            if let Ok(mut subs) = self.subscribers.lock() {
                subs.retain(|(id, _)| !dead.contains(id));
            }
            tracing::debug!(pruned = dead.len(), "pruned closed subscribers");
        }
    }

    fn len(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// Revocation handle for one subscription.
///
/// `unsubscribe` is idempotent; dropping the handle unsubscribes too, so an
/// SSE connection revokes itself when the stream is torn down.
pub struct Subscription<T> {
    id: u64,
    subscribers: Weak<SubscriberList<T>>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(&self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            if let Ok(mut subs) = subscribers.lock() {
                subs.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Broadcaster shared by the controller (producer) and every subscription.
pub struct EventBroadcaster {
    started: Registry<StartedEvent>,
    progress: Registry<ProgressEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self {
            started: Registry::new(),
            progress: Registry::new(),
        }
    }

    pub fn subscribe_started(
        &self,
    ) -> (Subscription<StartedEvent>, UnboundedReceiver<StartedEvent>) {
        self.started.subscribe()
    }

    pub fn subscribe_progress(
        &self,
    ) -> (Subscription<ProgressEvent>, UnboundedReceiver<ProgressEvent>) {
        self.progress.subscribe()
    }

    pub fn publish_started(&self, event: StartedEvent) {
        self.started.publish(event);
    }

    pub fn publish_progress(&self, event: ProgressEvent) {
        self.progress.publish(event);
    }

    /// Current subscriber counts (started, progress).
    pub fn subscriber_counts(&self) -> (usize, usize) {
        (self.started.len(), self.progress.len())
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
