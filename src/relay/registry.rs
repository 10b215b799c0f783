//! Subscriber registry
//!
//! Membership set for live broadcast connections. Connects, disconnects
//! and the broadcaster's reads all race; the map sits behind a mutex with
//! short critical sections, and iteration for sending always works on a
//! point-in-time snapshot so no lock is held across I/O.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque handle identifying one live subscriber connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outbound channel carrying pre-serialized frames to one subscriber
pub type SubscriberSender = mpsc::Sender<Arc<str>>;

/// Concurrency-safe set of currently connected subscribers
#[derive(Default)]
pub struct SubscriberRegistry {
    inner: Mutex<HashMap<SubscriberId, SubscriberSender>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Re-adding an existing id replaces its sender.
    pub fn add(&self, id: SubscriberId, sender: SubscriberSender) {
        self.inner.lock().insert(id, sender);
    }

    /// Unregister a subscriber. Removing an absent id is a no-op.
    ///
    /// Returns whether the id was present.
    pub fn remove(&self, id: SubscriberId) -> bool {
        self.inner.lock().remove(&id).is_some()
    }

    /// Point-in-time copy of the registered subscribers, for iteration
    /// without holding the lock across sends
    pub fn snapshot(&self) -> Vec<(SubscriberId, SubscriberSender)> {
        self.inner
            .lock()
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
