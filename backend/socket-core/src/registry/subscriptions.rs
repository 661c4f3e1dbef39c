//! Persistent event handlers keyed by event name.

use models::{EventName, ResponseEnvelope};

use std::fmt;
use std::sync::Arc;

use log::debug;

/// A handler invoked for every broadcast of its event.
pub type EventCallback = Arc<dyn Fn(&ResponseEnvelope) + Send + Sync>;

/// Handle returned by [`SubscriptionRegistry::add`].
///
/// Ids increase monotonically and are never reused, even after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Subscription {
    id: SubscriptionId,
    event: EventName,
    callback: EventCallback,
}

#[derive(Default)]
pub struct SubscriptionRegistry {
    last_id: u64,
    subscriptions: Vec<Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `event`. Handlers for one event run in
    /// registration order.
    pub fn add<F>(&mut self, event: EventName, callback: F) -> SubscriptionId
    where
        F: Fn(&ResponseEnvelope) + Send + Sync + 'static,
    {
        self.last_id += 1;
        let id = SubscriptionId(self.last_id);

        debug!("Subscribed handler {id} to {event}");
        self.subscriptions.push(Subscription {
            id,
            event,
            callback: Arc::new(callback),
        });

        id
    }

    /// Remove one handler. Unknown ids are a no-op.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        before != self.subscriptions.len()
    }

    /// Remove every handler for `event`, or every handler when `event` is `None`.
    pub fn remove_all(&mut self, event: Option<&str>) -> usize {
        let before = self.subscriptions.len();

        match event {
            Some(event) => self
                .subscriptions
                .retain(|subscription| subscription.event != *event),
            None => self.subscriptions.clear(),
        }

        before - self.subscriptions.len()
    }

    /// Snapshot of the handlers for `event`, in registration order.
    pub fn lookup(&self, event: &str) -> Vec<EventCallback> {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.event == *event)
            .map(|subscription| Arc::clone(&subscription.callback))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("last_id", &self.last_id)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
