//! Shared tables consulted by the dispatch router.
//!
//! Both registries live behind a `std::sync::Mutex` shared by the client
//! handle and the connection task. Handlers are always invoked after the lock
//! is released, so a handler may register or remove handlers itself.

pub mod correlation;
pub mod subscriptions;

pub use correlation::{CorrelationRegistry, PendingRequest, ResponseReceiver};
pub use subscriptions::{EventCallback, SubscriptionId, SubscriptionRegistry};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a registry, recovering the data if a handler panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
