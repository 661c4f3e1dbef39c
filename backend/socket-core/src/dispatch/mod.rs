//! Routes decoded messages to request waiters or event handlers.
//!
//! A message whose request id matches an outstanding request goes to that
//! request alone. Everything else is a broadcast and fans out to the event's
//! handlers in registration order.

use crate::error::client::ClientError;
use crate::registry::{CorrelationRegistry, SubscriptionRegistry, lock};

use common::ErrorLocation;
use models::{EventName, Message, RequestId};

use std::sync::{Arc, Mutex};

use log::{debug, warn};

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A waiting request received a 200 response.
    Resolved(RequestId),

    /// A waiting request received a non-200 response.
    Rejected(RequestId),

    /// A broadcast reached `handlers` subscriptions.
    Delivered { event: EventName, handlers: usize },

    /// Nothing was waiting for the message.
    Unhandled(EventName),
}

#[derive(Debug, Clone)]
pub struct Router {
    pending: Arc<Mutex<CorrelationRegistry>>,
    subscriptions: Arc<Mutex<SubscriptionRegistry>>,
}

impl Router {
    pub fn new(
        pending: Arc<Mutex<CorrelationRegistry>>,
        subscriptions: Arc<Mutex<SubscriptionRegistry>>,
    ) -> Self {
        Self {
            pending,
            subscriptions,
        }
    }

    /// Route every message of a frame, preserving frame order.
    pub fn dispatch_all(&self, messages: Vec<Message>) -> Vec<DispatchOutcome> {
        messages
            .into_iter()
            .map(|message| self.dispatch(message))
            .collect()
    }

    pub fn dispatch(&self, message: Message) -> DispatchOutcome {
        let waiter = message
            .request_id
            .as_ref()
            .and_then(|id| lock(&self.pending).take(id));

        if let (Some(waiter), Some(request_id)) = (waiter, message.request_id.clone()) {
            let event = waiter.event().clone();
            let envelope = message.into_envelope();

            if envelope.is_ok() {
                if !waiter.resolve(envelope) {
                    debug!("Request {request_id} for {event} resolved after its caller stopped waiting");
                }
                return DispatchOutcome::Resolved(request_id);
            }

            debug!(
                "Request {request_id} for {event} rejected with status {}",
                envelope.status
            );
            let error = ClientError::Rejected {
                event,
                envelope,
                location: ErrorLocation::caller(),
            };
            waiter.reject(error);
            return DispatchOutcome::Rejected(request_id);
        }

        let handlers = lock(&self.subscriptions).lookup(message.event.as_str());

        if handlers.is_empty() {
            warn!("No handler for event {}", message.event);
            return DispatchOutcome::Unhandled(message.event);
        }

        let envelope = message.envelope();
        for handler in &handlers {
            handler(&envelope);
        }

        DispatchOutcome::Delivered {
            event: message.event,
            handlers: handlers.len(),
        }
    }
}
