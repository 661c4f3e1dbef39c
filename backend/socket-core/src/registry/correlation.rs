//! Outstanding requests keyed by request id.

use crate::error::client::ClientError;
use crate::error::correlation::CorrelationError;

use common::ErrorLocation;
use models::{EventName, RequestId, ResponseEnvelope};

use std::collections::HashMap;

use log::debug;
use tokio::sync::oneshot;

pub type ResponseResult = Result<ResponseEnvelope, ClientError>;
pub type ResponseReceiver = oneshot::Receiver<ResponseResult>;

/// The waiter of one in-flight request.
///
/// Completing it consumes it, so a request settles at most once.
#[derive(Debug)]
pub struct PendingRequest {
    event: EventName,
    generation: u64,
    responder: oneshot::Sender<ResponseResult>,
}

impl PendingRequest {
    pub fn event(&self) -> &EventName {
        &self.event
    }

    /// Connection generation the request was written to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolve the caller's future. Returns false when the caller stopped waiting.
    pub fn resolve(self, envelope: ResponseEnvelope) -> bool {
        self.responder.send(Ok(envelope)).is_ok()
    }

    /// Reject the caller's future. Returns false when the caller stopped waiting.
    pub fn reject(self, error: ClientError) -> bool {
        self.responder.send(Err(error)).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct CorrelationRegistry {
    pending: HashMap<RequestId, PendingRequest>,
}

impl CorrelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a waiter for `request_id` and hand back the receiving end.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationError::DuplicateRequestId`] if the id is already
    /// outstanding. The existing waiter is left untouched.
    #[track_caller]
    pub fn register(
        &mut self,
        request_id: RequestId,
        event: EventName,
        generation: u64,
    ) -> Result<ResponseReceiver, CorrelationError> {
        if self.pending.contains_key(&request_id) {
            return Err(CorrelationError::DuplicateRequestId {
                request_id,
                location: ErrorLocation::caller(),
            });
        }

        let (responder, receiver) = oneshot::channel();
        debug!("Registered request {request_id} for {event}");
        self.pending.insert(
            request_id,
            PendingRequest {
                event,
                generation,
                responder,
            },
        );

        Ok(receiver)
    }

    /// Remove and return the waiter for `request_id`, if any.
    pub fn take(&mut self, request_id: &RequestId) -> Option<PendingRequest> {
        self.pending.remove(request_id)
    }

    pub fn contains(&self, request_id: &RequestId) -> bool {
        self.pending.contains_key(request_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove every waiter written to connection `generation`.
    pub fn drain_generation(&mut self, generation: u64) -> Vec<(RequestId, PendingRequest)> {
        let ids: Vec<RequestId> = self
            .pending
            .iter()
            .filter(|(_, request)| request.generation == generation)
            .map(|(id, _)| id.clone())
            .collect();

        ids.into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|request| (id, request)))
            .collect()
    }
}
