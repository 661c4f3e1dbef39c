use crate::error::client::ClientError;
use crate::registry::correlation::{ResponseReceiver, ResponseResult};
use crate::registry::{CorrelationRegistry, lock};

use common::ErrorLocation;
use models::{EventName, RequestId};

use std::future::IntoFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use log::warn;
use tokio::time::Instant;

/// The eventual response to one request.
///
/// Await it to get the [`models::ResponseEnvelope`] of a 200 response, or a
/// [`ClientError::Rejected`] carrying the envelope of any other status.
/// Dropping it stops waiting; the registry entry is released when the
/// response arrives or the connection closes.
///
/// A timeout counts from the moment the request was sent, not from the first
/// poll.
#[derive(Debug)]
pub struct PendingResponse {
    request_id: RequestId,
    event: EventName,
    receiver: ResponseReceiver,
    pending: Arc<Mutex<CorrelationRegistry>>,
    sent_at: Instant,
    timeout: Option<Duration>,
}

impl PendingResponse {
    pub(crate) fn new(
        request_id: RequestId,
        event: EventName,
        receiver: ResponseReceiver,
        pending: Arc<Mutex<CorrelationRegistry>>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            request_id,
            event,
            receiver,
            pending,
            sent_at: Instant::now(),
            timeout,
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn event(&self) -> &EventName {
        &self.event
    }

    /// Give up `timeout` after the request was sent, replacing the client's
    /// default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn wait(self) -> ResponseResult {
        let PendingResponse {
            request_id,
            event,
            receiver,
            pending,
            sent_at,
            timeout,
        } = self;

        let settled = match timeout {
            None => receiver.await,
            Some(limit) => match tokio::time::timeout_at(sent_at + limit, receiver).await {
                Ok(settled) => settled,
                Err(_) => {
                    lock(&pending).take(&request_id);
                    warn!("Request {request_id} for {event} timed out after {limit:?}");
                    return Err(ClientError::Timeout {
                        message: format!(
                            "No response to {event} (request {request_id}) within {limit:?}"
                        ),
                        location: ErrorLocation::caller(),
                    });
                }
            },
        };

        settled.unwrap_or_else(|_| {
            Err(ClientError::connection_closed(format!(
                "Request {request_id} for {event} was dropped without a response"
            )))
        })
    }
}

impl IntoFuture for PendingResponse {
    type Output = ResponseResult;
    type IntoFuture = BoxFuture<'static, ResponseResult>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}
