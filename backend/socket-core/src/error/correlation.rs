use common::ErrorLocation;
use models::RequestId;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CorrelationError {
    #[error("Duplicate Request Error: request id {request_id} is already outstanding {location}")]
    DuplicateRequestId {
        request_id: RequestId,
        location: ErrorLocation,
    },
}
