use super::FIELD_SEPARATOR;
use super::outbound::OutboundPayload;
use crate::error::codec::CodecError;

use models::{EventName, RequestId};

/// Encode one outbound message.
///
/// Requests always carry a request id. Without one the frame is the bare event,
/// optionally followed by the payload.
pub fn encode(
    event: &EventName,
    request_id: Option<&RequestId>,
    payload: &OutboundPayload,
) -> Result<String, CodecError> {
    let payload = payload.to_wire()?;
    Ok(frame(event, request_id, payload.as_deref()))
}

/// Assemble a frame from fields that are already in wire form.
pub fn frame(event: &EventName, request_id: Option<&RequestId>, payload: Option<&str>) -> String {
    let fields = [request_id.map(RequestId::as_str), payload];
    let capacity = fields
        .iter()
        .flatten()
        .fold(event.as_str().len(), |len, field| len + 1 + field.len());

    let mut text = String::with_capacity(capacity);
    text.push_str(event.as_str());

    for field in fields.into_iter().flatten() {
        text.push(FIELD_SEPARATOR);
        text.push_str(field);
    }

    text
}
