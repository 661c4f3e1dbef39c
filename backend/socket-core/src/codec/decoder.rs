use super::{FIELD_SEPARATOR, LINE_SEPARATOR};
use crate::error::codec::CodecError;

use common::{ErrorLocation, StatusCode};
use models::{EventName, Message, RequestId};

use log::warn;
use serde_json::Value;

/// Fields of one line, borrowed from the frame before validation.
#[derive(Debug, Default, PartialEq, Eq)]
struct Fields<'a> {
    event: &'a str,
    request_id: Option<&'a str>,
    status: Option<&'a str>,
    payload: Option<&'a str>,
}

/// Decode every message in an inbound frame, in frame order.
///
/// A frame that is not UTF-8 fails as a whole. A line that fails to parse is
/// logged and skipped so the remaining lines still reach their handlers.
pub fn decode_frame(data: &[u8]) -> Result<Vec<Message>, CodecError> {
    let text = std::str::from_utf8(data).map_err(|e| CodecError::InvalidUtf8 {
        message: e.to_string(),
        location: ErrorLocation::caller(),
    })?;

    let messages = decode_lines(text)
        .filter_map(|result| match result {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Skipping inbound line: {e}");
                None
            }
        })
        .collect();

    Ok(messages)
}

/// Parse each non-empty line of `text`, keeping per-line failures.
pub fn decode_lines(text: &str) -> impl Iterator<Item = Result<Message, CodecError>> + '_ {
    text.split(LINE_SEPARATOR)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(parse_line)
}

/// Parse a single message line.
///
/// After the event, an empty field followed by `:` stands for an absent field.
/// A 15 character alphanumeric field followed by `:` is taken as the request
/// id, then a three digit field as the status. Whatever follows is the JSON
/// payload.
#[track_caller]
pub fn parse_line(line: &str) -> Result<Message, CodecError> {
    let fields = split_fields(line)?;

    let event = EventName::parse(fields.event).map_err(|e| CodecError::Framing {
        line: line.to_owned(),
        message: e.to_string(),
        location: ErrorLocation::caller(),
    })?;

    let request_id = fields
        .request_id
        .map(RequestId::parse)
        .transpose()
        .map_err(|e| CodecError::Framing {
            line: line.to_owned(),
            message: e.to_string(),
            location: ErrorLocation::caller(),
        })?;

    let status = fields
        .status
        .and_then(StatusCode::from_wire)
        .unwrap_or_default();

    let payload = match fields.payload {
        None => Value::Null,
        Some(raw) => serde_json::from_str(raw).map_err(|e| CodecError::Payload {
            event: event.to_string(),
            message: e.to_string(),
            location: ErrorLocation::caller(),
        })?,
    };

    Ok(Message {
        event,
        request_id,
        status,
        payload,
    })
}

#[track_caller]
fn split_fields(line: &str) -> Result<Fields<'_>, CodecError> {
    let (event, rest) = match line.split_once(FIELD_SEPARATOR) {
        Some((event, rest)) => (event, Some(rest)),
        None => (line, None),
    };

    if !EventName::is_valid(event) {
        return Err(CodecError::Framing {
            line: line.to_owned(),
            message: format!("invalid event field '{event}'"),
            location: ErrorLocation::caller(),
        });
    }

    let Some(mut rest) = rest else {
        return Ok(Fields {
            event,
            ..Fields::default()
        });
    };

    let request_id = take_field(&mut rest, Terminator::Separator, RequestId::is_valid);
    let status = take_field(&mut rest, Terminator::SeparatorOrEnd, |field| {
        StatusCode::from_wire(field).is_some()
    });
    let payload = (!rest.is_empty()).then_some(rest);

    Ok(Fields {
        event,
        request_id,
        status,
        payload,
    })
}

/// What must follow a field for it to be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Separator,
    SeparatorOrEnd,
}

/// Consume the next field when it is empty or `accept` recognises it.
///
/// An empty field only counts as consumed when a separator follows it, so a
/// payload is never swallowed.
fn take_field<'a>(
    rest: &mut &'a str,
    terminator: Terminator,
    accept: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    let current: &'a str = rest;
    let (field, remainder) = match current.split_once(FIELD_SEPARATOR) {
        Some((field, remainder)) => (field, Some(remainder)),
        None => (current, None),
    };

    if field.is_empty() {
        if let Some(remainder) = remainder {
            *rest = remainder;
        }
        return None;
    }

    if remainder.is_none() && terminator == Terminator::Separator {
        return None;
    }

    if accept(field) {
        *rest = remainder.unwrap_or_default();
        return Some(field);
    }

    None
}
