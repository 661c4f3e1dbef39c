use crate::codec::{OutboundPayload, encode, frame, parse_line};
use crate::error::CodecError;

use common::StatusCode;
use models::{EventName, RequestId};

use serde::Serialize;
use serde_json::json;

fn event(name: &str) -> EventName {
    EventName::parse(name).expect("valid event")
}

fn request_id() -> RequestId {
    RequestId::parse("abc123DEF456ghi").expect("valid request id")
}

/// **VALUE**: Verifies the outbound frame layout for a request with a JSON payload.
///
/// **WHY THIS MATTERS**: The server splits on `:` and expects exactly
/// `EVENT:REQUEST_ID:PAYLOAD`. A misplaced separator makes every request a 404.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The request id is dropped or moved
/// - A status field is emitted by the client
/// - The payload is pretty-printed
#[test]
fn given_json_payload_when_encoding_request_then_writes_event_id_payload() {
    // GIVEN: A request with an object payload
    let payload = OutboundPayload::Json(json!({ "page": 2 }));

    // WHEN: Encoding
    let text = encode(&event("LOG__GET"), Some(&request_id()), &payload).expect("encodes");

    // THEN: Three fields, compact JSON
    assert_eq!(text, r#"LOG__GET:abc123DEF456ghi:{"page":2}"#);
}

#[test]
fn given_empty_payload_when_encoding_request_then_omits_payload_field() {
    let text = encode(&event("PING"), Some(&request_id()), &OutboundPayload::Empty)
        .expect("encodes");

    assert_eq!(text, "PING:abc123DEF456ghi");
}

#[test]
fn given_json_null_when_encoding_then_treats_it_as_absent() {
    let text = encode(&event("PING"), Some(&request_id()), &OutboundPayload::Json(json!(null)))
        .expect("encodes");

    assert_eq!(text, "PING:abc123DEF456ghi");
}

/// **VALUE**: Verifies that raw string payloads pass through unquoted while JSON
/// strings are quoted.
///
/// **WHY THIS MATTERS**: Callers that already hold encoded JSON send it as a raw
/// string. Quoting it again would make the server receive a JSON string instead
/// of the object.
///
/// **BUG THIS CATCHES**: Would catch if raw payloads are run through the serializer.
#[test]
fn given_raw_and_json_strings_when_encoding_then_only_json_is_quoted() {
    // GIVEN: The same text as raw and as a JSON string
    let raw = OutboundPayload::from(r#"{"already":"encoded"}"#);
    let quoted = OutboundPayload::from(json!("hello"));

    // WHEN: Encoding both
    let raw_text = encode(&event("SAVE"), Some(&request_id()), &raw).expect("encodes");
    let quoted_text = encode(&event("SAVE"), Some(&request_id()), &quoted).expect("encodes");

    // THEN: Raw is verbatim, JSON string is quoted
    assert_eq!(raw_text, r#"SAVE:abc123DEF456ghi:{"already":"encoded"}"#);
    assert_eq!(quoted_text, r#"SAVE:abc123DEF456ghi:"hello""#);
}

#[test]
fn given_raw_payload_with_newline_when_encoding_then_returns_serialize_error() {
    let payload = OutboundPayload::Raw(String::from("line one\nline two"));

    let result = encode(&event("SAVE"), Some(&request_id()), &payload);

    assert!(matches!(result, Err(CodecError::Serialize { .. })));
}

#[test]
fn given_no_request_id_when_framing_then_writes_bare_event() {
    assert_eq!(frame(&event("HELLO"), None, None), "HELLO");
    assert_eq!(frame(&event("HELLO"), None, Some("1")), "HELLO:1");
}

#[test]
fn given_serializable_struct_when_building_payload_then_produces_json_value() {
    #[derive(Serialize)]
    struct Page {
        page: u32,
        size: u32,
    }

    let payload = OutboundPayload::json(&Page { page: 1, size: 50 }).expect("serializes");

    assert_eq!(payload, OutboundPayload::Json(json!({ "page": 1, "size": 50 })));
}

#[test]
fn given_option_payloads_when_converting_then_none_is_empty() {
    assert_eq!(OutboundPayload::from(None::<&str>), OutboundPayload::Empty);
    assert_eq!(
        OutboundPayload::from(Some(json!(3))),
        OutboundPayload::Json(json!(3))
    );
    assert_eq!(OutboundPayload::from(()), OutboundPayload::Empty);
}

/// **VALUE**: Verifies that JSON payloads survive an encode then decode unchanged.
///
/// **WHY THIS MATTERS**: The client and a test server share this codec. Payloads that
/// contain separators or look like other fields must come back as payloads, or the
/// receiving side reads the wrong request id or status.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - A colon inside a JSON string splits the payload
/// - A number with other than three digits is taken for a status
/// - A request id inside a payload string is read as a field
#[test]
fn given_json_payloads_when_encoding_then_decoding_round_trips() {
    // GIVEN: Payloads that stress the field grammar
    let payloads = [
        json!({ "a": [1, 2], "b": "x:y" }),
        json!("text: with colon"),
        json!([1, "abc123DEF456ghi:"]),
        json!(true),
        json!(42),
        json!(20001),
        json!(-404),
        json!(3.5),
    ];

    for payload in payloads {
        // WHEN: Encoding a request and parsing the frame back
        let text = encode(
            &event("LOG__GET"),
            Some(&request_id()),
            &OutboundPayload::Json(payload.clone()),
        )
        .expect("encodes");
        let message = parse_line(&text).expect("decodes");

        // THEN: Every field comes back as written
        assert_eq!(message.event.as_str(), "LOG__GET", "frame {text}");
        assert_eq!(message.request_id, Some(request_id()), "frame {text}");
        assert_eq!(message.status, StatusCode::OK, "frame {text}");
        assert_eq!(message.payload, payload, "frame {text}");
    }
}

/// **VALUE**: Pins the one payload shape the grammar cannot carry: a bare
/// three-digit integer.
///
/// **WHY THIS MATTERS**: Inbound frames put the optional status before the payload,
/// so `EVENT:ID:404` reads as status 404. Callers that need such a number must wrap it.
///
/// **BUG THIS CATCHES**: Would catch if the status rule changes silently, in either
/// direction, without the codec docs changing with it.
#[test]
fn given_three_digit_integer_payload_when_decoding_then_reads_as_status() {
    // GIVEN: Requests whose payload is a bare three-digit integer, and a wrapped one
    let bare = encode(
        &event("LOG__GET"),
        Some(&request_id()),
        &OutboundPayload::Json(json!(404)),
    )
    .expect("encodes");
    let wrapped = encode(
        &event("LOG__GET"),
        Some(&request_id()),
        &OutboundPayload::Json(json!([404])),
    )
    .expect("encodes");

    // WHEN: Decoding both
    let bare = parse_line(&bare).expect("decodes");
    let wrapped = parse_line(&wrapped).expect("decodes");

    // THEN: The bare number becomes the status, the wrapped one stays a payload
    assert_eq!(bare.status, StatusCode::NOT_FOUND);
    assert_eq!(bare.payload, json!(null));
    assert_eq!(wrapped.status, StatusCode::OK);
    assert_eq!(wrapped.payload, json!([404]));
}
