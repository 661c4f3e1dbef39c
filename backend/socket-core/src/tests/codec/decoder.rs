use crate::codec::{decode_frame, decode_lines, parse_line};
use crate::error::CodecError;

use common::StatusCode;

use serde_json::{Value, json};

// ============================================
// parse_line: field recognition
// ============================================

/// **VALUE**: Verifies a full response line is split into all four fields.
///
/// **WHY THIS MATTERS**: Responses are the only way a request ever settles. If the
/// request id or status is misread, the waiting caller hangs or gets the wrong outcome.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The request id is folded into the payload
/// - The status defaults to 200 even when present
/// - JSON payloads containing `:` are cut short
#[test]
fn given_full_response_line_when_parsing_then_extracts_all_fields() {
    // GIVEN: event, request id, status and a payload containing separators
    let line = r#"LOG__GET:abc123DEF456ghi:404:{"error":"not found: page 9"}"#;

    // WHEN: Parsing
    let message = parse_line(line).expect("valid line");

    // THEN: Every field is recognised
    assert_eq!(message.event, "LOG__GET");
    assert_eq!(
        message.request_id.as_ref().map(|id| id.as_str()),
        Some("abc123DEF456ghi")
    );
    assert_eq!(message.status, StatusCode::NOT_FOUND);
    assert_eq!(message.payload, json!({ "error": "not found: page 9" }));
}

#[test]
fn given_broadcast_line_when_parsing_then_defaults_status_and_omits_request_id() {
    let message = parse_line(r#"FILESERVER_STATISTICS:{"files":12}"#).expect("valid line");

    assert_eq!(message.event, "FILESERVER_STATISTICS");
    assert_eq!(message.request_id, None);
    assert_eq!(message.status, StatusCode::OK);
    assert_eq!(message.payload, json!({ "files": 12 }));
}

#[test]
fn given_bare_event_when_parsing_then_payload_is_null() {
    let message = parse_line("RELOAD").expect("valid line");

    assert_eq!(message.event, "RELOAD");
    assert_eq!(message.status, StatusCode::OK);
    assert_eq!(message.payload, Value::Null);
}

#[test]
fn given_response_without_payload_when_parsing_then_payload_is_null() {
    let message = parse_line("DELETE:abc123DEF456ghi:200").expect("valid line");

    assert!(message.request_id.is_some());
    assert_eq!(message.status, StatusCode::OK);
    assert_eq!(message.payload, Value::Null);
}

/// **VALUE**: Verifies that empty slots are skipped instead of becoming payload.
///
/// **WHY THIS MATTERS**: Servers emit `EVENT:::payload` when a broadcast has no
/// request id or status. Treating `::1` as the payload would fail JSON parsing
/// and drop the event.
///
/// **BUG THIS CATCHES**: Would catch if empty fields are not consumed.
#[test]
fn given_empty_slots_when_parsing_then_payload_follows_them() {
    // GIVEN: Lines with one and two empty slots
    let one = parse_line("COUNT::1").expect("valid line");
    let two = parse_line("COUNT:::2").expect("valid line");

    // THEN: Payload is the value after the empty slots
    assert_eq!(one.payload, json!(1));
    assert_eq!(two.payload, json!(2));
    assert_eq!(two.request_id, None);
}

#[test]
fn given_status_without_request_id_when_parsing_then_reads_status() {
    let message = parse_line(r#"NOTICE:500:"disk full""#).expect("valid line");

    assert_eq!(message.request_id, None);
    assert_eq!(message.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message.payload, json!("disk full"));
}

/// **VALUE**: Verifies that numeric payloads are not mistaken for header fields.
///
/// **WHY THIS MATTERS**: A broadcast carrying a 15 digit number or a number starting
/// with three digits would otherwise be split into a request id or status code,
/// silently corrupting the value.
///
/// **BUG THIS CATCHES**: Would catch if fields are recognised by shape alone
/// without the following separator.
#[test]
fn given_numeric_payloads_when_parsing_then_keeps_them_whole() {
    // GIVEN: A 15 digit payload and a 5 digit payload
    let long = parse_line("TOTAL:123456789012345").expect("valid line");
    let short = parse_line("TOTAL:20001").expect("valid line");

    // THEN: Both are payloads
    assert_eq!(long.request_id, None);
    assert_eq!(long.payload, json!(123456789012345_u64));
    assert_eq!(short.status, StatusCode::OK);
    assert_eq!(short.payload, json!(20001));
}

#[test]
fn given_three_digit_payload_alone_when_parsing_then_reads_it_as_status() {
    let message = parse_line("CODE:418").expect("valid line");

    assert_eq!(message.status, StatusCode(418));
    assert_eq!(message.payload, Value::Null);
}

#[test]
fn given_invalid_event_when_parsing_then_returns_framing_error() {
    let result = parse_line("bad event:1");

    assert!(matches!(result, Err(CodecError::Framing { .. })));
}

#[test]
fn given_malformed_json_when_parsing_then_returns_payload_error() {
    let result = parse_line("STATS:{not json");

    match result {
        Err(CodecError::Payload { event, .. }) => assert_eq!(event, "STATS"),
        other => panic!("Expected Payload error, got {other:?}"),
    }
}

// ============================================
// decode_frame: multi-line frames
// ============================================

/// **VALUE**: Verifies that a frame with several lines yields messages in order.
///
/// **WHY THIS MATTERS**: Servers batch broadcasts into one frame. Handlers rely on
/// seeing them in the order the server wrote them.
///
/// **BUG THIS CATCHES**: Would catch if only the first line is decoded or the order
/// is lost.
#[test]
fn given_multi_line_frame_when_decoding_then_returns_messages_in_order() {
    // GIVEN: Three lines in one frame
    let frame = b"A:1\nB:2\nC:3";

    // WHEN: Decoding
    let messages = decode_frame(frame).expect("valid utf-8");

    // THEN: Three messages, frame order
    let events: Vec<&str> = messages.iter().map(|m| m.event.as_str()).collect();
    assert_eq!(events, ["A", "B", "C"]);
    assert_eq!(messages[2].payload, json!(3));
}

/// **VALUE**: Verifies that one bad line does not take down the rest of its frame.
///
/// **WHY THIS MATTERS**: A single malformed broadcast would otherwise hide every
/// other event batched with it, including responses callers are waiting for.
///
/// **BUG THIS CATCHES**: Would catch if a per-line error aborts the whole frame.
#[test]
fn given_malformed_line_in_frame_when_decoding_then_skips_only_that_line() {
    // GIVEN: A bad JSON line and a bad event line between good lines
    let frame = b"A:1\nB:{oops\n!!!:3\nD:4";

    // WHEN: Decoding
    let messages = decode_frame(frame).expect("valid utf-8");

    // THEN: Only the good lines survive
    let events: Vec<&str> = messages.iter().map(|m| m.event.as_str()).collect();
    assert_eq!(events, ["A", "D"]);
}

#[test]
fn given_blank_and_crlf_lines_when_decoding_then_ignores_blanks_and_strips_cr() {
    let messages = decode_frame(b"A:1\r\n\r\n\nB\r\n").expect("valid utf-8");

    let events: Vec<&str> = messages.iter().map(|m| m.event.as_str()).collect();
    assert_eq!(events, ["A", "B"]);
    assert_eq!(messages[1].payload, Value::Null);
}

#[test]
fn given_invalid_utf8_when_decoding_then_fails_whole_frame() {
    let result = decode_frame(&[b'A', b':', 0xff, 0xfe]);

    assert!(matches!(result, Err(CodecError::InvalidUtf8 { .. })));
}

#[test]
fn given_lines_when_decoding_lazily_then_keeps_errors_in_position() {
    let results: Vec<_> = decode_lines("A:1\nB:{\nC:3").collect();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
}
