use crate::{CloseEvent, CloseKind};

/// **VALUE**: Verifies that only unexpected closures warrant a reconnect.
///
/// **WHY THIS MATTERS**: Reconnecting after `close()` would make it impossible to shut a
/// connection down; not reconnecting after a reset would leave the client offline.
///
/// **BUG THIS CATCHES**: Would catch if the reconnect decision keys off `was_clean`
/// alone and forgets intentional closes, or the other way around.
#[test]
fn given_each_close_kind_when_checked_then_only_unexpected_reconnects() {
    // GIVEN: One event of each kind
    let intentional = CloseEvent::intentional(1000, "client closed");
    let clean = CloseEvent::clean(Some(1001), "going away");
    let unexpected = CloseEvent::unexpected("connection reset");

    // WHEN / THEN
    assert!(!intentional.warrants_reconnect());
    assert!(!clean.warrants_reconnect());
    assert!(unexpected.warrants_reconnect());
}

#[test]
fn given_unexpected_close_when_checked_then_not_clean() {
    let event = CloseEvent::unexpected("eof");

    assert!(!event.was_clean());
    assert_eq!(event.kind, CloseKind::Unexpected);
    assert_eq!(event.code, None);
}

#[test]
fn given_intentional_close_when_checked_then_clean_with_code() {
    let event = CloseEvent::intentional(1000, "bye");

    assert!(event.was_clean());
    assert_eq!(event.code, Some(1000));
    assert_eq!(event.reason, "bye");
}
