use crate::{ConnectOptions, ConnectOptionsBuilder, ModelError, ReconnectStrategy};

use std::time::Duration;

/// **VALUE**: Verifies the defaults a bare address gets: reconnect on, fixed one second delay.
///
/// **WHY THIS MATTERS**: Consumers call `connect` with just an address. Losing the
/// reconnect default would leave the UI disconnected after the first network blip.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The reconnect flag defaults to false
/// - The default delay changes silently
/// - A builder without a max delay produces an exponential strategy
#[test]
fn given_address_only_when_building_then_uses_reconnect_defaults() {
    // GIVEN: Builder with only an address
    let builder = ConnectOptionsBuilder::default().with_address("ws://127.0.0.1:8080/ws");

    // WHEN: Building
    let options = builder.build().expect("valid options");

    // THEN: Reconnect is enabled with the default fixed delay
    assert!(options.reconnect);
    assert_eq!(
        options.strategy,
        ReconnectStrategy::Fixed {
            delay: Duration::from_secs(1)
        }
    );
    assert_eq!(options.address.as_str(), "ws://127.0.0.1:8080/ws");
}

/// **VALUE**: Verifies that builder validation rejects a missing address.
///
/// **WHY THIS MATTERS**: Every connection attempt needs a target; failing here gives a
/// clear validation error instead of a confusing transport failure later.
///
/// **BUG THIS CATCHES**: Would catch if required field validation is removed.
#[test]
fn given_missing_address_when_building_then_returns_validation_error() {
    // GIVEN: Builder without address
    let builder = ConnectOptionsBuilder::default().with_reconnect(false);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Address is required");
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that non-WebSocket schemes are rejected.
///
/// **WHY THIS MATTERS**: The transport only speaks ws/wss. An http URL would fail deep in
/// the handshake on every reconnect attempt, forever.
///
/// **BUG THIS CATCHES**: Would catch if the scheme check is removed or widened.
#[test]
fn given_http_address_when_building_then_returns_invalid_address_error() {
    // GIVEN: An http address
    let builder = ConnectOptionsBuilder::default().with_address("http://localhost:8080");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return invalid address error
    assert!(matches!(
        result,
        Err(ModelError::InvalidAddress { .. })
    ));
}

#[test]
fn given_unparseable_address_when_building_then_returns_invalid_address_error() {
    let result = ConnectOptions::new("not a url");

    assert!(matches!(result, Err(ModelError::InvalidAddress { .. })));
}

/// **VALUE**: Verifies that a zero reconnect delay is rejected.
///
/// **WHY THIS MATTERS**: A zero delay turns an unreachable server into a tight reconnect
/// loop that pins a CPU core and floods the log.
///
/// **BUG THIS CATCHES**: Would catch if the zero check is removed.
#[test]
fn given_zero_delay_when_building_then_returns_validation_error() {
    // GIVEN: Builder with zero delay
    let builder = ConnectOptionsBuilder::default()
        .with_address("ws://localhost:1")
        .with_reconnect_delay(Duration::ZERO);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Reconnect delay must be non-zero");
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that setting a max delay selects exponential backoff.
///
/// **WHY THIS MATTERS**: The max delay is the only switch between the fixed and
/// exponential strategies; the initial delay must carry over.
///
/// **BUG THIS CATCHES**: Would catch if the strategy ignores the configured delay
/// or swaps initial and max.
#[test]
fn given_max_delay_when_building_then_selects_exponential_strategy() {
    // GIVEN: Delay and max delay
    let builder = ConnectOptionsBuilder::default()
        .with_address("wss://example.com/socket")
        .with_reconnect_delay(Duration::from_millis(250))
        .with_max_reconnect_delay(Duration::from_secs(8));

    // WHEN: Building
    let options = builder.build().expect("valid options");

    // THEN: Exponential strategy with both bounds
    assert_eq!(
        options.strategy,
        ReconnectStrategy::Exponential {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(8),
        }
    );
    assert_eq!(options.reconnect_delay(), Duration::from_millis(250));
}

#[test]
fn given_max_delay_below_delay_when_building_then_returns_validation_error() {
    let result = ConnectOptionsBuilder::default()
        .with_address("ws://localhost:1")
        .with_reconnect_delay(Duration::from_secs(5))
        .with_max_reconnect_delay(Duration::from_secs(1))
        .build();

    assert!(matches!(result, Err(ModelError::Validation { .. })));
}

/// **VALUE**: Verifies that builder errors point at the line that called `build`.
///
/// **WHY THIS MATTERS**: Configuration errors surface in logs far from the builder. The
/// location is the only pointer back to the call site that supplied the bad value.
///
/// **BUG THIS CATCHES**: Would catch if a validation branch captures its location
/// inside the builder instead of through `#[track_caller]`.
#[test]
fn given_empty_address_when_building_then_error_location_is_caller() {
    // GIVEN: Builder with an empty address
    let builder = ConnectOptionsBuilder::default().with_address("");

    // WHEN: Building on a known line
    let expected_line = line!() + 1;
    let result = builder.build();

    // THEN: The location names this file and line
    match result.unwrap_err() {
        ModelError::Validation { message, location } => {
            assert_eq!(message, "Address cannot be empty");
            assert_eq!(location.file, file!());
            assert_eq!(location.line, expected_line);
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }
}
