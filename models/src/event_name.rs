//! Event names as they appear in the first field of every frame.

use crate::ModelError;

use std::fmt;

use serde::{Serialize, Serializer};

/// A non-empty token of ASCII letters, digits, `-` and `_`.
///
/// Event names double as broadcast topics and as the tag of the request a
/// response answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventName(String);

impl EventName {
    /// Validate and wrap an event name.
    #[track_caller]
    pub fn parse(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();

        if name.is_empty() {
            return Err(ModelError::validation("Event name cannot be empty"));
        }

        if !Self::is_valid(&name) {
            return Err(ModelError::validation(format!(
                "Invalid event name '{name}' (allowed: A-Z a-z 0-9 - _)"
            )));
        }

        Ok(Self(name))
    }

    /// Whether `name` is a well-formed event token.
    pub fn is_valid(name: &str) -> bool {
        !name.is_empty() && name.bytes().all(is_event_byte)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub(crate) fn is_event_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EventName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EventName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<&str> for EventName {
    type Error = ModelError;

    #[track_caller]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        EventName::parse(value)
    }
}

impl Serialize for EventName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
