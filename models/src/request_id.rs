//! Request identifiers correlating a client request with its response.

use crate::ModelError;

use std::fmt;

use serde::{Serialize, Serializer};

/// Exactly [`RequestId::LEN`] ASCII alphanumeric characters.
///
/// Uniqueness is not a property of the type. The correlation registry refuses
/// an id that is already outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Fixed length of every request id on the wire.
    pub const LEN: usize = 15;

    #[track_caller]
    pub fn parse(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();

        if !Self::is_valid(&id) {
            return Err(ModelError::validation(format!(
                "Invalid request id '{id}' (expected {} alphanumeric characters)",
                Self::LEN
            )));
        }

        Ok(Self(id))
    }

    pub fn is_valid(id: &str) -> bool {
        id.len() == Self::LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
