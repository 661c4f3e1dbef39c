use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("Frame Encoding Error: frame is not valid UTF-8: {message} {location}")]
    InvalidUtf8 {
        message: String,
        location: ErrorLocation,
    },

    #[error("Framing Error: cannot parse line '{line}': {message} {location}")]
    Framing {
        line: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Payload Error: {event} carries malformed JSON: {message} {location}")]
    Payload {
        event: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Serialization Error: {message} {location}")]
    Serialize {
        message: String,
        location: ErrorLocation,
    },
}
