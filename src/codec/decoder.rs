//! Turns raw bus payloads into validated envelopes.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{AppError, ValidationError};
use crate::models::Envelope;

/// Why a payload could not become an envelope.
///
/// Carries the context the caller needs for its log line: the raw bytes when
/// parsing failed, the parsed envelope when it failed validation.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed reading message")]
    Malformed {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{reason}")]
    Invalid {
        envelope: Box<Envelope>,
        reason: ValidationError,
    },
}

impl From<DecodeError> for AppError {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::Malformed { raw, source } => AppError::Decode { raw, source },
            DecodeError::Invalid { reason, .. } => AppError::Validation(reason),
        }
    }
}

/// Parse and validate a serialized envelope.
///
/// The payload must be a JSON object; arrays are not read positionally.
/// Only the topic is checked; title, message and tags may be empty.
pub fn decode(raw: &[u8]) -> Result<Envelope, DecodeError> {
    let envelope: Envelope = serde_json::from_slice::<Map<String, Value>>(raw)
        .and_then(|object| serde_json::from_value(Value::Object(object)))
        .map_err(|source| DecodeError::Malformed {
            raw: String::from_utf8_lossy(raw).into_owned(),
            source,
        })?;

    if !envelope.has_topic() {
        return Err(DecodeError::Invalid {
            envelope: Box::new(envelope),
            reason: ValidationError::NoTopicReceived,
        });
    }

    Ok(envelope)
}
