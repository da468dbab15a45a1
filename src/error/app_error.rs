use std::time::Duration;

use thiserror::Error;

use crate::error::ValidationError;

/// Application-wide error type for the bridge.
///
/// Read-side failures (transport on fetch, decode) end a forwarder run, while
/// delivery-side failures (transport, timeout, non-2xx responses on publish)
/// are logged and the loop continues. The predicates below let callers branch
/// on the class of a failure without matching on messages.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bus or HTTP connectivity failure
    #[error("Transport failure during {operation}")]
    Transport {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// A bounded operation ran past its deadline
    #[error("Timed out during {operation} after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u128 },

    /// The notification service answered with a non-success status
    #[error("Delivery rejected with status {status}: {response}")]
    Delivery { status: u16, response: String },

    /// Payload bytes were not a serialized envelope
    #[error("Failed to decode message payload")]
    Decode {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed but semantically invalid input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn transport(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Transport {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        AppError::Timeout {
            operation: operation.into(),
            timeout_ms: after.as_millis(),
        }
    }

    /// Connectivity, deadline, and rejected-delivery failures
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Transport { .. } | AppError::Timeout { .. } | AppError::Delivery { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Timeout { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, AppError::Decode { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// The validation cause, if this is a validation failure
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            AppError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        AppError::Configuration {
            key: error.key(),
            source: error.into(),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
