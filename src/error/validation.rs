use thiserror::Error;

/// Well-formed input that cannot flow through the bridge.
///
/// Every condition is its own variant so callers can branch on the cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Decoded envelope carried an empty topic
    #[error("no topic received: empty string")]
    NoTopicReceived,

    #[error("empty subject passed to NATS")]
    EmptySubject,

    #[error("the message you tried to push was nil")]
    NilEnvelope,

    #[error("empty topic passed to ntfy")]
    EmptyTopic,

    /// Nothing to report: pushing "no error" is an error
    #[error("the error you tried to push was nil")]
    NilError,

    /// The error chain produced no text at all
    #[error("the error you tried to push has an empty message")]
    EmptyErrorMessage,

    #[error("passed zero value to ErrorPublisher: {field}")]
    ZeroValue { field: &'static str },
}

impl ValidationError {
    /// Nil envelope or nil error: there was nothing to push
    pub fn is_nil_input(&self) -> bool {
        matches!(self, ValidationError::NilEnvelope | ValidationError::NilError)
    }
}
