//! Turns application errors into error envelopes.

use std::error::Error;
use std::fmt;

use crate::error::ValidationError;
use crate::models::{ERROR_SEVERITY_TAG, Envelope};

/// Messages of `err` and each of its causes, outermost first
pub fn error_chain(err: &(dyn Error + 'static)) -> Vec<String> {
    std::iter::successors(Some(err), |e| (*e).source())
        .map(ToString::to_string)
        .collect()
}

/// Build the error envelope for `err`.
///
/// The message is the newline-joined cause chain, the title is
/// `"{app_name} error"` and the single tag is the error severity marker.
/// `app_name` and `topic` are not checked here; the publisher validates them.
pub fn encode_error(
    app_name: &str,
    topic: &str,
    err: Option<&(dyn Error + 'static)>,
) -> Result<Envelope, ValidationError> {
    let err = err.ok_or(ValidationError::NilError)?;

    let message = error_chain(err).join("\n");
    if message.is_empty() {
        return Err(ValidationError::EmptyErrorMessage);
    }

    Ok(
        Envelope::new(topic, format!("{} error", app_name), message)
            .with_tags([ERROR_SEVERITY_TAG]),
    )
}

/// An error value with an optional wrapped cause.
///
/// Used where a chain has to be built from plain strings, e.g. a command line
/// or a report received from another process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorChain {
    message: String,
    cause: Option<Box<ErrorChain>>,
}

impl ErrorChain {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Wrap `self` as the cause of a new outer error
    pub fn wrap(self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: Some(Box::new(self)),
        }
    }

    /// Build a chain from messages ordered outermost first
    pub fn from_messages<I, S>(messages: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<String>,
    {
        let mut iter = messages.into_iter().rev();
        let innermost = ErrorChain::new(iter.next()?);
        Some(iter.fold(innermost, |chain, message| chain.wrap(message)))
    }
}

impl fmt::Display for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ErrorChain {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use proptest::prelude::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Outer {
        #[source]
        inner: Inner,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("dial tcp timeout")]
    struct Inner;

    #[test]
    fn test_encode_two_level_chain() {
        let err = Outer { inner: Inner };
        let env = encode_error("billing", "alerts", Some(&err)).unwrap();

        assert_eq!(env.topic(), "alerts");
        assert_eq!(env.title(), "billing error");
        assert_eq!(env.message(), "connection refused\ndial tcp timeout");
        assert_eq!(env.tags(), [ERROR_SEVERITY_TAG.to_string()]);
    }

    #[test]
    fn test_encode_single_error_without_cause() {
        let env = encode_error("app", "t", Some(&Inner)).unwrap();
        assert_eq!(env.message(), "dial tcp timeout");
    }

    #[test]
    fn test_encode_nil_error_fails() {
        let err = encode_error("app", "t", None).unwrap_err();
        assert_eq!(err, ValidationError::NilError);
        assert!(err.is_nil_input());
    }

    #[test]
    fn test_encode_empty_message_fails() {
        let err = encode_error("app", "t", Some(&ErrorChain::new(""))).unwrap_err();
        assert_eq!(err, ValidationError::EmptyErrorMessage);
    }

    #[test]
    fn test_encode_does_not_validate_topic_or_app() {
        let env = encode_error("", "", Some(&Inner)).unwrap();
        assert_eq!(env.topic(), "");
        assert_eq!(env.title(), " error");
    }

    #[test]
    fn test_encode_anyhow_context_chain() {
        let err = anyhow::anyhow!("disk full")
            .context("writing invoice")
            .context("nightly export failed");
        let source: &(dyn Error + 'static) = err.as_ref();
        let env = encode_error("billing", "alerts", Some(source)).unwrap();
        assert_eq!(
            env.message(),
            "nightly export failed\nwriting invoice\ndisk full"
        );
    }

    #[test]
    fn test_error_chain_from_messages() {
        let chain = ErrorChain::from_messages(["a", "b", "c"]).unwrap();
        assert_eq!(error_chain(&chain), vec!["a", "b", "c"]);
        assert!(ErrorChain::from_messages(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_encoded_envelope_round_trips_through_decoder() {
        let err = Outer { inner: Inner };
        let env = encode_error("billing", "alerts", Some(&err)).unwrap();
        let decoded = decode(&env.to_json().unwrap()).unwrap();
        assert_eq!(decoded, env);
    }

    proptest! {
        #[test]
        fn prop_message_is_joined_chain(messages in proptest::collection::vec("[^\n]{1,20}", 1..6)) {
            let chain = ErrorChain::from_messages(messages.clone()).unwrap();
            let env = encode_error("app", "topic", Some(&chain)).unwrap();
            prop_assert_eq!(env.message(), messages.join("\n"));

            let decoded = decode(&env.to_json().unwrap()).unwrap();
            prop_assert_eq!(decoded, env);
        }
    }
}
