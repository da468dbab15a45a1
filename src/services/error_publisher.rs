//! Error reporting onto the bus.
//!
//! Publishes are fire-and-forget: a successful return means the payload was
//! handed to the bus client, not that any forwarder received it.

use std::error::Error;
use std::sync::Arc;

use bytes::Bytes;

use crate::codec::encode_error;
use crate::error::{AppError, AppResult, ValidationError};
use crate::external::bus::BusConnection;
use crate::models::Envelope;

/// Publishes envelopes and encoded errors onto the bus
#[derive(Clone)]
pub struct ErrorPublisher {
    bus: Arc<dyn BusConnection>,
    app_name: String,
    error_subject: String,
    error_topic: String,
}

impl std::fmt::Debug for ErrorPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPublisher")
            .field("app_name", &self.app_name)
            .field("error_subject", &self.error_subject)
            .field("error_topic", &self.error_topic)
            .finish_non_exhaustive()
    }
}

impl ErrorPublisher {
    /// Creates a new ErrorPublisher
    ///
    /// # Arguments
    /// * `bus` - Shared bus connection
    /// * `app_name` - Prefix for error titles (`"{app_name} error"`)
    /// * `error_subject` - Bus subject error envelopes are published to
    /// * `error_topic` - Notification topic of error envelopes
    ///
    /// # Errors
    /// `ValidationError::ZeroValue` naming the first empty argument
    pub fn new(
        bus: Arc<dyn BusConnection>,
        app_name: impl Into<String>,
        error_subject: impl Into<String>,
        error_topic: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let publisher = Self {
            bus,
            app_name: app_name.into(),
            error_subject: error_subject.into(),
            error_topic: error_topic.into(),
        };

        for (field, value) in [
            ("app_name", &publisher.app_name),
            ("error_subject", &publisher.error_subject),
            ("error_topic", &publisher.error_topic),
        ] {
            if value.is_empty() {
                tracing::error!(
                    app_name = %publisher.app_name,
                    error_subject = %publisher.error_subject,
                    error_topic = %publisher.error_topic,
                    "Passed zero value to ErrorPublisher"
                );
                return Err(ValidationError::ZeroValue { field });
            }
        }

        Ok(publisher)
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn error_subject(&self) -> &str {
        &self.error_subject
    }

    pub fn error_topic(&self) -> &str {
        &self.error_topic
    }

    /// Publish `envelope` to `subject`.
    ///
    /// # Errors
    /// In order of precedence: `EmptySubject`, `NilEnvelope`, `EmptyTopic`,
    /// then any bus failure.
    pub async fn push_raw(&self, subject: &str, envelope: Option<&Envelope>) -> AppResult<()> {
        let envelope = match (subject.is_empty(), envelope) {
            (true, _) => Err(ValidationError::EmptySubject),
            (false, None) => Err(ValidationError::NilEnvelope),
            (false, Some(envelope)) if !envelope.has_topic() => Err(ValidationError::EmptyTopic),
            (false, Some(envelope)) => Ok(envelope),
        }
        .map_err(|reason| {
            tracing::error!(subject = %subject, msg = ?envelope, err = %reason, "Refusing to push message");
            reason
        })?;

        self.publish(subject, envelope).await
    }

    /// Encode `err` and publish it to the configured error subject.
    ///
    /// # Errors
    /// `NilError` when `err` is `None`, `EmptyErrorMessage` when every message
    /// in the chain is empty, then any bus failure.
    pub async fn push_error(&self, err: Option<&(dyn Error + 'static)>) -> AppResult<()> {
        let envelope = encode_error(&self.app_name, &self.error_topic, err).map_err(|reason| {
            tracing::error!(err = %reason, "Failed encoding error");
            reason
        })?;

        self.publish(&self.error_subject, &envelope).await
    }

    /// Report a concrete error value
    pub async fn report<E: Error + 'static>(&self, err: &E) -> AppResult<()> {
        self.push_error(Some(err)).await
    }

    async fn publish(&self, subject: &str, envelope: &Envelope) -> AppResult<()> {
        let payload = envelope
            .to_json()
            .map_err(|e| AppError::Internal { source: e.into() })?;

        self.bus
            .publish(subject, Bytes::from(payload))
            .await
            .map_err(|e| {
                tracing::error!(subject = %subject, topic = %envelope.topic(), err = %e, "Failed publishing to NATS");
                e
            })?;

        tracing::debug!(subject = %subject, topic = %envelope.topic(), "Published message to NATS");
        Ok(())
    }
}
