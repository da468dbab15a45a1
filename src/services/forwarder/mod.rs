//! Bus to push-notification forwarding.
//!
//! Both strategies share one contract: `run` consumes messages one at a time,
//! decodes them and hands each envelope to the push client with a bounded
//! timeout. Read and decode failures end the run; a failed delivery is logged
//! and counted, and the run moves on to the next message.
//!
//! - [`PullForwarder`] fetches each message from a synchronous subscription.
//! - [`StreamForwarder`] consumes a channel subscription and releases it
//!   (drain, unsubscribe, close channel) on every exit path.

mod pull;
mod stream;

pub use pull::PullForwarder;
pub use stream::StreamForwarder;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::codec::{DecodeError, decode};
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::external::bus::{BusConnection, BusMessage};
use crate::external::ntfy::{PushClient, PushResponse};
use crate::models::Envelope;

/// Consumption strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardMode {
    Pull,
    #[default]
    Stream,
}

impl fmt::Display for ForwardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardMode::Pull => write!(f, "pull"),
            ForwardMode::Stream => write!(f, "stream"),
        }
    }
}

/// Settings a forwarder is built with; not changed after construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderConfig {
    /// Subject to consume
    pub subject: String,
    /// Upper bound for delivering one message
    pub message_timeout: Duration,
    /// Buffer size of the stream delivery channel
    pub channel_capacity: usize,
}

impl ForwarderConfig {
    pub fn new(subject: impl Into<String>, message_timeout: Duration) -> Self {
        Self {
            subject: subject.into(),
            message_timeout,
            channel_capacity: 64,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            subject: settings.nats.subject.clone(),
            message_timeout: Duration::from_secs(settings.forwarder.message_timeout),
            channel_capacity: settings.forwarder.channel_capacity,
        }
    }
}

/// Per-run delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardStats {
    pub forwarded: u64,
    pub failed: u64,
}

/// Result of handling one message
#[derive(Debug)]
pub enum Outcome {
    /// Cancellation fired before a message arrived
    Cancelled,
    Delivered(PushResponse),
    /// Delivery failed; the error has already been logged
    Failed(AppError),
}

#[async_trait]
pub trait Forwarder: Send {
    /// Forward messages until cancelled or a read/decode failure occurs.
    ///
    /// Cancellation returns `Ok(())`.
    async fn run(&mut self, cancel: CancellationToken) -> AppResult<()>;

    fn mode(&self) -> ForwardMode;

    fn stats(&self) -> ForwardStats;
}

/// Build the forwarder for `mode`.
///
/// The pull variant subscribes here so a bad subject fails before `run`.
pub async fn build_forwarder(
    mode: ForwardMode,
    bus: Arc<dyn BusConnection>,
    push: Arc<dyn PushClient>,
    config: ForwarderConfig,
) -> AppResult<Box<dyn Forwarder>> {
    match mode {
        ForwardMode::Pull => Ok(Box::new(
            PullForwarder::subscribe(bus.as_ref(), push, config).await?,
        )),
        ForwardMode::Stream => Ok(Box::new(StreamForwarder::new(bus, push, config))),
    }
}

/// Decode and deliver logic shared by both strategies
struct Relay {
    push: Arc<dyn PushClient>,
    config: ForwarderConfig,
    stats: ForwardStats,
}

impl Relay {
    fn new(push: Arc<dyn PushClient>, config: ForwarderConfig) -> Self {
        Self {
            push,
            config,
            stats: ForwardStats::default(),
        }
    }

    fn span(&self, mode: ForwardMode) -> tracing::Span {
        tracing::info_span!("forwarder", mode = %mode, subject = %self.config.subject)
    }

    fn decode(&self, message: &BusMessage) -> AppResult<Envelope> {
        tracing::debug!(subject = %message.subject, "Received message");

        decode(&message.payload).map_err(|e| {
            match &e {
                DecodeError::Malformed { raw, source } => tracing::error!(
                    subject = %message.subject,
                    err = %source,
                    bytes = %raw,
                    "Failed reading message"
                ),
                DecodeError::Invalid { envelope, reason } => tracing::error!(
                    subject = %message.subject,
                    msg = ?envelope,
                    err = %reason,
                    "Invalid topic passed: empty string"
                ),
            }
            AppError::from(e)
        })
    }

    /// Deliver `envelope`, bounded by the message timeout
    async fn deliver(&mut self, envelope: &Envelope) -> Outcome {
        let timeout = self.config.message_timeout;
        let result = match tokio::time::timeout(timeout, self.push.send_message(envelope)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout("ntfy publish", timeout)),
        };

        match result {
            Ok(response) => {
                self.stats.forwarded += 1;
                tracing::debug!(
                    client = self.push.name(),
                    topic = %envelope.topic(),
                    status = response.status,
                    id = ?response.id,
                    "Published message"
                );
                Outcome::Delivered(response)
            }
            Err(e) => {
                self.stats.failed += 1;
                let response = match &e {
                    AppError::Delivery { response, .. } => Some(response.as_str()),
                    _ => None,
                };
                tracing::error!(
                    client = self.push.name(),
                    topic = %envelope.topic(),
                    timeout_ms = timeout.as_millis(),
                    err = %e,
                    response = ?response,
                    "Failed publishing message"
                );
                Outcome::Failed(e)
            }
        }
    }

    fn log_finished(&self, result: &AppResult<()>) {
        let ForwardStats { forwarded, failed } = self.stats;
        match result {
            Ok(()) => tracing::info!(forwarded, failed, "Forwarder stopped"),
            Err(e) => tracing::error!(forwarded, failed, err = %e, "Forwarder failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBus, FakePush, PushBehaviour, ScriptedPull};

    #[test]
    fn test_forward_mode_serde_lowercase() {
        let mode: ForwardMode = serde_json::from_str("\"pull\"").unwrap();
        assert_eq!(mode, ForwardMode::Pull);
        assert_eq!(serde_json::to_string(&ForwardMode::Stream).unwrap(), "\"stream\"");
        assert_eq!(ForwardMode::default(), ForwardMode::Stream);
        assert_eq!(ForwardMode::Pull.to_string(), "pull");
    }

    #[tokio::test]
    async fn test_relay_counts_deliveries() {
        let push = Arc::new(FakePush::with_script([PushBehaviour::Fail(500)]));
        let mut relay = Relay::new(push.clone(), ForwarderConfig::new("natsify", Duration::from_secs(1)));
        let envelope = Envelope::new("alerts", "", "hi");

        assert!(matches!(relay.deliver(&envelope).await, Outcome::Failed(AppError::Delivery { status: 500, .. })));
        assert!(matches!(relay.deliver(&envelope).await, Outcome::Delivered(_)));
        assert_eq!(relay.stats, ForwardStats { forwarded: 1, failed: 1 });
        assert_eq!(push.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_relay_decode_keeps_validation_identity() {
        let relay = Relay::new(Arc::new(FakePush::new()), ForwarderConfig::new("natsify", Duration::from_secs(1)));
        let err = relay
            .decode(&BusMessage::new("natsify", r#"{"topic":"","message":"x"}"#))
            .unwrap_err();
        assert!(err.is_validation());

        let err = relay.decode(&BusMessage::new("natsify", "nope")).unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_build_forwarder_selects_mode() {
        let bus = Arc::new(FakeBus::new().with_pull(ScriptedPull::new([])));
        let push: Arc<dyn PushClient> = Arc::new(FakePush::new());
        let config = ForwarderConfig::new("natsify", Duration::from_secs(1));

        let pull = build_forwarder(ForwardMode::Pull, bus.clone(), push.clone(), config.clone())
            .await
            .unwrap();
        assert_eq!(pull.mode(), ForwardMode::Pull);

        let stream = build_forwarder(ForwardMode::Stream, bus, push, config).await.unwrap();
        assert_eq!(stream.mode(), ForwardMode::Stream);
        assert_eq!(stream.stats(), ForwardStats::default());
    }
}
