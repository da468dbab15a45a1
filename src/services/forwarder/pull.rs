use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::{ForwardMode, ForwardStats, Forwarder, ForwarderConfig, Outcome, Relay};
use crate::error::AppResult;
use crate::external::bus::{BusConnection, PullSubscription};
use crate::external::ntfy::PushClient;

/// Forwarder that fetches one message at a time from a synchronous subscription
pub struct PullForwarder {
    subscription: Box<dyn PullSubscription>,
    relay: Relay,
}

impl PullForwarder {
    /// Subscribe to `config.subject` and build the forwarder
    pub async fn subscribe(
        bus: &dyn BusConnection,
        push: Arc<dyn PushClient>,
        config: ForwarderConfig,
    ) -> AppResult<Self> {
        let subscription = bus.subscribe_sync(&config.subject).await.map_err(|e| {
            tracing::error!(subject = %config.subject, err = %e, "Failed subscription");
            e
        })?;
        Ok(Self::new(subscription, push, config))
    }

    pub fn new(
        subscription: Box<dyn PullSubscription>,
        push: Arc<dyn PushClient>,
        config: ForwarderConfig,
    ) -> Self {
        Self {
            subscription,
            relay: Relay::new(push, config),
        }
    }

    /// Fetch, decode and deliver a single message.
    ///
    /// # Errors
    /// Fetch and decode failures. A failed delivery is returned as
    /// `Outcome::Failed` instead.
    pub async fn forward_next(&mut self, cancel: &CancellationToken) -> AppResult<Outcome> {
        let message = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Outcome::Cancelled),
            message = self.subscription.next_message() => message,
        };

        let message = message.map_err(|e| {
            tracing::error!(subject = %self.relay.config.subject, err = %e, "Failed fetching message");
            e
        })?;

        let envelope = self.relay.decode(&message)?;
        Ok(self.relay.deliver(&envelope).await)
    }
}

#[async_trait]
impl Forwarder for PullForwarder {
    async fn run(&mut self, cancel: CancellationToken) -> AppResult<()> {
        let span = self.relay.span(ForwardMode::Pull);

        async {
            tracing::info!("Forwarder started");
            let result = loop {
                match self.forward_next(&cancel).await {
                    Ok(Outcome::Cancelled) => break Ok(()),
                    Ok(Outcome::Delivered(_) | Outcome::Failed(_)) => continue,
                    Err(e) => break Err(e),
                }
            };
            self.relay.log_finished(&result);
            result
        }
        .instrument(span)
        .await
    }

    fn mode(&self) -> ForwardMode {
        ForwardMode::Pull
    }

    fn stats(&self) -> ForwardStats {
        self.relay.stats
    }
}
