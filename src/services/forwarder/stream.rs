use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::{ForwardMode, ForwardStats, Forwarder, ForwarderConfig, Outcome, Relay};
use crate::error::{AppError, AppResult};
use crate::external::bus::{BusConnection, BusMessage, ChannelSubscription};
use crate::external::ntfy::PushClient;

/// Forwarder that consumes a channel subscription.
///
/// Messages are handled strictly one after another: message N+1 is not
/// received until message N has been delivered or has failed.
pub struct StreamForwarder {
    bus: Arc<dyn BusConnection>,
    relay: Relay,
}

impl StreamForwarder {
    pub fn new(bus: Arc<dyn BusConnection>, push: Arc<dyn PushClient>, config: ForwarderConfig) -> Self {
        Self {
            bus,
            relay: Relay::new(push, config),
        }
    }

    async fn consume(
        &mut self,
        messages: &mut mpsc::Receiver<BusMessage>,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                message = messages.recv() => message,
            };

            let Some(message) = message else {
                tracing::error!(subject = %self.relay.config.subject, "Delivery channel closed");
                return Err(AppError::transport(
                    "nats subscription",
                    anyhow::anyhow!("delivery channel closed"),
                ));
            };

            let envelope = self.relay.decode(&message)?;
            match self.relay.deliver(&envelope).await {
                Outcome::Delivered(_) | Outcome::Failed(_) => continue,
                Outcome::Cancelled => return Ok(()),
            }
        }
    }

    /// Drain, unsubscribe, then close the channel
    async fn release(
        &self,
        messages: &mut mpsc::Receiver<BusMessage>,
        subscription: &mut dyn ChannelSubscription,
    ) {
        if let Err(e) = subscription.drain().await {
            tracing::error!(subject = %self.relay.config.subject, err = %e, "Failed drain");
        }
        if let Err(e) = subscription.unsubscribe().await {
            tracing::error!(subject = %self.relay.config.subject, err = %e, "Failed unsub");
        }
        messages.close();
    }
}

#[async_trait]
impl Forwarder for StreamForwarder {
    async fn run(&mut self, cancel: CancellationToken) -> AppResult<()> {
        let span = self.relay.span(ForwardMode::Stream);

        async {
            let subject = self.relay.config.subject.clone();
            let (mut messages, mut subscription) = self
                .bus
                .subscribe_channel(&subject, self.relay.config.channel_capacity)
                .await
                .map_err(|e| {
                    tracing::error!(subject = %subject, err = %e, "Failed subscription");
                    e
                })?;

            tracing::info!("Forwarder started");
            let result = self.consume(&mut messages, &cancel).await;
            self.release(&mut messages, subscription.as_mut()).await;

            self.relay.log_finished(&result);
            result
        }
        .instrument(span)
        .await
    }

    fn mode(&self) -> ForwardMode {
        ForwardMode::Stream
    }

    fn stats(&self) -> ForwardStats {
        self.relay.stats
    }
}
