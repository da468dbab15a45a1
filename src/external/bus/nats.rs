//! NATS implementation of the bus capability, built on `async-nats`.

use std::time::Duration;

use async_nats::{Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};

use super::{BusConnection, BusMessage, ChannelSubscription, PullSubscription};
use crate::config::settings::NatsConfig;
use crate::error::{AppError, AppResult};

/// NATS connection
#[derive(Clone)]
pub struct NatsBus {
    client: Client,
}

impl NatsBus {
    /// Wrap an already connected client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the configured URL, dial timeout and reconnect limit.
    ///
    /// A negative `max_reconnects` keeps reconnecting forever.
    pub async fn connect(config: &NatsConfig, client_name: &str) -> AppResult<Self> {
        let max_reconnects = usize::try_from(config.max_reconnects).ok();

        tracing::info!(
            url = %config.url,
            max_reconnects = ?max_reconnects,
            timeout_secs = config.dial_timeout,
            subject = %config.subject,
            "Connecting to NATS"
        );

        let client = ConnectOptions::new()
            .name(client_name)
            .connection_timeout(Duration::from_secs(config.dial_timeout))
            .max_reconnects(max_reconnects)
            .connect(config.url.as_str())
            .await
            .map_err(|e| {
                tracing::error!(
                    url = %config.url,
                    timeout_secs = config.dial_timeout,
                    err = %e,
                    "Failed connecting to NATS"
                );
                AppError::transport("nats connect", e)
            })?;

        tracing::info!(url = %config.url, "Connected to NATS");
        Ok(Self::new(client))
    }

    /// Push buffered publishes to the server
    pub async fn flush(&self) -> AppResult<()> {
        self.client
            .flush()
            .await
            .map_err(|e| AppError::transport("nats flush", e))
    }
}

impl From<async_nats::Message> for BusMessage {
    fn from(message: async_nats::Message) -> Self {
        BusMessage {
            subject: message.subject.to_string(),
            payload: message.payload,
        }
    }
}

#[async_trait]
impl BusConnection for NatsBus {
    async fn publish(&self, subject: &str, payload: Bytes) -> AppResult<()> {
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| AppError::transport("nats publish", e))
    }

    async fn subscribe_sync(&self, subject: &str) -> AppResult<Box<dyn PullSubscription>> {
        let subscriber = self.subscribe(subject).await?;
        Ok(Box::new(NatsPullSubscription { subscriber }))
    }

    async fn subscribe_channel(
        &self,
        subject: &str,
        capacity: usize,
    ) -> AppResult<(mpsc::Receiver<BusMessage>, Box<dyn ChannelSubscription>)> {
        let subscriber = self.subscribe(subject).await?;
        let (rx, subscription) = spawn_pump(subscriber, capacity);
        Ok((rx, Box::new(subscription)))
    }
}

impl NatsBus {
    async fn subscribe(&self, subject: &str) -> AppResult<Subscriber> {
        self.client.subscribe(subject.to_string()).await.map_err(|e| {
            tracing::error!(subject = %subject, err = %e, "Failed subscribing to the subject");
            AppError::transport("nats subscribe", e)
        })
    }
}

/// Synchronous-style NATS subscription
pub struct NatsPullSubscription {
    subscriber: Subscriber,
}

#[async_trait]
impl PullSubscription for NatsPullSubscription {
    async fn next_message(&mut self) -> AppResult<BusMessage> {
        self.subscriber
            .next()
            .await
            .map(BusMessage::from)
            .ok_or_else(|| {
                AppError::transport("nats fetch", anyhow::anyhow!("subscription closed"))
            })
    }
}

enum Control {
    Drain(oneshot::Sender<AppResult<()>>),
    Unsubscribe(oneshot::Sender<AppResult<()>>),
}

/// Handle to the task feeding a channel subscription.
///
/// Dropping the handle unsubscribes.
#[derive(Debug)]
pub struct NatsChannelSubscription {
    control: mpsc::Sender<Control>,
}

impl NatsChannelSubscription {
    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<AppResult<()>>) -> Control,
        operation: &'static str,
    ) -> AppResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.control.send(make(reply_tx)).await.map_err(|_| {
            AppError::transport(operation, anyhow::anyhow!("subscription task has stopped"))
        })?;
        reply_rx.await.map_err(|_| {
            AppError::transport(operation, anyhow::anyhow!("subscription task has stopped"))
        })?
    }
}

#[async_trait]
impl ChannelSubscription for NatsChannelSubscription {
    async fn drain(&mut self) -> AppResult<()> {
        self.request(Control::Drain, "nats drain").await
    }

    async fn unsubscribe(&mut self) -> AppResult<()> {
        self.request(Control::Unsubscribe, "nats unsubscribe").await
    }
}

/// What the pump needs from a subscriber
#[async_trait]
trait MessageSource: Send + 'static {
    /// Next message, `None` once the subscription has ended. Must be cancel-safe.
    async fn next_message(&mut self) -> Option<BusMessage>;

    async fn drain(&mut self) -> AppResult<()>;

    async fn unsubscribe(&mut self) -> AppResult<()>;
}

#[async_trait]
impl MessageSource for Subscriber {
    async fn next_message(&mut self) -> Option<BusMessage> {
        self.next().await.map(BusMessage::from)
    }

    async fn drain(&mut self) -> AppResult<()> {
        Subscriber::drain(self)
            .await
            .map_err(|e| AppError::transport("nats drain", e))
    }

    async fn unsubscribe(&mut self) -> AppResult<()> {
        Subscriber::unsubscribe(self)
            .await
            .map_err(|e| AppError::transport("nats unsubscribe", e))
    }
}

fn spawn_pump<S: MessageSource>(
    source: S,
    capacity: usize,
) -> (mpsc::Receiver<BusMessage>, NatsChannelSubscription) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (control_tx, control_rx) = mpsc::channel(1);

    tokio::spawn(pump(source, tx, control_rx));

    (rx, NatsChannelSubscription { control: control_tx })
}

/// Moves messages from the source into the channel until unsubscribed.
///
/// Drain stops forwarding; an unsubscribe or a dropped handle ends the task.
async fn pump<S: MessageSource>(
    mut source: S,
    tx: mpsc::Sender<BusMessage>,
    mut control: mpsc::Receiver<Control>,
) {
    let mut forwarding = true;

    loop {
        let command = tokio::select! {
            command = control.recv() => command,
            message = source.next_message(), if forwarding => {
                match message {
                    Some(message) => {
                        // Keep answering control requests while the channel is full
                        tokio::select! {
                            sent = tx.send(message) => {
                                if sent.is_err() {
                                    forwarding = false;
                                }
                                continue;
                            }
                            command = control.recv() => command,
                        }
                    }
                    None => {
                        forwarding = false;
                        continue;
                    }
                }
            }
        };

        match command {
            Some(Control::Drain(reply)) => {
                forwarding = false;
                let _ = reply.send(source.drain().await);
            }
            Some(Control::Unsubscribe(reply)) => {
                let _ = reply.send(source.unsubscribe().await);
                return;
            }
            None => {
                if let Err(e) = source.unsubscribe().await {
                    tracing::warn!(err = %e, "Failed unsubscribing abandoned subscription");
                }
                return;
            }
        }
    }
}
