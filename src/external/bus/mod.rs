//! Message bus capability.
//!
//! The forwarders and the error publisher only see these traits. `nats` holds
//! the production implementation.
//!
//! Publishing is fire-and-forget: `publish` returns once the payload is handed
//! to the transport, no acknowledgement is awaited. Delivery across the bridge
//! is therefore at-most-once.

mod nats;

pub use nats::{NatsBus, NatsChannelSubscription, NatsPullSubscription};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::AppResult;

/// A message received from the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub subject: String,
    pub payload: Bytes,
}

impl BusMessage {
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            payload: payload.into(),
        }
    }
}

/// Connection to the bus, shared by every forwarder and publisher in the process
#[async_trait]
pub trait BusConnection: Send + Sync {
    /// Hand `payload` to the transport for `subject`
    async fn publish(&self, subject: &str, payload: Bytes) -> AppResult<()>;

    /// Subscription read one message at a time by the caller
    async fn subscribe_sync(&self, subject: &str) -> AppResult<Box<dyn PullSubscription>>;

    /// Subscription that pushes messages into a bounded channel
    async fn subscribe_channel(
        &self,
        subject: &str,
        capacity: usize,
    ) -> AppResult<(mpsc::Receiver<BusMessage>, Box<dyn ChannelSubscription>)>;
}

#[async_trait]
pub trait PullSubscription: Send {
    /// Wait for the next message.
    ///
    /// Must be cancel-safe: dropping the future before it resolves loses no
    /// message. A closed subscription is a transport error.
    async fn next_message(&mut self) -> AppResult<BusMessage>;
}

/// Control handle for a channel subscription
#[async_trait]
pub trait ChannelSubscription: Send {
    /// Stop delivering new messages into the channel
    async fn drain(&mut self) -> AppResult<()>;

    /// Remove interest in the subject
    async fn unsubscribe(&mut self) -> AppResult<()>;
}
