//! Push-notification capability.
//!
//! `NtfyClient` delivers envelopes to an ntfy server; the forwarders only
//! depend on the `PushClient` trait.

mod client;

pub use client::NtfyClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::Envelope;

/// Delivery receipt returned by the notification service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    /// HTTP status code
    pub status: u16,
    /// Message id assigned by the service
    pub id: Option<String>,
    /// Unix time the service accepted the message
    pub time: Option<i64>,
    pub topic: Option<String>,
    /// Raw response body
    pub body: String,
}

/// Sends envelopes to a push-notification service
///
/// All clients must be Send + Sync; one client is shared by every forwarder.
#[async_trait]
pub trait PushClient: Send + Sync {
    /// Deliver one envelope
    ///
    /// # Errors
    /// - `AppError::Delivery` when the service answers with a non-success status
    /// - `AppError::Timeout` / `AppError::Transport` on connectivity failures
    async fn send_message(&self, envelope: &Envelope) -> AppResult<PushResponse>;

    /// Client name for logging
    fn name(&self) -> &'static str;
}
