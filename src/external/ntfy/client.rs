//! ntfy HTTP client.
//!
//! Publishes by POSTing the JSON envelope to the server root; the topic is
//! taken from the body.
//!
//! ntfy API Reference: https://docs.ntfy.sh/publish/#publish-as-json

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{PushClient, PushResponse};
use crate::config::settings::NtfyConfig;
use crate::error::{AppError, AppResult};
use crate::external::client::build_http_client;
use crate::models::Envelope;

/// Fields of the ntfy publish reply we keep
#[derive(Debug, Deserialize)]
struct Receipt {
    id: Option<String>,
    time: Option<i64>,
    topic: Option<String>,
}

/// ntfy notification client
#[derive(Clone)]
pub struct NtfyClient {
    base_url: Url,
    http: reqwest::Client,
    timeout: Duration,
    token: Option<String>,
}

impl NtfyClient {
    /// Creates a client from configuration
    ///
    /// # Errors
    /// Returns a configuration error if the URL is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: &NtfyConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout);
        tracing::debug!(url = %config.url, timeout_secs = config.timeout, "Creating ntfy client");

        let base_url = Url::parse(&config.url).map_err(|e| {
            tracing::error!(url = %config.url, err = %e, "Failed parsing ntfy URL");
            AppError::Configuration {
                key: "ntfy.url".to_string(),
                source: e.into(),
            }
        })?;

        let http = build_http_client(timeout)?;
        tracing::debug!("ntfy client created (connection is tested by the first message)");

        Ok(Self {
            base_url,
            http,
            timeout,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn classify(&self, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::timeout("ntfy publish", self.timeout)
        } else {
            AppError::transport("ntfy publish", error)
        }
    }
}

#[async_trait]
impl PushClient for NtfyClient {
    async fn send_message(&self, envelope: &Envelope) -> AppResult<PushResponse> {
        let mut request = self.http.post(self.base_url.clone()).json(envelope);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(AppError::Delivery {
                status: status.as_u16(),
                response: body,
            });
        }

        let receipt = serde_json::from_str::<Receipt>(&body).ok();
        Ok(PushResponse {
            status: status.as_u16(),
            id: receipt.as_ref().and_then(|r| r.id.clone()),
            time: receipt.as_ref().and_then(|r| r.time),
            topic: receipt.and_then(|r| r.topic),
            body,
        })
    }

    fn name(&self) -> &'static str {
        "ntfy"
    }
}
