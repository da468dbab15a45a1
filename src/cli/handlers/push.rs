//! Push and push-error command handlers
//!
//! Both publish a single envelope through the error publisher and flush the
//! connection before returning, so the payload leaves the process.

use std::sync::Arc;

use crate::codec::ErrorChain;
use crate::config::Settings;
use crate::error::AppResult;
use crate::external::bus::{BusConnection, NatsBus};
use crate::models::Envelope;
use crate::services::ErrorPublisher;

/// A raw envelope given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushArgs {
    pub topic: String,
    /// Defaults to `nats.subject`
    pub subject: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub message: String,
}

impl PushArgs {
    fn envelope(&self) -> Envelope {
        Envelope::new(
            self.topic.clone(),
            self.title.clone().unwrap_or_default(),
            self.message.clone(),
        )
        .with_tags(self.tags.iter().cloned())
    }
}

/// Handler for the push and push-error commands
pub struct PushCommandHandler {
    config: Settings,
}

impl PushCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Connect, publish the error chain built from `messages` and flush
    pub async fn execute_push_error(&self, messages: &[String]) -> AppResult<()> {
        let bus = self.connect().await?;
        self.push_error(bus.clone(), messages).await?;
        bus.flush().await
    }

    /// Connect, publish the envelope described by `args` and flush
    pub async fn execute_push(&self, args: &PushArgs) -> AppResult<()> {
        let bus = self.connect().await?;
        self.push(bus.clone(), args).await?;
        bus.flush().await
    }

    /// Publish an error report whose cause chain is `messages`, outermost first
    pub async fn push_error(
        &self,
        bus: Arc<dyn BusConnection>,
        messages: &[String],
    ) -> AppResult<()> {
        let publisher = self.publisher(bus)?;

        match ErrorChain::from_messages(messages.iter().cloned()) {
            Some(chain) => publisher.report(&chain).await,
            None => publisher.push_error(None).await,
        }
    }

    /// Publish `args` as a raw envelope
    pub async fn push(&self, bus: Arc<dyn BusConnection>, args: &PushArgs) -> AppResult<()> {
        let publisher = self.publisher(bus)?;
        let subject = args.subject.as_deref().unwrap_or(&self.config.nats.subject);

        publisher.push_raw(subject, Some(&args.envelope())).await
    }

    fn publisher(&self, bus: Arc<dyn BusConnection>) -> AppResult<ErrorPublisher> {
        Ok(ErrorPublisher::new(
            bus,
            self.config.application.name.as_str(),
            self.config.error_reporting.subject.as_str(),
            self.config.error_reporting.topic.as_str(),
        )?)
    }

    async fn connect(&self) -> AppResult<Arc<NatsBus>> {
        let bus = NatsBus::connect(&self.config.nats, &self.config.application.name).await?;
        Ok(Arc::new(bus))
    }
}
