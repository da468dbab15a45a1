//! Forward command handler
//!
//! Handles the forward command including dry-run validation and the
//! forwarding run itself.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::error::AppResult;
use crate::external::bus::{BusConnection, NatsBus};
use crate::external::ntfy::{NtfyClient, PushClient};
use crate::services::{ForwardStats, ForwarderConfig, build_forwarder};
use crate::shutdown::cancel_on_shutdown;

/// Handler for the forward command
pub struct ForwardCommandHandler {
    config: Settings,
}

impl ForwardCommandHandler {
    /// Create a new forward command handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the forward command with optional dry-run support
    ///
    /// Without `dry_run` this connects to NATS and ntfy and forwards until the
    /// forwarder fails or a shutdown signal arrives.
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Connection errors
    /// - The read or decode failure that ended the run
    pub async fn execute(&self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        tracing::info!(
            app_name = %self.config.application.name,
            app_version = %self.config.application.version,
            "Application starting"
        );

        let bus = Arc::new(NatsBus::connect(&self.config.nats, &self.config.application.name).await?);
        let push: Arc<dyn PushClient> = Arc::new(NtfyClient::new(&self.config.ntfy)?);

        let cancel = CancellationToken::new();
        let watcher = cancel_on_shutdown(cancel.clone());

        let result = self.forward(bus.clone(), push, cancel.clone()).await;

        cancel.cancel();
        if let Err(e) = watcher.await {
            tracing::warn!(err = %e, "Shutdown watcher ended abnormally");
        }
        if let Err(e) = bus.flush().await {
            tracing::warn!(err = %e, "Failed flushing NATS connection");
        }

        result.map(|stats| {
            tracing::info!(
                forwarded = stats.forwarded,
                failed = stats.failed,
                "Shutdown complete"
            );
        })
    }

    /// Build the configured forwarder over `bus` and `push` and run it until
    /// `cancel` fires or the run fails
    pub async fn forward(
        &self,
        bus: Arc<dyn BusConnection>,
        push: Arc<dyn PushClient>,
        cancel: CancellationToken,
    ) -> AppResult<ForwardStats> {
        let mode = self.config.forwarder.mode;
        let mut forwarder =
            build_forwarder(mode, bus, push, ForwarderConfig::from_settings(&self.config)).await?;

        tracing::info!(
            mode = %mode,
            subject = %self.config.nats.subject,
            ntfy_url = %self.config.ntfy.url,
            "Forwarder starting"
        );

        forwarder.run(cancel).await?;
        Ok(forwarder.stats())
    }

    /// Validate configuration without connecting
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        let config = &self.config;
        println!("✓ Configuration is valid");
        println!("✓ Mode: {}", config.forwarder.mode);
        println!("✓ NATS: {} (subject '{}')", config.nats.url, config.nats.subject);
        println!("✓ ntfy: {}", config.ntfy.url);
        println!(
            "✓ Timeouts: {}s per message, {}s HTTP, {}s dial",
            config.forwarder.message_timeout, config.ntfy.timeout, config.nats.dial_timeout
        );
        println!(
            "✓ Errors reported to subject '{}' topic '{}'",
            config.error_reporting.subject, config.error_reporting.topic
        );
        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}
