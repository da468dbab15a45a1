//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{ForwardCommandHandler, PushArgs, PushCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::AppResult;

/// Execute a CLI command with the given settings
///
/// No command means `forward` with no overrides.
///
/// # Arguments
/// * `cli` - Parsed CLI arguments
/// * `settings` - Merged and validated settings
///
/// # Errors
/// Returns errors from command handlers
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match cli.resolved_command() {
        Commands::Forward { dry_run, .. } => {
            ForwardCommandHandler::new(settings).execute(dry_run).await
        }
        Commands::PushError { messages } => {
            PushCommandHandler::new(settings)
                .execute_push_error(&messages)
                .await
        }
        Commands::Push {
            topic,
            subject,
            title,
            tags,
            message,
        } => {
            let args = PushArgs {
                topic,
                subject,
                title,
                tags,
                message,
            };
            PushCommandHandler::new(settings).execute_push(&args).await
        }
    }
}
