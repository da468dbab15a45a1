//! CLI argument parsing using clap
//!
//! This module defines the command-line interface structure and argument parsing
//! logic for natsify.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::build;
use crate::services::ForwardMode;

/// Bridge between a NATS subject and an ntfy server
#[derive(Parser, Debug)]
#[command(name = "natsify")]
#[command(version = build::CLAP_LONG_VERSION)]
#[command(about = "Forward notifications from NATS to ntfy")]
#[command(long_about = "natsify consumes notification envelopes from a NATS subject and \
delivers each one to an ntfy server. Other processes report their errors onto the bus \
through the same envelope format.

Configuration is loaded from config/default.toml, config/{environment}.toml, \
config/local.toml and NATSIFY_* environment variables. Command line flags take precedence.

EXAMPLES:
    natsify                                   # Forward using the default configuration
    natsify forward --mode pull               # Fetch one message at a time
    natsify -e production forward --dry-run   # Validate production configuration
    natsify push-error \"sync failed\" \"connection refused\"
    natsify push --topic deploys --title shipped \"v1.2.0 is live\"")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this file only instead of the layered configuration directory.
    /// NATSIFY_* environment variables still apply on top of it.
    #[arg(short, long, global = true, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Environment (development, test, staging, production)
    ///
    /// Selects config/{environment}.toml. Overrides NATSIFY_APP_ENV.
    #[arg(short, long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Forward messages from NATS to ntfy (default)
    ///
    /// Runs until the forwarder fails or Ctrl+C/SIGTERM is received.
    ///
    /// Examples:
    ///   natsify forward
    ///   natsify forward --mode pull --subject alerts
    ///   natsify forward --dry-run
    Forward {
        /// Consumption strategy
        #[arg(long, value_enum)]
        mode: Option<ForwardModeArg>,

        /// NATS subject to consume
        #[arg(long, value_parser = super::validation::validate_subject)]
        subject: Option<String>,

        /// NATS server URL
        #[arg(long, value_name = "URL")]
        nats_url: Option<String>,

        /// ntfy server URL
        #[arg(long, value_name = "URL")]
        ntfy_url: Option<String>,

        /// Per-message delivery timeout in seconds
        #[arg(long, value_name = "SECS", value_parser = super::validation::validate_timeout)]
        timeout: Option<u64>,

        /// Log level override
        ///
        /// Takes precedence over the configuration file and --verbose/--quiet.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration, print a summary and exit
        #[arg(long)]
        dry_run: bool,
    },

    /// Publish an error report onto the bus
    ///
    /// The messages form the cause chain, outermost first.
    ///
    /// Example:
    ///   natsify push-error "nightly sync failed" "connection refused"
    PushError {
        #[arg(required = true, value_name = "MESSAGE")]
        messages: Vec<String>,
    },

    /// Publish a notification envelope onto the bus
    ///
    /// Example:
    ///   natsify push --topic deploys --title shipped --tag rocket "v1.2.0"
    Push {
        /// Notification topic
        #[arg(long)]
        topic: String,

        /// Bus subject, defaults to nats.subject
        #[arg(long, value_parser = super::validation::validate_subject)]
        subject: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Tag, may be repeated
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Message body
        message: String,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Forward {
            mode: None,
            subject: None,
            nats_url: None,
            ntfy_url: None,
            timeout: None,
            log_level: None,
            dry_run: false,
        }
    }
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error", alias = "err")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardModeArg {
    Pull,
    Stream,
}

impl Cli {
    /// The command to run; `forward` when none was given
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl From<ForwardModeArg> for ForwardMode {
    fn from(mode: ForwardModeArg) -> Self {
        match mode {
            ForwardModeArg::Pull => ForwardMode::Pull,
            ForwardModeArg::Stream => ForwardMode::Stream,
        }
    }
}
