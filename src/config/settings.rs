//! Configuration settings structures for natsify
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{LogFormat, LogOutput, LoggerConfig};
use crate::services::forwarder::ForwardMode;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "natsify".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_ntfy_url() -> String {
    "http://localhost:32016".to_string()
}

fn default_ntfy_timeout() -> u64 {
    5
}

fn default_nats_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_nats_subject() -> String {
    "natsify".to_string()
}

fn default_dial_timeout() -> u64 {
    2
}

fn default_max_reconnects() -> i64 {
    60
}

fn default_message_timeout() -> u64 {
    5
}

fn default_channel_capacity() -> usize {
    64
}

fn default_error_subject() -> String {
    "natsify.errors".to_string()
}

fn default_error_topic() -> String {
    "errors".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name, used as the error title prefix and the `app_name`
    /// log field
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// ntfy Configuration
// ============================================================================

/// Push-notification service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtfyConfig {
    /// Server base URL
    #[serde(default = "default_ntfy_url")]
    pub url: String,

    /// HTTP timeout in seconds
    #[serde(default = "default_ntfy_timeout")]
    pub timeout: u64,

    /// Access token sent as a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for NtfyConfig {
    fn default() -> Self {
        Self {
            url: default_ntfy_url(),
            timeout: default_ntfy_timeout(),
            token: None,
        }
    }
}

// ============================================================================
// NATS Configuration
// ============================================================================

/// Message bus connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_nats_url")]
    pub url: String,

    /// Subject the forwarder consumes
    #[serde(default = "default_nats_subject")]
    pub subject: String,

    /// Dial timeout in seconds
    #[serde(default = "default_dial_timeout")]
    pub dial_timeout: u64,

    /// Reconnect attempts; negative keeps trying forever
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: i64,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: default_nats_url(),
            subject: default_nats_subject(),
            dial_timeout: default_dial_timeout(),
            max_reconnects: default_max_reconnects(),
        }
    }
}

// ============================================================================
// Forwarder Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwarderSettings {
    #[serde(default)]
    pub mode: ForwardMode,

    /// Per-message delivery timeout in seconds
    #[serde(default = "default_message_timeout")]
    pub message_timeout: u64,

    /// Stream delivery channel capacity
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for ForwarderSettings {
    fn default() -> Self {
        Self {
            mode: ForwardMode::default(),
            message_timeout: default_message_timeout(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

// ============================================================================
// Error Reporting Configuration
// ============================================================================

/// Destination of errors reported through the error publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReportingConfig {
    /// Bus subject
    #[serde(default = "default_error_subject")]
    pub subject: String,

    /// Notification topic
    #[serde(default = "default_error_topic")]
    pub topic: String,
}

impl Default for ErrorReportingConfig {
    fn default() -> Self {
        Self {
            subject: default_error_subject(),
            topic: default_error_topic(),
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"; empty disables logging
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "json", "full" or "compact"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// "stdout", "stderr" or a file path
    #[serde(default = "default_log_output")]
    pub output: String,

    /// Append to an existing log file instead of truncating it
    #[serde(default)]
    pub append: bool,

    /// Include file and line of the call site
    #[serde(default)]
    pub include_source: bool,

    /// Whether to use colored output on a terminal
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
            append: false,
            include_source: false,
            colored: default_true(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to LoggerConfig
    ///
    /// `app_name` is attached to every event when non-empty.
    pub fn into_logger_config(self, app_name: &str) -> Result<LoggerConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.format".to_string(),
                message: e.to_string(),
            })?;

        let config = LoggerConfig {
            level: self.level,
            format,
            output: LogOutput::parse(&self.output, self.append),
            include_source: self.include_source,
            colored: self.colored,
            app_name: Some(app_name.to_string()).filter(|name| !name.is_empty()),
        };

        config
            .validate()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            })?;

        Ok(config)
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Notification service
    #[serde(default)]
    pub ntfy: NtfyConfig,

    /// Message bus
    #[serde(default)]
    pub nats: NatsConfig,

    #[serde(default)]
    pub forwarder: ForwarderSettings,

    #[serde(default)]
    pub error_reporting: ErrorReportingConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}
