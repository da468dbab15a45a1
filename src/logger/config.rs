//! Configuration types for the logger

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Level;

use super::error::LoggerError;

/// Main logger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Level name; empty disables logging
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Add file and line to every event
    pub include_source: bool,
    /// ANSI colors, only honoured when writing to a terminal
    pub colored: bool,
    /// Added to every event as `app_name` when set
    pub app_name: Option<String>,
}

impl LoggerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LoggerError> {
        self.parse_level()?;
        if let LogOutput::File { path, .. } = &self.output
            && path.as_os_str().is_empty()
        {
            return Err(LoggerError::config("Log file path cannot be empty"));
        }
        Ok(())
    }

    /// Parse the level; `None` means logging is disabled
    pub fn parse_level(&self) -> Result<Option<Level>, LoggerError> {
        match self.level.to_lowercase().as_str() {
            "" => Ok(None),
            "trace" => Ok(Some(Level::TRACE)),
            "debug" => Ok(Some(Level::DEBUG)),
            "info" => Ok(Some(Level::INFO)),
            "warn" => Ok(Some(Level::WARN)),
            "error" | "err" => Ok(Some(Level::ERROR)),
            _ => Err(LoggerError::config(format!(
                "Invalid log level '{}'. Valid levels are: trace, debug, info, warn, error",
                self.level
            ))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.level.is_empty()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            include_source: false,
            colored: true,
            app_name: None,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
    #[default]
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "text" | "logfmt" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" | "" => Ok(LogFormat::Json),
            _ => Err(LoggerError::format(format!(
                "Invalid log format '{}'. Valid formats are: full, compact, json",
                s
            ))),
        }
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Full => "full",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

/// Where log lines are written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Created if missing; truncated unless `append`
    File { path: PathBuf, append: bool },
}

impl LogOutput {
    /// `""`/`stdout`, `stderr`, or a file path
    pub fn parse(output: &str, append: bool) -> Self {
        match output {
            "" | "stdout" => LogOutput::Stdout,
            "stderr" => LogOutput::Stderr,
            path => LogOutput::File {
                path: PathBuf::from(path),
                append,
            },
        }
    }
}
