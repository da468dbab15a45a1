//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use reqwest::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{
    ApplicationConfig, ErrorReportingConfig, ForwarderSettings, LoggerSettings, NatsConfig,
    NtfyConfig, Settings,
};

/// Valid log levels; the empty string disables logging
const VALID_LOG_LEVELS: &[&str] = &["", "trace", "debug", "info", "warn", "error", "err"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json", "text", "logfmt"];

const NTFY_SCHEMES: &[&str] = &["http", "https"];

const NATS_SCHEMES: &[&str] = &["nats", "tls", "ws", "wss"];

/// Check `url` parses and uses one of `schemes`
fn validate_url(field: &str, url: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: "URL is required.".to_string(),
        });
    }

    let parsed = Url::parse(url).map_err(|e| ConfigError::ValidationError {
        field: field.to_string(),
        message: format!("Invalid URL '{}': {}", url, e),
    })?;

    if !schemes.contains(&parsed.scheme()) {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: format!(
                "Unsupported URL scheme '{}'. Expected one of: {}",
                parsed.scheme(),
                schemes.join(", ")
            ),
        });
    }

    Ok(())
}

fn validate_subject(field: &str, subject: &str) -> Result<(), ConfigError> {
    if subject.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: "Subject cannot be empty.".to_string(),
        });
    }
    if subject.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: format!("Subject '{}' cannot contain whitespace.", subject),
        });
    }
    Ok(())
}

impl ApplicationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation(
                "application.name",
                "Application name cannot be empty.",
            ));
        }
        Ok(())
    }
}

impl NtfyConfig {
    /// Validate ntfy configuration
    ///
    /// # Validation Rules
    /// - URL must be a valid http or https URL
    /// - Timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("ntfy.url", &self.url, NTFY_SCHEMES)?;

        if self.timeout == 0 {
            return Err(ConfigError::validation(
                "ntfy.timeout",
                "Timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl NatsConfig {
    /// Validate NATS configuration
    ///
    /// # Validation Rules
    /// - URL must be a valid nats, tls, ws or wss URL
    /// - Subject must not be empty
    /// - Dial timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("nats.url", &self.url, NATS_SCHEMES)?;
        validate_subject("nats.subject", &self.subject)?;

        if self.dial_timeout == 0 {
            return Err(ConfigError::validation(
                "nats.dial_timeout",
                "Dial timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl ForwarderSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message_timeout == 0 {
            return Err(ConfigError::validation(
                "forwarder.message_timeout",
                "Message timeout must be greater than 0 seconds.",
            ));
        }

        if self.channel_capacity == 0 {
            return Err(ConfigError::validation(
                "forwarder.channel_capacity",
                "Channel capacity must be greater than 0.",
            ));
        }

        Ok(())
    }
}

impl ErrorReportingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_subject("error_reporting.subject", &self.subject)?;

        if self.topic.trim().is_empty() {
            return Err(ConfigError::validation(
                "error_reporting.topic",
                "Topic cannot be empty.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error (or empty)
    /// - Log format must be one of: full, compact, json
    /// - Output must not be blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: trace, debug, info, warn, error",
                    self.level
                ),
            });
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: full, compact, json",
                    self.format
                ),
            });
        }

        if !self.output.is_empty() && self.output.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.output",
                "Output must be stdout, stderr or a file path.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.application.validate()?;
        self.ntfy.validate()?;
        self.nats.validate()?;
        self.forwarder.validate()?;
        self.error_reporting.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    // ========================================================================
    // URL validation tests
    // ========================================================================

    #[test]
    fn test_ntfy_config_valid_schemes() {
        for url in ["http://localhost:32016", "https://ntfy.sh"] {
            let config = NtfyConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "URL should be valid: {}", url);
        }
    }

    #[test]
    fn test_ntfy_config_invalid_url() {
        for url in ["", "localhost:32016", "nats://127.0.0.1:4222"] {
            let config = NtfyConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert_eq!(field_of(config.validate().unwrap_err()), "ntfy.url", "url: {url}");
        }
    }

    #[test]
    fn test_ntfy_config_zero_timeout() {
        let config = NtfyConfig {
            timeout: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "ntfy.timeout");
    }

    #[test]
    fn test_nats_config_valid_schemes() {
        for url in [
            "nats://127.0.0.1:4222",
            "tls://nats.internal:4443",
            "ws://localhost:8080",
            "wss://nats.example.com",
        ] {
            let config = NatsConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "URL should be valid: {}", url);
        }
    }

    #[test]
    fn test_nats_config_wrong_scheme() {
        let config = NatsConfig {
            url: "http://127.0.0.1:4222".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Unsupported URL scheme 'http'"));
    }

    #[test]
    fn test_nats_config_subject_rules() {
        for subject in ["", "   ", "two words"] {
            let config = NatsConfig {
                subject: subject.to_string(),
                ..Default::default()
            };
            assert_eq!(field_of(config.validate().unwrap_err()), "nats.subject");
        }
    }

    #[test]
    fn test_nats_config_zero_dial_timeout() {
        let config = NatsConfig {
            dial_timeout: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "nats.dial_timeout");
    }

    #[test]
    fn test_negative_reconnects_allowed() {
        let config = NatsConfig {
            max_reconnects: -1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    // ========================================================================
    // Forwarder and reporting validation tests
    // ========================================================================

    #[test]
    fn test_forwarder_settings_zero_values() {
        let settings = ForwarderSettings {
            message_timeout: 0,
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "forwarder.message_timeout");

        let settings = ForwarderSettings {
            channel_capacity: 0,
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "forwarder.channel_capacity");
    }

    #[test]
    fn test_error_reporting_empty_values() {
        let config = ErrorReportingConfig {
            subject: String::new(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "error_reporting.subject");

        let config = ErrorReportingConfig {
            topic: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "error_reporting.topic");
    }

    // ========================================================================
    // LoggerSettings validation tests
    // ========================================================================

    #[test]
    fn test_logger_settings_valid_levels() {
        for level in ["", "trace", "debug", "info", "warn", "error", "err", "INFO"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "Level should be valid: {}", level);
        }
    }

    #[test]
    fn test_logger_settings_invalid_level() {
        let settings = LoggerSettings {
            level: "invalid".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.level");
    }

    #[test]
    fn test_logger_settings_formats() {
        for format in ["full", "compact", "json", "logfmt", "TEXT"] {
            let settings = LoggerSettings {
                format: format.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "Format should be valid: {}", format);
        }

        let settings = LoggerSettings {
            format: "xml".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.format");
    }

    #[test]
    fn test_logger_settings_blank_output() {
        let settings = LoggerSettings {
            output: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.output");
    }

    // ========================================================================
    // Settings validation tests
    // ========================================================================

    #[test]
    fn test_settings_default_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_settings_empty_application_name() {
        let settings = Settings {
            application: ApplicationConfig {
                name: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "application.name");
    }

    #[test]
    fn test_settings_reports_first_failure() {
        let settings = Settings {
            ntfy: NtfyConfig {
                url: String::new(),
                ..Default::default()
            },
            logger: LoggerSettings {
                level: "invalid".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "ntfy.url");
    }
}
