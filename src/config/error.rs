//! Errors raised while loading or validating configuration

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file is missing
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Sources were read but did not deserialize into settings
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value is out of range or malformed
    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// Two settings that cannot be combined are both present
    #[error("Mutual exclusivity error: {0}")]
    MutualExclusivityError(String),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }

    /// Setting, file or source a failure is attributed to
    pub fn key(&self) -> String {
        match self {
            ConfigError::ValidationError { field, .. } => field.clone(),
            ConfigError::FileNotFound(path) => path.clone(),
            ConfigError::EnvVarError(_) | ConfigError::MutualExclusivityError(_) => {
                "environment".to_string()
            }
            ConfigError::ParseError(_) | ConfigError::Other(_) => "config".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_validated_field() {
        let err = ConfigError::validation("nats.url", "NATS URL cannot be empty");
        assert_eq!(err.key(), "nats.url");
        assert_eq!(
            err.to_string(),
            "Validation error: nats.url - NATS URL cannot be empty"
        );
    }

    #[test]
    fn test_key_for_environment_errors() {
        assert_eq!(ConfigError::mutual_exclusivity("both set").key(), "environment");
        assert_eq!(ConfigError::file_not_found("/etc/natsify.toml").key(), "/etc/natsify.toml");
    }
}
