//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

/// Merges CLI argument overrides into file-based configuration
///
/// Precedence, highest first: command flags, `--verbose`/`--quiet`,
/// environment variables, configuration files.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration for `cli`
    ///
    /// `--config` switches to single-file loading and `--env` replaces
    /// `NATSIFY_APP_ENV`.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(path) = cli.config.as_deref() {
            Self::validate_config_file_access(path)?;
            loader = loader.with_config_file(path);
        }

        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        Ok(Self::new(loader.load()?))
    }

    /// Validate that the configuration file is accessible and readable
    fn validate_config_file_access(path: &Path) -> Result<(), ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::file_not_found(path.display().to_string()));
        }

        std::fs::File::open(path)
            .map(|_| ())
            .map_err(|e| ConfigError::ValidationError {
                field: "config_file".to_string(),
                message: format!("Cannot read configuration file '{}': {}", path.display(), e),
            })
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// # Returns
    /// A new, validated Settings instance with CLI overrides applied
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        Self::apply_global_overrides(&mut config, cli);
        Self::apply_command_overrides(&mut config, &cli.resolved_command());

        config.validate()?;

        Ok(config)
    }

    fn apply_global_overrides(config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        match command {
            Commands::Forward {
                mode,
                subject,
                nats_url,
                ntfy_url,
                timeout,
                log_level,
                dry_run: _,
            } => {
                if let Some(mode) = mode {
                    config.forwarder.mode = (*mode).into();
                }
                if let Some(subject) = subject {
                    config.nats.subject = subject.clone();
                }
                if let Some(url) = nats_url {
                    config.nats.url = url.clone();
                }
                if let Some(url) = ntfy_url {
                    config.ntfy.url = url.clone();
                }
                if let Some(timeout) = timeout {
                    config.forwarder.message_timeout = *timeout;
                }
                // Command-specific level wins over --verbose/--quiet
                if let Some(level) = log_level {
                    config.logger.level = (*level).into();
                }
            }
            Commands::PushError { .. } | Commands::Push { .. } => {}
        }
    }

    /// Get the base configuration
    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ForwardMode;
    use clap::Parser;

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(Settings::default()).merge_cli_args(&cli)
    }

    #[test]
    fn test_configuration_merger_new() {
        let base_config = Settings::default();
        let merger = ConfigurationMerger::new(base_config.clone());
        assert_eq!(merger.config(), &base_config);
    }

    #[test]
    fn test_merge_without_flags_keeps_base() {
        assert_eq!(merge(&["natsify"]).unwrap(), Settings::default());
    }

    #[test]
    fn test_merge_verbose_flag() {
        assert_eq!(merge(&["natsify", "--verbose"]).unwrap().logger.level, "debug");
    }

    #[test]
    fn test_merge_quiet_flag() {
        assert_eq!(merge(&["natsify", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_merge_forward_overrides() {
        let merged = merge(&[
            "natsify",
            "forward",
            "--mode",
            "pull",
            "--subject",
            "alerts",
            "--nats-url",
            "tls://nats.internal:4443",
            "--ntfy-url",
            "https://ntfy.sh",
            "--timeout",
            "12",
        ])
        .unwrap();

        assert_eq!(merged.forwarder.mode, ForwardMode::Pull);
        assert_eq!(merged.nats.subject, "alerts");
        assert_eq!(merged.nats.url, "tls://nats.internal:4443");
        assert_eq!(merged.ntfy.url, "https://ntfy.sh");
        assert_eq!(merged.forwarder.message_timeout, 12);
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let merged = merge(&["natsify", "--verbose", "forward", "--log-level", "warn"]).unwrap();
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_merged_settings_are_validated() {
        let err = merge(&["natsify", "forward", "--ntfy-url", "ftp://ntfy.sh"]).unwrap_err();
        assert_eq!(err.key(), "ntfy.url");
    }

    #[test]
    fn test_push_commands_do_not_override() {
        let merged = merge(&["natsify", "push", "--topic", "t", "--subject", "other", "m"]).unwrap();
        assert_eq!(merged.nats.subject, Settings::default().nats.subject);
    }
}
