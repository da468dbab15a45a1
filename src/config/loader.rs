//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. `default.toml` (required)
//! 2. `{environment}.toml`
//! 3. `local.toml`
//! 4. `NATSIFY_*` environment variables, `__` between nested keys
//!
//! A single file (`NATSIFY_CONFIG_FILE` or `--config`) replaces the three
//! files; environment variables still apply on top of it.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "NATSIFY_CONFIG_DIR";

const CONFIG_FILE_ENV: &str = "NATSIFY_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

const ENV_PREFIX: &str = "NATSIFY";

const ENV_SEPARATOR: &str = "__";

type Builder = ConfigBuilder<DefaultState>;

/// Where configuration files are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `default.toml`, `{environment}.toml` and `local.toml` in a directory
    Layered(PathBuf),
    /// One file, nothing else
    File(PathBuf),
}

/// Loads and validates [`Settings`]
#[derive(Debug)]
pub struct ConfigLoader {
    source: ConfigSource,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Loader configured from `NATSIFY_CONFIG_DIR`, `NATSIFY_CONFIG_FILE`
    /// and `NATSIFY_APP_ENV`
    ///
    /// # Errors
    ///
    /// `MutualExclusivityError` when both `NATSIFY_CONFIG_DIR` and
    /// `NATSIFY_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let source = match (
            std::env::var_os(CONFIG_DIR_ENV),
            std::env::var_os(CONFIG_FILE_ENV),
        ) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::mutual_exclusivity(
                    "NATSIFY_CONFIG_DIR and NATSIFY_CONFIG_FILE cannot both be set. \
                     Use NATSIFY_CONFIG_DIR for layered configuration or \
                     NATSIFY_CONFIG_FILE for a single configuration file.",
                ));
            }
            (None, Some(file)) => ConfigSource::File(file.into()),
            (Some(dir), None) => ConfigSource::Layered(dir.into()),
            (None, None) => ConfigSource::Layered(PathBuf::from(DEFAULT_CONFIG_DIR)),
        };

        Ok(Self {
            source,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load this file only, skipping the layered files
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = ConfigSource::File(path.into());
        self
    }

    /// Use `environment` instead of `NATSIFY_APP_ENV`
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Read every source, deserialize and validate
    ///
    /// # Errors
    ///
    /// - `FileNotFound` for a missing required file
    /// - `ParseError` or `Other` when a source cannot be read
    /// - `ValidationError` from [`Settings::validate`]
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings: Settings = self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Files to read in precedence order, with whether each must exist
    fn files(&self) -> Vec<(PathBuf, bool)> {
        match &self.source {
            ConfigSource::File(path) => vec![(path.clone(), true)],
            ConfigSource::Layered(dir) => vec![
                (dir.join("default.toml"), true),
                (dir.join(format!("{}.toml", self.environment.as_str())), false),
                (dir.join("local.toml"), false),
            ],
        }
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = self
            .files()
            .into_iter()
            .try_fold(Config::builder(), |builder, (path, required)| {
                add_file(builder, &path, required)
            })?;

        // NATSIFY_NATS__SUBJECT -> nats.subject
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        );

        builder.build().map_err(ConfigError::from)
    }
}

fn add_file(builder: Builder, path: &Path, required: bool) -> Result<Builder, ConfigError> {
    if required && !path.is_file() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }

    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(required)))
}
