//! Layered settings for natsify.
//!
//! `default.toml`, then `{environment}.toml`, then `local.toml` (kept out of
//! version control), then `NATSIFY_*` environment variables. Later sources
//! override earlier ones; the result is validated before it is returned.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::{ConfigLoader, ConfigSource};
pub use settings::{NatsConfig, NtfyConfig, Settings};
