//! Logger Module
//!
//! Process-wide `tracing-subscriber` setup:
//! - Level filter (`EnvFilter`); an empty level disables logging
//! - JSON, full or compact formatting
//! - stdout, stderr or file output, colored only on a terminal
//!
//! Components log through the `tracing` macros and never install a
//! subscriber themselves.

pub mod config;
pub mod error;
pub(crate) mod writer;


pub use config::{LogFormat, LogOutput, LoggerConfig};
pub use error::LoggerError;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Boxed layer stack installed on the registry
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize the logger with the given configuration
///
/// A disabled level installs nothing, so every event is dropped.
pub fn init_logger(config: &LoggerConfig) -> Result<(), LoggerError> {
    config.validate()?;
    if !config.is_enabled() {
        return Ok(());
    }

    let (writer, is_tty) = writer::make_writer(&config.output)?;
    let layer = build_layer(config, writer, config.colored && is_tty)?;

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}

/// Formatting layer with its level filter, writing to `writer`
pub fn build_layer(
    config: &LoggerConfig,
    writer: BoxMakeWriter,
    use_ansi: bool,
) -> Result<BoxedLayer, LoggerError> {
    let level = config
        .parse_level()?
        .map(|level| level.as_str().to_lowercase())
        .unwrap_or_else(|| "off".to_string());
    let filter = EnvFilter::try_new(&level).map_err(|e| LoggerError::config(e.to_string()))?;

    let base = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(config.include_source)
        .with_line_number(config.include_source);

    let layer = match config.format {
        LogFormat::Full => base.with_ansi(use_ansi).with_filter(filter).boxed(),
        LogFormat::Compact => base.with_ansi(use_ansi).compact().with_filter(filter).boxed(),
        LogFormat::Json => base
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    };

    Ok(layer)
}

/// Root span carrying `app_name` for every event recorded inside it
pub fn app_span(app_name: Option<&str>) -> tracing::Span {
    match app_name.filter(|name| !name.is_empty()) {
        Some(name) => tracing::info_span!("app", app_name = %name),
        None => tracing::info_span!("app"),
    }
}
