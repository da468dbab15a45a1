use clap::Parser;
use tracing::Instrument;

use natsify::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};
use natsify::logger::app_span;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    let span = app_span(Some(&settings.application.name));
    async move {
        execute_command(&cli, settings).await.map_err(|e| {
            let err = anyhow::Error::from(e);
            tracing::error!(err = %format!("{err:#}"), "Command failed");
            err
        })
    }
    .instrument(span)
    .await
}
