use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wikidocs_client::{ClientConfig, HttpWikiApi};

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wikidocs_cli=info,wikidocs_editor=info,wikidocs_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let config = ClientConfig::from_env()?;
    tracing::debug!(
        api_url = %config.api_url,
        signed_in = config.token.is_some(),
        autosave_delay_ms = config.autosave_delay_ms,
        "Loaded client configuration"
    );

    let api = Arc::new(HttpWikiApi::from_config(&config)?);

    commands::run(cli.command, api, &config).await
}
