//! Entrypoint.

mod cli;
mod commands;

use clap::Parser;
use dotenvy::dotenv;
use pagerduty::{Client, HttpClient};
use tracing::debug;
use tracing_subscriber::filter::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        dotenvy::from_filename(custom_env_file)?;
    } else {
        // Try the default .env file, and ignore if it doesn't exist.
        dotenv().ok();
    }

    let cli = Cli::parse();

    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = cli.pagerduty;
    let http = reqwest::Client::builder().timeout(opts.timeout()).build()?;
    let client = Client::from_transport(HttpClient::with_http(http, opts.api_token, opts.base_url));
    debug!(
        base_url = client.transport().base_url(),
        timeout_secs = opts.timeout_secs,
        "PagerDuty client ready"
    );

    if let Some(output) = commands::execute(&client, opts.from.as_deref(), cli.command).await? {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}
