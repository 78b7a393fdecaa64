//! Homework Status Bot - Main Entry Point
//!
//! Polls the homework review API every few minutes and sends status
//! changes to a Telegram chat.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use homework_status_bot::config::{Credentials, PollerSettings};
use homework_status_bot::homework::ApiClient;
use homework_status_bot::logging::init_tracing;
use homework_status_bot::scheduler::StatusPoller;
use homework_status_bot::telegram::TelegramNotifier;

/// Telegram bot relaying homework review status changes.
#[derive(Parser, Debug)]
#[command(name = "homework_bot")]
#[command(about = "Relay homework review status changes to Telegram")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "debug")]
    log_level: String,

    /// Log file path, overrides `LOG_FILE`.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env_loaded = dotenvy::from_filename(&args.env_file);

    let settings = PollerSettings::from_env().context("Invalid polling settings in environment")?;

    let log_file = args.log_file.clone().unwrap_or_else(|| settings.log_file.clone());
    init_tracing(&log_file, &args.log_level)?;

    if let Err(e) = env_loaded {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("CRITICAL: {}", e);
            return Err(e).context("Failed to load credentials from environment");
        }
    };

    info!(
        "Loaded settings: {}",
        serde_json::to_string(&settings).context("Failed to serialize settings")?
    );

    let source = ApiClient::new(
        settings.endpoint.clone(),
        credentials.practicum_token.clone(),
        settings.request_timeout(),
    )
    .context("Failed to build review API client")?;

    let mut notifier =
        TelegramNotifier::new(credentials.telegram_token.clone(), &credentials.telegram_chat_id);
    if let Some(url) = &settings.telegram_api_url {
        let url = reqwest::Url::parse(url).context("TELEGRAM_API_URL is not a valid URL")?;
        notifier = notifier.with_api_url(url);
    }

    let poller = StatusPoller::new(source, notifier, &settings);

    info!("Starting homework status bot...");

    tokio::select! {
        result = poller.run() => {
            result.context("Failed to send Telegram notification")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
