use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use herald_common::config::AppConfig;
use herald_common::types::PollState;
use herald_notifier::{Notifier, TelegramSender};
use herald_poller::client::StatusClient;
use herald_poller::logging;
use herald_poller::poller::ReviewPoller;

/// Install the stdout subscriber, plus a rolling file copy if configured.
fn init_tracing(config: Option<&AppConfig>) -> anyhow::Result<()> {
    let file_layer = match config {
        Some(AppConfig {
            log_file: Some(path),
            log_rotation,
            log_max_files,
            ..
        }) => {
            let writer = logging::rolling_file(path, *log_rotation, *log_max_files)?;
            Some(fmt::layer().with_ansi(false).with_writer(writer))
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_poller=debug,herald_notifier=debug".into()),
        )
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(None)?;
            tracing::error!(critical = true, kind = e.kind(), error = %e, "Cannot start review herald");
            return Err(e.into());
        }
    };

    init_tracing(Some(&config))?;
    tracing::info!("Review herald starting...");

    let source = StatusClient::new(
        &config.endpoint,
        &config.credentials.practicum_token,
        config.request_timeout,
    )?;
    let sender = TelegramSender::new(
        &config.telegram_api_url,
        &config.credentials.telegram_token,
        config.request_timeout,
    )?;
    let notifier = Notifier::new(sender, config.credentials.telegram_chat_id.clone());

    let state = PollState::starting_at(chrono::Utc::now().timestamp(), config.lookback);
    let mut poller = ReviewPoller::new(source, notifier, config.retry_period, state);

    // Run until Ctrl+C
    tokio::select! {
        () = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping...");
        }
    }

    tracing::info!("Review herald stopped.");
    Ok(())
}
