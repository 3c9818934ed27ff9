//! Mirrorkeeper - Discord channel mirroring bot
//!
//! Watches Discord channels and forwards their messages to webhooks, applying
//! per-mirror filters and replacements on the way.

mod bridge;
mod common;
mod config;
mod discord;
mod mirror;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use bridge::{Bridge, MirrorRegistry};
use config::{env::get_config_path, load_and_validate};
use discord::{build_http, DiscordBot, WebhookTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Mirrorkeeper v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    let registry = MirrorRegistry::from_config(&config).map_err(|e| {
        error!("Failed to build mirrors: {}", e);
        e
    })?;
    if registry.is_empty() {
        warn!("No channels are mirrored");
    }

    info!("Configuration loaded successfully");
    info!("  Mirrors: {}", config.mirrors.len());
    info!("  Channels: {}", registry.len());
    info!("  Status: {}", config.status);

    // Webhook executions share one HTTP client
    let http = Arc::new(build_http(&config.token)?);
    let webhook_urls = config
        .mirrors
        .iter()
        .flat_map(|mirror| mirror.webhook_urls.iter().cloned());
    let transport = Arc::new(WebhookTransport::resolve(http, webhook_urls).await);

    let bridge = Arc::new(Bridge::new(
        Arc::new(registry),
        transport,
        config.log_message.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let discord_bot = DiscordBot::build(config.token.clone(), &config.status, bridge).await?;

    info!("Starting Discord bot...");
    let mut discord_task = tokio::spawn(discord_bot.run(shutdown_rx));

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - stopping...");
            true
        }
        _ = &mut discord_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            warn!("Shutdown channel closed (Discord task already exited): {}", e);
        }
        let timeout = tokio::time::Duration::from_secs(5);
        match tokio::time::timeout(timeout, discord_task).await {
            Ok(Ok(())) => info!("Discord client stopped gracefully"),
            Ok(Err(e)) => warn!("Discord task panicked: {}", e),
            Err(_) => warn!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
