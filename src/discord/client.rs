//! Discord bot client abstraction.
//!
//! Provides a high-level interface for creating and running the Discord bot,
//! hiding serenity implementation details from the rest of the application.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::async_trait;
use serenity::cache::Settings as CacheSettings;
use serenity::http::{Http, HttpBuilder};
use serenity::model::channel::Message as DiscordMessage;
use serenity::model::event::MessageUpdateEvent;
use serenity::model::gateway::Ready;
use serenity::model::user::OnlineStatus;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::bridge::{Bridge, MirrorOutcome};
use crate::discord::convert::convert_message;

/// Messages kept in the cache so edits arrive with their full content.
const MESSAGE_CACHE_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub enum DiscordBotEvent {
    /// Bot connected and ready.
    Ready(Ready),
    /// Message received.
    Message {
        context: Context,
        message: DiscordMessage,
    },
    /// Message edited. `None` when the edited message was not cached.
    MessageUpdate {
        context: Context,
        message: Option<DiscordMessage>,
    },
    Disconnected,
}

struct DiscordBotEvents {
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
}

impl DiscordBotEvents {
    fn new(discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>) -> Self {
        Self { discord_events_tx }
    }

    fn forward(&self, event: DiscordBotEvent) {
        if let Err(error) = self.discord_events_tx.send(event) {
            warn!("Failed to process discord event: {}", error);
        }
    }
}

#[async_trait]
impl EventHandler for DiscordBotEvents {
    async fn ready(&self, _context: Context, ready: Ready) {
        self.forward(DiscordBotEvent::Ready(ready));
    }

    async fn message(&self, context: Context, message: DiscordMessage) {
        self.forward(DiscordBotEvent::Message { context, message });
    }

    async fn message_update(
        &self,
        context: Context,
        _old_if_available: Option<DiscordMessage>,
        new: Option<DiscordMessage>,
        _event: MessageUpdateEvent,
    ) {
        self.forward(DiscordBotEvent::MessageUpdate {
            context,
            message: new,
        });
    }
}

/// Presence for a configured status; unknown values fall back to online.
pub fn parse_status(status: &str) -> OnlineStatus {
    match status.to_lowercase().as_str() {
        "idle" => OnlineStatus::Idle,
        "dnd" => OnlineStatus::DoNotDisturb,
        "invisible" => OnlineStatus::Invisible,
        _ => OnlineStatus::Online,
    }
}

/// Build a serenity HTTP client with request timeouts.
pub fn build_http(token: &str) -> anyhow::Result<Http> {
    // Build a custom reqwest client with timeout settings
    let reqwest_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    Ok(HttpBuilder::new(token).client(reqwest_client).build())
}

async fn build_client(
    token: &str,
    status: OnlineStatus,
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
) -> anyhow::Result<Client> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS;

    let mut cache_settings = CacheSettings::default();
    cache_settings.max_messages = MESSAGE_CACHE_SIZE;

    let events = DiscordBotEvents::new(discord_events_tx);
    let client = serenity::client::ClientBuilder::new_with_http(build_http(token)?, intents)
        .status(status)
        .cache_settings(cache_settings)
        .event_handler(events)
        .await?;
    Ok(client)
}

/// Create an exponential backoff iterator for Discord reconnection.
/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn discord_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(MAX_RECONNECT_DELAY)
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(300);

pub struct DiscordBot {
    client: Option<Client>,
    token: String,
    status: OnlineStatus,
    bridge: Arc<Bridge>,
    discord_events_rx: mpsc::UnboundedReceiver<DiscordBotEvent>,
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
}

impl DiscordBot {
    /// Build the Discord bot.
    pub async fn build(token: String, status: &str, bridge: Arc<Bridge>) -> anyhow::Result<Self> {
        let status = parse_status(status);
        let (discord_events_tx, discord_events_rx) = mpsc::unbounded_channel::<DiscordBotEvent>();
        let client = build_client(&token, status, discord_events_tx.clone()).await?;

        Ok(Self {
            client: Some(client),
            token,
            status,
            bridge,
            discord_events_rx,
            discord_events_tx,
        })
    }

    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        // Extract shard manager before we move client into run_connection
        let shard_manager = self.client.as_ref().map(|c| c.shard_manager.clone());
        let client = &mut self.client;
        let discord_events_rx = &mut self.discord_events_rx;
        let bridge = &self.bridge;

        tokio::select! {
            _ = Self::run_connection(client, &self.token, self.status, &self.discord_events_tx) => {},
            _ = Self::process_events(discord_events_rx, bridge) => {},
            _ = async {
                // Wait for shutdown signal
                loop {
                    if shutdown_rx.changed().await.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                // Gracefully shutdown Discord gateway
                if let Some(ref manager) = shard_manager {
                    info!("Initiating graceful Discord shutdown...");
                    manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                }
            } => {}
        }
        info!("Discord task ended");
    }

    async fn run_connection(
        client: &mut Option<Client>,
        token: &str,
        status: OnlineStatus,
        discord_events_tx: &mpsc::UnboundedSender<DiscordBotEvent>,
    ) {
        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match client.take() {
                Some(client) => client,
                None => {
                    // serenity mostly handles reconnections itself.
                    match build_client(token, status, discord_events_tx.clone()).await {
                        Ok(client) => {
                            backoff = discord_backoff();
                            client
                        }
                        Err(e) => {
                            error!("Failed to rebuild Discord client: {}", e);
                            let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                            warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                            sleep(delay).await;
                            continue;
                        }
                    }
                }
            };

            match client.start().await {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    if let Err(error) = discord_events_tx.send(DiscordBotEvent::Disconnected) {
                        warn!("Failed to process discord event: {}", error);
                    }
                    break;
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                    warn!(
                        "Discord disconnected. Reconnecting in {:.1}s...",
                        delay.as_secs_f64(),
                    );
                    if let Err(error) = discord_events_tx.send(DiscordBotEvent::Disconnected) {
                        warn!("Failed to process discord event: {}", error);
                    }
                    sleep(delay).await;
                }
            }
        }
    }

    /// Drive the bridge with gateway events, one at a time.
    async fn process_events(
        discord_events_rx: &mut mpsc::UnboundedReceiver<DiscordBotEvent>,
        bridge: &Bridge,
    ) {
        while let Some(event) = discord_events_rx.recv().await {
            match event {
                DiscordBotEvent::Ready(ready) => {
                    info!("{} is now mirroring", ready.user.name);
                }
                DiscordBotEvent::Message { context, message } => {
                    let message = convert_message(&context, &message).await;
                    log_outcome(message.id, bridge.mirror_message(message, false));
                }
                DiscordBotEvent::MessageUpdate {
                    context,
                    message: Some(message),
                } => {
                    let message = convert_message(&context, &message).await;
                    log_outcome(message.id, bridge.on_message_update(Some(message)));
                }
                DiscordBotEvent::MessageUpdate { message: None, .. } => {
                    bridge.on_message_update(None);
                }
                DiscordBotEvent::Disconnected => {
                    debug!("Discord gateway disconnected");
                }
            }
        }
        debug!("Discord events channel closed.");
    }
}

fn log_outcome(message_id: u64, outcome: MirrorOutcome) {
    match outcome {
        MirrorOutcome::Dispatched(handles) => {
            debug!(message_id, sends = handles.len(), "Message dispatched");
        }
        other => debug!(message_id, "Message not mirrored: {:?}", other),
    }
}
