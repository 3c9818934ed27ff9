//! Bridge orchestrator that ties source channels to their mirrors.
//!
//! Every observed message runs through the same pipeline: eligibility, route
//! lookup, the mirror's gates, replacements and finally dispatch.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, error, info};

use crate::common::types::Message;
use crate::mirror::sink::SinkTransport;
use crate::mirror::SuccessCallback;

use super::registry::MirrorRegistry;

/// What happened to an observed message.
#[derive(Debug)]
pub enum MirrorOutcome {
    /// Not a message that can be mirrored at all.
    Ignored,
    /// No mirror watches the channel.
    NoRoute,
    /// The mirror's gates rejected it.
    Rejected,
    /// Sends were issued; handles may be dropped.
    Dispatched(Vec<tokio::task::JoinHandle<()>>),
}

/// The main bridge that orchestrates message flow.
pub struct Bridge {
    registry: Arc<MirrorRegistry>,
    transport: Arc<dyn SinkTransport>,
    /// Template logged per delivered payload; empty disables it.
    log_message: String,
}

impl Bridge {
    pub fn new(
        registry: Arc<MirrorRegistry>,
        transport: Arc<dyn SinkTransport>,
        log_message: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            transport,
            log_message: log_message.into(),
        }
    }

    /// Run a newly created or updated message through its mirror.
    pub fn mirror_message(&self, mut message: Message, is_update: bool) -> MirrorOutcome {
        if !is_mirrorable(&message) {
            return MirrorOutcome::Ignored;
        }

        let Some(mirror) = self.registry.route_for(&message) else {
            return MirrorOutcome::NoRoute;
        };

        if !mirror.should_mirror(&mut message, is_update) {
            debug!(
                mirror = mirror.name(),
                channel_id = message.channel.id,
                "Message {} not mirrored",
                message.id
            );
            return MirrorOutcome::Rejected;
        }

        if let Err(e) = mirror.apply_replacements(&mut message) {
            error!(mirror = mirror.name(), "Failed to apply replacements: {}", e);
        }

        let on_success = self.success_callback(&message);
        MirrorOutcome::Dispatched(mirror.dispatch_message(
            &message,
            Arc::clone(&self.transport),
            on_success,
        ))
    }

    /// Edits are only mirrored once the full message is known.
    pub fn on_message_update(&self, message: Option<Message>) -> MirrorOutcome {
        match message {
            Some(message) => self.mirror_message(message, true),
            None => {
                debug!("Ignoring partial message update");
                MirrorOutcome::Ignored
            }
        }
    }

    fn success_callback(&self, message: &Message) -> SuccessCallback {
        if self.log_message.is_empty() {
            return Arc::new(|| {});
        }

        let template = self.log_message.clone();
        let author = message.author.username.clone();
        let server = message
            .guild
            .as_ref()
            .map(|guild| guild.name.clone())
            .unwrap_or_default();
        let channel = message.channel.name.clone();

        Arc::new(move || {
            let date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            info!("{}", render_log_message(&template, &date, &author, &server, &channel));
        })
    }
}

/// Excludes system, direct, ephemeral, empty and crossposted messages.
pub fn is_mirrorable(message: &Message) -> bool {
    !message.flags.system
        && !message.is_direct()
        && !message.flags.ephemeral
        && !message.is_empty()
        && !message.flags.crossposted
}

/// Substitute the first occurrence of each token in the template.
pub fn render_log_message(
    template: &str,
    date: &str,
    author: &str,
    server: &str,
    channel: &str,
) -> String {
    template
        .replacen("%date%", date, 1)
        .replacen("%author%", author, 1)
        .replacen("%server%", server, 1)
        .replacen("%channel%", channel, 1)
}
