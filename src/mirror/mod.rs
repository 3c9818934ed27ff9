//! Mirrors: the per-source rules deciding what gets forwarded and how.
//!
//! ## Module Structure
//!
//! - `matcher`: keyword, regex and color matching primitives
//! - `filter`: keyword filters (`MirrorFilters`)
//! - `replacement`: facet rewrites (`MirrorReplacements`)
//! - `payload`: outbound payload construction
//! - `sink`: webhook destinations and the transport seam

pub mod filter;
pub mod matcher;
pub mod payload;
pub mod replacement;
pub mod sink;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::common::error::{ConfigError, ConfigResult, TransformResult};
use crate::common::types::{Message, Snowflake};
use crate::config::types::{MirrorConfig, OptionsConfig, RequirementsConfig};

use filter::MirrorFilters;
use payload::{build_payloads, Payload};
use replacement::MirrorReplacements;
use sink::{Sink, SinkTransport};

/// Invoked once per payload a sink accepted.
pub type SuccessCallback = Arc<dyn Fn() + Send + Sync>;

/// Minimum shape a message needs before it is mirrored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorRequirements {
    pub min_content_length: usize,
    pub min_embeds_count: usize,
    pub min_attachments_count: usize,
}

impl From<&RequirementsConfig> for MirrorRequirements {
    fn from(config: &RequirementsConfig) -> Self {
        Self {
            min_content_length: config.min_content_length,
            min_embeds_count: config.min_embeds_count,
            min_attachments_count: config.min_attachments_count,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MirrorOptions {
    pub use_webhook_profile: bool,
    pub remove_attachments: bool,
    pub mirror_messages_from_bots: bool,
    pub mirror_reply_messages: bool,
    pub mirror_messages_on_edit: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self::from(&OptionsConfig::default())
    }
}

impl From<&OptionsConfig> for MirrorOptions {
    fn from(config: &OptionsConfig) -> Self {
        Self {
            use_webhook_profile: config.use_webhook_profile,
            remove_attachments: config.remove_attachments,
            mirror_messages_from_bots: config.mirror_messages_from_bots,
            mirror_reply_messages: config.mirror_reply_messages,
            mirror_messages_on_edit: config.mirror_messages_on_edit,
        }
    }
}

/// A configured mirror, immutable once built.
pub struct Mirror {
    name: String,
    channel_ids: Vec<Snowflake>,
    sinks: Vec<Sink>,
    requirements: MirrorRequirements,
    options: MirrorOptions,
    replacements: MirrorReplacements,
    filters: MirrorFilters,
}

impl Mirror {
    /// Build a mirror, validating every rule it carries.
    ///
    /// Any invalid rule fails the whole mirror.
    pub fn from_config(config: &MirrorConfig) -> ConfigResult<Self> {
        let channel_ids = config
            .channel_ids
            .iter()
            .map(|id| {
                id.parse::<Snowflake>()
                    .map_err(|_| ConfigError::ValidationError {
                        message: format!("channel id '{}' is not numeric", id),
                    })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            name: config.label(),
            channel_ids,
            sinks: config.webhook_urls.iter().map(Sink::new).collect(),
            requirements: MirrorRequirements::from(&config.requirements),
            options: MirrorOptions::from(&config.options),
            replacements: MirrorReplacements::from_config(&config.replacements)?,
            filters: MirrorFilters::from_config(&config.filters)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel_ids(&self) -> &[Snowflake] {
        &self.channel_ids
    }

    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    pub fn filters(&self) -> &MirrorFilters {
        &self.filters
    }

    pub fn replacements(&self) -> &MirrorReplacements {
        &self.replacements
    }

    /// Decide whether a message is forwarded.
    ///
    /// Gates run in order and stop at the first rejection. When every gate
    /// passes the message has been stripped of whatever this mirror drops.
    pub fn should_mirror(&self, message: &mut Message, is_update: bool) -> bool {
        self.meets_options(message, is_update)
            && self.meets_requirements(message)
            && self.filters.matches(message)
            && self.strip_message(message)
    }

    fn meets_options(&self, message: &Message, is_update: bool) -> bool {
        if message.author.bot && !self.options.mirror_messages_from_bots {
            debug!(mirror = %self.name, "Rejected bot message");
            return false;
        }
        if message.reference.is_some() && !self.options.mirror_reply_messages {
            debug!(mirror = %self.name, "Rejected reply message");
            return false;
        }
        if is_update && !self.options.mirror_messages_on_edit {
            debug!(mirror = %self.name, "Rejected edited message");
            return false;
        }
        true
    }

    fn meets_requirements(&self, message: &Message) -> bool {
        message.content_len() >= self.requirements.min_content_length
            && message.embeds.len() >= self.requirements.min_embeds_count
            && message.attachments.len() >= self.requirements.min_attachments_count
    }

    /// Drop attachments and auto-embeds; rejects a message left with nothing.
    fn strip_message(&self, message: &mut Message) -> bool {
        if self.options.remove_attachments {
            if message.contains_only_attachments() {
                return false;
            }
            message.attachments.clear();
        }
        if message.is_gif() {
            message.embeds.pop();
        }
        true
    }

    pub fn apply_replacements(&self, message: &mut Message) -> TransformResult<()> {
        self.replacements.apply(message)
    }

    pub fn create_message_payloads(&self, message: &Message) -> Vec<Payload> {
        build_payloads(message, self.options.use_webhook_profile)
    }

    /// Send a message to every sink without waiting for delivery.
    ///
    /// One task is spawned per sink and payload. Failures are logged and do
    /// not affect the other sends.
    pub fn dispatch_message(
        &self,
        message: &Message,
        transport: Arc<dyn SinkTransport>,
        on_success: SuccessCallback,
    ) -> Vec<JoinHandle<()>> {
        let payloads = self.create_message_payloads(message);
        let mut handles = Vec::with_capacity(self.sinks.len() * payloads.len());

        for sink in &self.sinks {
            for payload in &payloads {
                let sink = sink.clone();
                let payload = payload.clone();
                let transport = Arc::clone(&transport);
                let on_success = Arc::clone(&on_success);
                let mirror = self.name.clone();

                handles.push(tokio::spawn(async move {
                    match transport.send(&sink, payload).await {
                        Ok(()) => on_success(),
                        Err(e) => error!(%mirror, %sink, "Failed to mirror message: {}", e),
                    }
                }));
            }
        }

        handles
    }
}
