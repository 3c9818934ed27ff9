//! Lookup of the mirror owning a source channel.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::common::error::ConfigResult;
use crate::common::types::{Message, Snowflake};
use crate::config::types::Config;
use crate::mirror::Mirror;

/// Mirrors keyed by every channel they watch. Read-only after startup.
#[derive(Default)]
pub struct MirrorRegistry {
    by_channel: HashMap<Snowflake, Arc<Mirror>>,
}

impl MirrorRegistry {
    /// Build every configured mirror. One invalid mirror fails the whole registry.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let mut registry = Self::default();

        for mirror_config in &config.mirrors {
            if mirror_config.channel_ids.is_empty() {
                warn!("Mirror '{}' has no channel_ids and is skipped", mirror_config.label());
                continue;
            }

            let mirror = Mirror::from_config(mirror_config)?;
            info!(
                "Mirror '{}': {} channel(s) -> {} webhook(s), {} filter(s), {} replacement(s)",
                mirror.name(),
                mirror.channel_ids().len(),
                mirror.sinks().len(),
                mirror.filters().len(),
                mirror.replacements().len(),
            );
            registry.insert(Arc::new(mirror));
        }

        Ok(registry)
    }

    /// Register `mirror` for each of its channels. The later mirror wins a shared channel.
    fn insert(&mut self, mirror: Arc<Mirror>) {
        for &channel_id in mirror.channel_ids() {
            if let Some(previous) = self.by_channel.insert(channel_id, Arc::clone(&mirror)) {
                warn!(
                    "Channel {} is listed by both '{}' and '{}'; '{}' takes it",
                    channel_id,
                    previous.name(),
                    mirror.name(),
                    mirror.name(),
                );
            }
        }
    }

    /// Mirror for the message's channel, falling back to its parent channel.
    pub fn route_for(&self, message: &Message) -> Option<Arc<Mirror>> {
        self.by_channel
            .get(&message.channel.id)
            .or_else(|| {
                message
                    .parent_channel_id()
                    .and_then(|parent_id| self.by_channel.get(&parent_id))
            })
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.by_channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_channel.is_empty()
    }
}
