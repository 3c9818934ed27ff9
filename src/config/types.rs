//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord token used to observe source channels.
    pub token: String,
    /// Presence shown while mirroring: online, idle, dnd or invisible.
    #[serde(default = "default_status")]
    pub status: String,
    /// Line logged for every delivered payload. Empty disables it.
    ///
    /// Supports `%date%`, `%author%`, `%server%` and `%channel%`.
    #[serde(default)]
    pub log_message: String,
    #[serde(default)]
    pub mirrors: Vec<MirrorConfig>,
}

fn default_status() -> String {
    "online".to_string()
}

/// One mirror: source channels, destination webhooks and the rules in between.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// Label used in logs.
    pub name: Option<String>,
    /// Source channel IDs. Parent channel IDs also cover their threads.
    #[serde(default)]
    pub channel_ids: Vec<String>,
    #[serde(default)]
    pub webhook_urls: Vec<String>,
    #[serde(default)]
    pub requirements: RequirementsConfig,
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub replacements: Vec<ReplacementConfig>,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

impl MirrorConfig {
    /// Name for logs, falling back to the first channel ID.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.channel_ids.first().cloned())
            .unwrap_or_else(|| "unnamed".to_string())
    }
}

/// Minimum message shape required for mirroring.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequirementsConfig {
    pub min_content_length: usize,
    pub min_embeds_count: usize,
    pub min_attachments_count: usize,
}

/// Behavioral switches of a mirror.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Keep the webhook's own name and avatar instead of the author's.
    pub use_webhook_profile: bool,
    pub remove_attachments: bool,
    pub mirror_messages_from_bots: bool,
    pub mirror_reply_messages: bool,
    pub mirror_messages_on_edit: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            use_webhook_profile: false,
            remove_attachments: false,
            mirror_messages_from_bots: true,
            mirror_reply_messages: true,
            mirror_messages_on_edit: false,
        }
    }
}

/// A substitution rule.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplacementConfig {
    /// Regex, `*` for the whole value, or a hex color for `embed_color`.
    pub replace: String,
    pub with: String,
    /// Facet to rewrite; everywhere when absent.
    #[serde(rename = "where")]
    pub location: Option<String>,
}

/// A keyword filter rule.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// "whitelist" or "blacklist".
    #[serde(rename = "type")]
    pub kind: String,
    pub keywords: Vec<String>,
    /// message, post_tag, username, guild_nickname or user_roles.
    #[serde(rename = "where")]
    pub location: String,
}
