//! Shared types used across the application.
//!
//! These are the platform-independent views of a Discord message that the
//! mirroring pipeline reads and rewrites. The Discord adapter fills them in.

/// Discord snowflake identifier.
pub type Snowflake = u64;

/// Zero-width space used wherever Discord refuses an empty string.
pub const ZERO_WIDTH_SPACE: &str = "\u{200B}";

/// Author of a message.
#[derive(Debug, Clone, Default)]
pub struct Author {
    /// Account handle.
    pub username: String,
    /// Global display name, falls back to the handle.
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bot: bool,
}

/// Guild membership context of the author.
#[derive(Debug, Clone, Default)]
pub struct Member {
    /// Nickname, or the author's display name when no nickname is set.
    pub display_name: String,
    pub role_names: Vec<String>,
}

/// Guild the message was posted in.
#[derive(Debug, Clone, Default)]
pub struct GuildContext {
    pub name: String,
}

/// Kind of a parent channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelKind {
    #[default]
    Text,
    Forum,
    Category,
    Other,
}

/// Tag defined on a forum channel.
#[derive(Debug, Clone)]
pub struct ForumTag {
    pub id: Snowflake,
    pub name: String,
}

/// Structural parent of the channel a message was posted in.
#[derive(Debug, Clone, Default)]
pub struct ParentChannel {
    pub id: Snowflake,
    pub kind: ChannelKind,
    /// Tag catalog, only populated for forums.
    pub available_tags: Vec<ForumTag>,
}

/// Channel a message was posted in.
#[derive(Debug, Clone, Default)]
pub struct ChannelContext {
    pub id: Snowflake,
    pub name: String,
    /// Forum tag ids applied to this thread.
    pub applied_tags: Vec<Snowflake>,
    pub parent: Option<ParentChannel>,
}

impl ChannelContext {
    /// Lower-cased, concatenated names of the forum tags applied to this thread.
    ///
    /// Returns `None` when the channel is not a post inside a forum.
    pub fn applied_tag_names(&self) -> Option<String> {
        let parent = self.parent.as_ref()?;
        if parent.kind != ChannelKind::Forum {
            return None;
        }

        Some(
            parent
                .available_tags
                .iter()
                .filter(|tag| self.applied_tags.contains(&tag.id))
                .map(|tag| tag.name.to_lowercase())
                .collect(),
        )
    }
}

/// Message-level flags relevant to mirroring.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFlags {
    /// Only visible to the observing client.
    pub ephemeral: bool,
    /// Already published to following channels.
    pub crossposted: bool,
    /// Generated by the platform (joins, pins, boosts...).
    pub system: bool,
}

/// File attached to a message.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: Option<String>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

/// Image or thumbnail of an embed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }
}

/// Rich embed attached to a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub author: Option<EmbedAuthor>,
    pub footer: Option<EmbedFooter>,
    pub image: Option<EmbedMedia>,
    pub thumbnail: Option<EmbedMedia>,
    /// 24-bit RGB value.
    pub color: Option<u32>,
    pub fields: Vec<EmbedField>,
    /// Name of the provider for platform-generated embeds (gif services, link previews).
    pub provider: Option<String>,
}

impl Embed {
    /// Color as `#RRGGBB`, black when unset.
    pub fn hex_color(&self) -> String {
        format!("#{:06X}", self.color.unwrap_or(0) & 0xFF_FFFF)
    }

    /// Text searched by message filters.
    pub fn searchable_text(&self) -> String {
        let fields: String = self
            .fields
            .iter()
            .map(|field| format!("{}{}", field.name, field.value))
            .collect();

        [
            self.title.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
            fields.as_str(),
            self.footer.as_ref().map(|f| f.text.as_str()).unwrap_or_default(),
            self.author.as_ref().map(|a| a.name.as_str()).unwrap_or_default(),
        ]
        .concat()
        .to_lowercase()
    }
}

/// A message observed on a source channel.
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub id: Snowflake,
    pub content: String,
    pub embeds: Vec<Embed>,
    pub attachments: Vec<Attachment>,
    pub author: Author,
    /// Id of the message this one replies to.
    pub reference: Option<Snowflake>,
    pub member: Option<Member>,
    pub guild: Option<GuildContext>,
    pub channel: ChannelContext,
    pub flags: MessageFlags,
}

impl Message {
    /// Content length in characters.
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// No text, no embeds and no attachments.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.embeds.is_empty() && self.attachments.is_empty()
    }

    pub fn contains_only_attachments(&self) -> bool {
        !self.attachments.is_empty() && self.content.is_empty() && self.embeds.is_empty()
    }

    /// A lone provider embed, which is how Discord renders gif links.
    pub fn is_gif(&self) -> bool {
        self.embeds.len() == 1 && self.embeds[0].provider.is_some()
    }

    pub fn is_direct(&self) -> bool {
        self.guild.is_none()
    }

    pub fn parent_channel_id(&self) -> Option<Snowflake> {
        self.channel.parent.as_ref().map(|parent| parent.id)
    }
}
