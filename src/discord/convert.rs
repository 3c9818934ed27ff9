//! Conversion from serenity models into mirror messages.
//!
//! Everything a mirror looks at is resolved here, including the parent channel
//! and the author's role names, so the pipeline itself never touches Discord.

use serenity::model::channel::{
    Channel, ChannelType, Embed as DiscordEmbed, GuildChannel, Message as DiscordMessage,
    MessageFlags as DiscordMessageFlags, MessageType,
};
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use tracing::warn;

use crate::common::types::{
    Attachment, Author, ChannelContext, ChannelKind, Embed, EmbedAuthor, EmbedField, EmbedFooter,
    EmbedMedia, ForumTag, GuildContext, Member, Message, MessageFlags, ParentChannel,
};

/// Build a mirror message from a gateway message.
pub async fn convert_message(ctx: &Context, message: &DiscordMessage) -> Message {
    let guild = message.guild_id.map(|guild_id| GuildContext {
        name: guild_id.name(&ctx.cache).unwrap_or_default(),
    });

    Message {
        id: message.id.get(),
        content: message.content.clone(),
        embeds: message.embeds.iter().map(convert_embed).collect(),
        attachments: message
            .attachments
            .iter()
            .map(|attachment| Attachment {
                filename: attachment.filename.clone(),
                url: attachment.url.clone(),
            })
            .collect(),
        author: Author {
            username: message.author.name.clone(),
            display_name: message
                .author
                .global_name
                .clone()
                .unwrap_or_else(|| message.author.name.clone()),
            avatar_url: Some(message.author.face()),
            bot: message.author.bot,
        },
        reference: message.message_reference.as_ref().map(|reference| {
            reference
                .message_id
                .map(|id| id.get())
                .unwrap_or_else(|| reference.channel_id.get())
        }),
        member: resolve_member(ctx, message),
        guild,
        channel: resolve_channel(ctx, message.channel_id).await,
        flags: convert_flags(message.kind, message.flags),
    }
}

fn resolve_member(ctx: &Context, message: &DiscordMessage) -> Option<Member> {
    let member = message.member.as_ref()?;
    let guild_id = message.guild_id?;

    let display_name = member
        .nick
        .clone()
        .or_else(|| message.author.global_name.clone())
        .unwrap_or_else(|| message.author.name.clone());

    // The cache guard must not be held across an await
    let role_names = match ctx.cache.guild(guild_id) {
        Some(guild) => member
            .roles
            .iter()
            .filter_map(|role_id| guild.roles.get(role_id).map(|role| role.name.clone()))
            .collect(),
        None => Vec::new(),
    };

    Some(Member {
        display_name,
        role_names,
    })
}

async fn resolve_channel(ctx: &Context, channel_id: ChannelId) -> ChannelContext {
    let mut context = ChannelContext {
        id: channel_id.get(),
        ..Default::default()
    };

    let channel = match fetch_guild_channel(ctx, channel_id).await {
        Some(channel) => channel,
        None => return context,
    };
    context.name = channel.name.clone();
    context.applied_tags = channel.applied_tags.iter().map(|tag| tag.get()).collect();

    if let Some(parent_id) = channel.parent_id {
        context.parent = Some(match fetch_guild_channel(ctx, parent_id).await {
            Some(parent) => ParentChannel {
                id: parent_id.get(),
                kind: channel_kind(parent.kind),
                available_tags: parent
                    .available_tags
                    .iter()
                    .map(|tag| ForumTag {
                        id: tag.id.get(),
                        name: tag.name.clone(),
                    })
                    .collect(),
            },
            None => ParentChannel {
                id: parent_id.get(),
                kind: ChannelKind::Other,
                available_tags: Vec::new(),
            },
        });
    }

    context
}

async fn fetch_guild_channel(ctx: &Context, channel_id: ChannelId) -> Option<GuildChannel> {
    match channel_id.to_channel(ctx).await {
        Ok(Channel::Guild(channel)) => Some(channel),
        Ok(_) => None,
        Err(e) => {
            warn!(channel_id = channel_id.get(), "Failed to resolve channel: {}", e);
            None
        }
    }
}

pub fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text | ChannelType::News => ChannelKind::Text,
        ChannelType::Forum => ChannelKind::Forum,
        ChannelType::Category => ChannelKind::Category,
        _ => ChannelKind::Other,
    }
}

/// Anything but plain messages, replies and command invocations is a system message.
pub fn is_system_message(kind: MessageType) -> bool {
    !matches!(
        kind,
        MessageType::Regular
            | MessageType::InlineReply
            | MessageType::ChatInputCommand
            | MessageType::ContextMenuCommand
    )
}

pub fn convert_flags(kind: MessageType, flags: Option<DiscordMessageFlags>) -> MessageFlags {
    let has = |flag: DiscordMessageFlags| flags.is_some_and(|flags| flags.contains(flag));
    MessageFlags {
        ephemeral: has(DiscordMessageFlags::EPHEMERAL),
        crossposted: has(DiscordMessageFlags::CROSSPOSTED),
        system: is_system_message(kind),
    }
}

pub fn convert_embed(embed: &DiscordEmbed) -> Embed {
    Embed {
        title: embed.title.clone(),
        description: embed.description.clone(),
        url: embed.url.clone(),
        author: embed.author.as_ref().map(|author| EmbedAuthor {
            name: author.name.clone(),
            url: author.url.clone(),
            icon_url: author.icon_url.clone(),
        }),
        footer: embed.footer.as_ref().map(|footer| EmbedFooter {
            text: footer.text.clone(),
            icon_url: footer.icon_url.clone(),
        }),
        image: embed.image.as_ref().map(|image| EmbedMedia {
            url: image.url.clone(),
        }),
        thumbnail: embed.thumbnail.as_ref().map(|thumbnail| EmbedMedia {
            url: thumbnail.url.clone(),
        }),
        color: embed.colour.map(|colour| colour.0),
        fields: embed
            .fields
            .iter()
            .map(|field| EmbedField {
                name: field.name.clone(),
                value: field.value.clone(),
                inline: field.inline,
            })
            .collect(),
        provider: embed
            .provider
            .as_ref()
            .map(|provider| provider.name.clone().unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_embed() {
        let embed: DiscordEmbed = serde_json::from_value(json!({
            "type": "rich",
            "title": "Patch notes",
            "description": "Changes",
            "url": "https://example.com/notes",
            "color": 0x3463D9,
            "author": { "name": "Dev", "icon_url": "https://cdn/dev.png" },
            "footer": { "text": "v1.2" },
            "image": { "url": "https://cdn/banner.png" },
            "fields": [{ "name": "Fixes", "value": "Many", "inline": true }]
        }))
        .unwrap();

        let converted = convert_embed(&embed);
        assert_eq!(converted.title.as_deref(), Some("Patch notes"));
        assert_eq!(converted.description.as_deref(), Some("Changes"));
        assert_eq!(converted.url.as_deref(), Some("https://example.com/notes"));
        assert_eq!(converted.color, Some(0x3463D9));
        assert_eq!(converted.hex_color(), "#3463D9");
        assert_eq!(converted.author.as_ref().unwrap().name, "Dev");
        assert_eq!(
            converted.author.as_ref().unwrap().icon_url.as_deref(),
            Some("https://cdn/dev.png")
        );
        assert_eq!(converted.footer.as_ref().unwrap().text, "v1.2");
        assert_eq!(converted.image.as_ref().unwrap().url, "https://cdn/banner.png");
        assert!(converted.thumbnail.is_none());
        assert_eq!(converted.fields, vec![EmbedField {
            name: "Fixes".to_string(),
            value: "Many".to_string(),
            inline: true,
        }]);
        assert!(converted.provider.is_none());
    }

    #[test]
    fn test_convert_gif_embed_keeps_provider() {
        let embed: DiscordEmbed = serde_json::from_value(json!({
            "type": "gifv",
            "url": "https://tenor.com/view/cat",
            "provider": { "name": "Tenor", "url": "https://tenor.co" }
        }))
        .unwrap();

        let converted = convert_embed(&embed);
        assert_eq!(converted.provider.as_deref(), Some("Tenor"));
        assert!(converted.title.is_none());
        assert!(converted.description.is_none());
        assert!(converted.color.is_none());
    }

    #[test]
    fn test_system_message_types() {
        assert!(!is_system_message(MessageType::Regular));
        assert!(!is_system_message(MessageType::InlineReply));
        assert!(!is_system_message(MessageType::ChatInputCommand));
        assert!(!is_system_message(MessageType::ContextMenuCommand));
        assert!(is_system_message(MessageType::MemberJoin));
        assert!(is_system_message(MessageType::PinsAdd));
        assert!(is_system_message(MessageType::ThreadCreated));
    }

    #[test]
    fn test_convert_flags() {
        let flags = convert_flags(MessageType::Regular, None);
        assert!(!flags.ephemeral && !flags.crossposted && !flags.system);

        let flags = convert_flags(
            MessageType::Regular,
            Some(DiscordMessageFlags::EPHEMERAL | DiscordMessageFlags::CROSSPOSTED),
        );
        assert!(flags.ephemeral);
        assert!(flags.crossposted);

        assert!(convert_flags(MessageType::MemberJoin, None).system);
    }

    #[test]
    fn test_channel_kind() {
        assert_eq!(channel_kind(ChannelType::Text), ChannelKind::Text);
        assert_eq!(channel_kind(ChannelType::News), ChannelKind::Text);
        assert_eq!(channel_kind(ChannelType::Forum), ChannelKind::Forum);
        assert_eq!(channel_kind(ChannelType::Category), ChannelKind::Category);
        assert_eq!(channel_kind(ChannelType::Voice), ChannelKind::Other);
    }
}
