//! Outbound payloads built from a mirrored message.

use crate::common::types::{Attachment, Embed, Message, ZERO_WIDTH_SPACE};

/// Longest content a webhook accepts, in characters.
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// One webhook execution.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub attachments: Vec<Attachment>,
    /// Overrides the webhook's name.
    pub username: Option<String>,
    /// Overrides the webhook's avatar.
    pub avatar_url: Option<String>,
}

/// Split content into chunks of at most `max_chars` characters.
///
/// Cuts at fixed character offsets, ignoring words and lines.
pub fn split_content(content: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in content.char_indices() {
        if count == max_chars {
            chunks.push(&content[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < content.len() {
        chunks.push(&content[start..]);
    }

    chunks
}

/// Replace empty field names and values, which webhooks reject.
pub fn sanitize_embeds(embeds: &mut [Embed]) {
    for field in embeds.iter_mut().flat_map(|embed| embed.fields.iter_mut()) {
        if field.name.is_empty() {
            field.name = ZERO_WIDTH_SPACE.to_string();
        }
        if field.value.is_empty() {
            field.value = ZERO_WIDTH_SPACE.to_string();
        }
    }
}

/// Build the payloads for a message.
///
/// The first payload carries the attachments and embeds; any further ones only
/// carry overflow text. With `use_webhook_profile` the author override is left
/// out so the webhook keeps its own name and avatar.
pub fn build_payloads(message: &Message, use_webhook_profile: bool) -> Vec<Payload> {
    let (username, avatar_url) = if use_webhook_profile {
        (None, None)
    } else {
        (
            Some(message.author.display_name.clone()),
            message.author.avatar_url.clone(),
        )
    };

    let chunks = split_content(&message.content, MAX_CONTENT_LENGTH);
    let mut embeds = message.embeds.clone();
    sanitize_embeds(&mut embeds);

    let mut payloads = vec![Payload {
        content: chunks.first().map(|chunk| chunk.to_string()),
        embeds,
        attachments: message.attachments.clone(),
        username: username.clone(),
        avatar_url: avatar_url.clone(),
    }];

    payloads.extend(chunks.iter().skip(1).map(|chunk| Payload {
        content: Some(chunk.to_string()),
        username: username.clone(),
        avatar_url: avatar_url.clone(),
        ..Default::default()
    }));

    payloads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Author, EmbedField};

    fn message(content: &str) -> Message {
        Message {
            content: content.to_string(),
            author: Author {
                username: "alice".to_string(),
                display_name: "Alice".to_string(),
                avatar_url: Some("https://cdn/avatar.png".to_string()),
                bot: false,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_split_content_fixed_boundaries() {
        let content = "a".repeat(4001);
        let chunks = split_content(&content, MAX_CONTENT_LENGTH);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 2000);
        assert_eq!(chunks[1].len(), 2000);
        assert_eq!(chunks[2].len(), 1);
    }

    #[test]
    fn test_split_content_exact_multiple() {
        let content = "b".repeat(4000);
        assert_eq!(split_content(&content, MAX_CONTENT_LENGTH).len(), 2);
        assert!(split_content("", MAX_CONTENT_LENGTH).is_empty());
    }

    #[test]
    fn test_split_content_ignores_words_and_counts_chars() {
        assert_eq!(split_content("hello world", 4), vec!["hell", "o wo", "rld"]);
        // Multi-byte characters count once each
        assert_eq!(split_content("ééééé", 2), vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_4001_chars_make_three_payloads() {
        let content: String = (0..4001).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let payloads = build_payloads(&message(&content), false);

        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[0].content.as_deref(), Some(&content[0..2000]));
        assert_eq!(payloads[1].content.as_deref(), Some(&content[2000..4000]));
        assert_eq!(payloads[2].content.as_deref(), Some(&content[4000..4001]));
    }

    #[test]
    fn test_only_first_payload_carries_embeds_and_files() {
        let mut msg = message(&"x".repeat(2500));
        msg.embeds.push(Embed::default());
        msg.attachments.push(Attachment {
            filename: "f.txt".to_string(),
            url: "https://cdn/f.txt".to_string(),
        });

        let payloads = build_payloads(&msg, false);
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].embeds.len(), 1);
        assert_eq!(payloads[0].attachments.len(), 1);
        assert!(payloads[1].embeds.is_empty());
        assert!(payloads[1].attachments.is_empty());
    }

    #[test]
    fn test_empty_content_still_builds_one_payload() {
        let mut msg = message("");
        msg.embeds.push(Embed::default());

        let payloads = build_payloads(&msg, false);
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].content.is_none());
    }

    #[test]
    fn test_author_override() {
        let msg = message(&"y".repeat(2001));

        let payloads = build_payloads(&msg, false);
        assert!(payloads.iter().all(|p| p.username.as_deref() == Some("Alice")));
        assert!(payloads
            .iter()
            .all(|p| p.avatar_url.as_deref() == Some("https://cdn/avatar.png")));

        let payloads = build_payloads(&msg, true);
        assert!(payloads.iter().all(|p| p.username.is_none() && p.avatar_url.is_none()));
    }

    #[test]
    fn test_sanitize_embeds_is_idempotent() {
        let mut embeds = vec![Embed {
            fields: vec![EmbedField::new("", ""), EmbedField::new("name", "value")],
            ..Default::default()
        }];

        sanitize_embeds(&mut embeds);
        assert_eq!(embeds[0].fields[0], EmbedField::new(ZERO_WIDTH_SPACE, ZERO_WIDTH_SPACE));
        assert_eq!(embeds[0].fields[1], EmbedField::new("name", "value"));

        let once = embeds.clone();
        sanitize_embeds(&mut embeds);
        assert_eq!(embeds, once);
    }

    #[test]
    fn test_build_payloads_sanitizes_without_touching_message() {
        let mut msg = message("hi");
        msg.embeds.push(Embed {
            fields: vec![EmbedField::new("", "v")],
            ..Default::default()
        });

        let payloads = build_payloads(&msg, false);
        assert_eq!(payloads[0].embeds[0].fields[0].name, ZERO_WIDTH_SPACE);
        assert_eq!(msg.embeds[0].fields[0].name, "");
    }
}
