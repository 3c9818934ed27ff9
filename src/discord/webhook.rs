//! Webhook delivery of mirrored payloads.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serenity::builder::{
    CreateAttachment, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, ExecuteWebhook,
};
use serenity::http::Http;
use serenity::model::webhook::Webhook;
use tracing::{error, info};

use crate::common::error::DispatchError;
use crate::common::types::Embed;
use crate::mirror::payload::Payload;
use crate::mirror::sink::{Sink, SinkTransport};

/// Executes payloads through webhooks resolved once at startup.
pub struct WebhookTransport {
    http: Arc<Http>,
    webhooks: HashMap<String, Webhook>,
}

impl WebhookTransport {
    /// Resolve every webhook URL concurrently.
    ///
    /// Webhooks that fail to resolve are logged; sends to them fail later
    /// with `DispatchError::UnknownSink`.
    pub async fn resolve(http: Arc<Http>, urls: impl IntoIterator<Item = String>) -> Self {
        let mut urls: Vec<String> = urls.into_iter().collect();
        urls.sort();
        urls.dedup();

        let results = join_all(urls.iter().map(|url| Webhook::from_url(&*http, url))).await;

        let mut webhooks = HashMap::new();
        for (url, result) in urls.into_iter().zip(results) {
            match result {
                Ok(webhook) => {
                    webhooks.insert(url, webhook);
                }
                Err(e) => error!(sink = %Sink::new(url), "Failed to resolve webhook: {}", e),
            }
        }
        info!("Resolved {} webhook(s)", webhooks.len());

        Self { http, webhooks }
    }

    async fn build_message(&self, payload: Payload) -> Result<ExecuteWebhook, DispatchError> {
        let mut builder = ExecuteWebhook::new()
            .embeds(payload.embeds.iter().map(build_embed).collect());

        if let Some(content) = payload.content {
            builder = builder.content(content);
        }
        if let Some(username) = payload.username {
            builder = builder.username(username);
        }
        if let Some(avatar_url) = payload.avatar_url {
            builder = builder.avatar_url(avatar_url);
        }

        for attachment in &payload.attachments {
            let file = CreateAttachment::url(&self.http, &attachment.url)
                .await
                .map_err(|source| DispatchError::Attachment {
                    filename: attachment.filename.clone(),
                    source,
                })?;
            builder = builder.add_file(file);
        }

        Ok(builder)
    }
}

#[async_trait]
impl SinkTransport for WebhookTransport {
    async fn send(&self, sink: &Sink, payload: Payload) -> Result<(), DispatchError> {
        let webhook = self
            .webhooks
            .get(sink.url())
            .ok_or_else(|| DispatchError::UnknownSink {
                url: sink.to_string(),
            })?;

        let message = self.build_message(payload).await?;
        webhook.execute(&*self.http, false, message).await?;
        Ok(())
    }
}

/// Build the outgoing embed, leaving out empty facets.
pub fn build_embed(embed: &Embed) -> CreateEmbed {
    let mut create = CreateEmbed::new();

    if let Some(title) = embed.title.as_deref().filter(|t| !t.is_empty()) {
        create = create.title(title);
    }
    if let Some(description) = embed.description.as_deref().filter(|d| !d.is_empty()) {
        create = create.description(description);
    }
    if let Some(url) = &embed.url {
        create = create.url(url);
    }
    if let Some(color) = embed.color {
        create = create.colour(color);
    }
    if let Some(author) = &embed.author {
        let mut create_author = CreateEmbedAuthor::new(&author.name);
        if let Some(url) = &author.url {
            create_author = create_author.url(url);
        }
        if let Some(icon_url) = &author.icon_url {
            create_author = create_author.icon_url(icon_url);
        }
        create = create.author(create_author);
    }
    if let Some(footer) = &embed.footer {
        let mut create_footer = CreateEmbedFooter::new(&footer.text);
        if let Some(icon_url) = &footer.icon_url {
            create_footer = create_footer.icon_url(icon_url);
        }
        create = create.footer(create_footer);
    }
    if let Some(image) = &embed.image {
        create = create.image(&image.url);
    }
    if let Some(thumbnail) = &embed.thumbnail {
        create = create.thumbnail(&thumbnail.url);
    }

    create.fields(
        embed
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone(), field.inline)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{EmbedAuthor, EmbedField, EmbedFooter, EmbedMedia};

    #[test]
    fn test_build_embed() {
        let embed = Embed {
            title: Some("Patch notes".to_string()),
            description: Some(String::new()),
            url: Some("https://example.com".to_string()),
            color: Some(0x112233),
            author: Some(EmbedAuthor {
                name: "Dev".to_string(),
                url: None,
                icon_url: Some("https://cdn/dev.png".to_string()),
            }),
            footer: Some(EmbedFooter {
                text: "v1.2".to_string(),
                icon_url: None,
            }),
            thumbnail: Some(EmbedMedia {
                url: "https://cdn/thumb.png".to_string(),
            }),
            fields: vec![EmbedField::new("Fixes", "Many")],
            ..Default::default()
        };

        let json = serde_json::to_value(build_embed(&embed)).unwrap();
        assert_eq!(json["title"], "Patch notes");
        assert_eq!(json["url"], "https://example.com");
        assert_eq!(json["color"], 0x112233);
        assert_eq!(json["author"]["name"], "Dev");
        assert_eq!(json["author"]["icon_url"], "https://cdn/dev.png");
        assert_eq!(json["footer"]["text"], "v1.2");
        assert_eq!(json["thumbnail"]["url"], "https://cdn/thumb.png");
        assert_eq!(json["fields"][0]["name"], "Fixes");
        assert_eq!(json["fields"][0]["value"], "Many");
        assert!(json["description"].is_null());
        assert!(json["image"].is_null());
    }

    #[test]
    fn test_build_empty_embed() {
        let json = serde_json::to_value(build_embed(&Embed::default())).unwrap();
        assert!(json["title"].is_null());
        assert!(json["color"].is_null());
        assert!(json["author"].is_null());
    }
}
