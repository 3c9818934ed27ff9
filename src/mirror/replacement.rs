//! Text and color substitutions applied to mirrored messages.
//!
//! Replacements run in the order they are configured, each one seeing the
//! result of the previous. A replacement targets one facet of the message or
//! every facet at once.

use std::str::FromStr;

use tracing::trace;

use crate::common::error::{ConfigError, ConfigResult, TransformError, TransformResult};
use crate::common::types::{Embed, Message};
use crate::config::types::ReplacementConfig;

use super::matcher::{
    hex_colors_are_equal, is_valid_hex_color, parse_hex_color, TextPattern,
    DEFAULT_COLOR_TOLERANCE,
};

/// Facet of a message a replacement rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementLocation {
    Everywhere,
    MessageContent,
    EmbedAuthor,
    EmbedAuthorUrl,
    EmbedAuthorIconUrl,
    EmbedTitle,
    EmbedDescription,
    EmbedUrl,
    EmbedFieldName,
    EmbedFieldValue,
    EmbedImageUrl,
    EmbedThumbnailUrl,
    EmbedFooter,
    EmbedFooterIconUrl,
    EmbedColor,
}

impl FromStr for ReplacementLocation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let location = match s {
            "everywhere" => Self::Everywhere,
            "message_content" => Self::MessageContent,
            "embed_author" => Self::EmbedAuthor,
            "embed_author_url" => Self::EmbedAuthorUrl,
            "embed_author_icon_url" => Self::EmbedAuthorIconUrl,
            "embed_title" => Self::EmbedTitle,
            "embed_description" => Self::EmbedDescription,
            "embed_url" => Self::EmbedUrl,
            "embed_field_name" => Self::EmbedFieldName,
            "embed_field_value" => Self::EmbedFieldValue,
            "embed_image_url" => Self::EmbedImageUrl,
            "embed_thumbnail_url" => Self::EmbedThumbnailUrl,
            "embed_footer" => Self::EmbedFooter,
            "embed_footer_icon_url" => Self::EmbedFooterIconUrl,
            "embed_color" => Self::EmbedColor,
            _ => {
                return Err(ConfigError::InvalidReplacementLocation {
                    value: s.to_string(),
                })
            }
        };
        Ok(location)
    }
}

/// A single substitution rule.
#[derive(Debug, Clone)]
pub struct Replacement {
    pattern: TextPattern,
    with: String,
    location: ReplacementLocation,
}

impl Replacement {
    /// Build a replacement, validating colors eagerly for `EmbedColor`.
    pub fn new(replace: &str, with: &str, location: ReplacementLocation) -> ConfigResult<Self> {
        let pattern = TextPattern::new(replace)?;

        if location == ReplacementLocation::EmbedColor {
            if !pattern.is_wildcard() && !is_valid_hex_color(replace) {
                return Err(ConfigError::InvalidColor {
                    value: replace.to_string(),
                });
            }
            if !is_valid_hex_color(with) {
                return Err(ConfigError::InvalidColor {
                    value: with.to_string(),
                });
            }
        }

        Ok(Self {
            pattern,
            with: with.to_string(),
            location,
        })
    }

    pub fn from_config(config: &ReplacementConfig) -> ConfigResult<Self> {
        let location = match config.location.as_deref() {
            Some(location) => location.parse()?,
            None => ReplacementLocation::Everywhere,
        };
        Self::new(&config.replace, &config.with, location)
    }

    pub fn apply(&self, message: &mut Message) -> TransformResult<()> {
        trace!(pattern = self.pattern.source(), location = ?self.location, "Applying replacement");
        self.apply_at(self.location, message)
    }

    fn apply_at(
        &self,
        location: ReplacementLocation,
        message: &mut Message,
    ) -> TransformResult<()> {
        match location {
            ReplacementLocation::Everywhere => self.replace_everywhere(message),
            ReplacementLocation::MessageContent => self.replace_content(message),
            ReplacementLocation::EmbedAuthor => self.for_each_embed(message, |r, e| {
                match e.author.as_mut() {
                    Some(author) => r.replace_present(&mut author.name),
                    None => Ok(()),
                }
            }),
            ReplacementLocation::EmbedAuthorUrl => self.for_each_embed(message, |r, e| {
                match e.author.as_mut() {
                    Some(author) => r.replace_optional(&mut author.url),
                    None => Ok(()),
                }
            }),
            ReplacementLocation::EmbedAuthorIconUrl => self.for_each_embed(message, |r, e| {
                match e.author.as_mut() {
                    Some(author) => r.replace_optional(&mut author.icon_url),
                    None => Ok(()),
                }
            }),
            ReplacementLocation::EmbedTitle => {
                self.for_each_embed(message, |r, e| r.replace_optional(&mut e.title))
            }
            ReplacementLocation::EmbedDescription => {
                self.for_each_embed(message, |r, e| r.replace_optional(&mut e.description))
            }
            ReplacementLocation::EmbedUrl => {
                self.for_each_embed(message, |r, e| r.replace_optional(&mut e.url))
            }
            ReplacementLocation::EmbedFieldName => self.for_each_embed(message, |r, e| {
                for field in &mut e.fields {
                    field.name = r.pattern.replace_all(&field.name, &r.with)?;
                }
                Ok(())
            }),
            ReplacementLocation::EmbedFieldValue => self.for_each_embed(message, |r, e| {
                for field in &mut e.fields {
                    field.value = r.pattern.replace_all(&field.value, &r.with)?;
                }
                Ok(())
            }),
            ReplacementLocation::EmbedImageUrl => self.for_each_embed(message, |r, e| {
                match e.image.as_mut() {
                    Some(image) => r.replace_present(&mut image.url),
                    None => Ok(()),
                }
            }),
            ReplacementLocation::EmbedThumbnailUrl => self.for_each_embed(message, |r, e| {
                match e.thumbnail.as_mut() {
                    Some(thumbnail) => r.replace_present(&mut thumbnail.url),
                    None => Ok(()),
                }
            }),
            ReplacementLocation::EmbedFooter => self.for_each_embed(message, |r, e| {
                match e.footer.as_mut() {
                    Some(footer) => r.replace_present(&mut footer.text),
                    None => Ok(()),
                }
            }),
            ReplacementLocation::EmbedFooterIconUrl => self.for_each_embed(message, |r, e| {
                match e.footer.as_mut() {
                    Some(footer) => r.replace_optional(&mut footer.icon_url),
                    None => Ok(()),
                }
            }),
            ReplacementLocation::EmbedColor => self.replace_color(message),
        }
    }

    /// Every text facet in a fixed order, then color if the pattern is a color.
    fn replace_everywhere(&self, message: &mut Message) -> TransformResult<()> {
        const TEXT_FACETS: [ReplacementLocation; 13] = [
            ReplacementLocation::MessageContent,
            ReplacementLocation::EmbedTitle,
            ReplacementLocation::EmbedAuthor,
            ReplacementLocation::EmbedAuthorUrl,
            ReplacementLocation::EmbedAuthorIconUrl,
            ReplacementLocation::EmbedDescription,
            ReplacementLocation::EmbedFieldName,
            ReplacementLocation::EmbedFieldValue,
            ReplacementLocation::EmbedImageUrl,
            ReplacementLocation::EmbedThumbnailUrl,
            ReplacementLocation::EmbedFooter,
            ReplacementLocation::EmbedFooterIconUrl,
            ReplacementLocation::EmbedUrl,
        ];

        for location in TEXT_FACETS {
            self.apply_at(location, message)?;
        }

        self.try_replace_color(message)
    }

    fn replace_content(&self, message: &mut Message) -> TransformResult<()> {
        message.content = self.pattern.replace_all(&message.content, &self.with)?;
        Ok(())
    }

    fn for_each_embed<F>(&self, message: &mut Message, mut replace: F) -> TransformResult<()>
    where
        F: FnMut(&Self, &mut Embed) -> TransformResult<()>,
    {
        for embed in &mut message.embeds {
            replace(self, embed)?;
        }
        Ok(())
    }

    /// Rewrite a value only when it holds text.
    fn replace_present(&self, value: &mut String) -> TransformResult<()> {
        if !value.is_empty() {
            *value = self.pattern.replace_all(value, &self.with)?;
        }
        Ok(())
    }

    fn replace_optional(&self, value: &mut Option<String>) -> TransformResult<()> {
        match value.as_mut() {
            Some(text) => self.replace_present(text),
            None => Ok(()),
        }
    }

    /// Color pass of `everywhere`: skipped unless the pattern itself is a color.
    fn try_replace_color(&self, message: &mut Message) -> TransformResult<()> {
        if !is_valid_hex_color(self.pattern.source()) {
            return Ok(());
        }
        self.replace_color(message)
    }

    fn replace_color(&self, message: &mut Message) -> TransformResult<()> {
        let color = parse_hex_color(&self.with).ok_or_else(|| TransformError::InvalidColor {
            value: self.with.clone(),
        })?;

        for embed in &mut message.embeds {
            if self.pattern.is_wildcard()
                || hex_colors_are_equal(
                    &embed.hex_color(),
                    self.pattern.source(),
                    DEFAULT_COLOR_TOLERANCE,
                )
            {
                embed.color = Some(color);
            }
        }
        Ok(())
    }
}

/// All replacements configured on a mirror, in order.
#[derive(Debug, Clone, Default)]
pub struct MirrorReplacements {
    replacements: Vec<Replacement>,
}

impl MirrorReplacements {
    pub fn new(replacements: Vec<Replacement>) -> Self {
        Self { replacements }
    }

    pub fn from_config(configs: &[ReplacementConfig]) -> ConfigResult<Self> {
        let replacements = configs
            .iter()
            .map(Replacement::from_config)
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self::new(replacements))
    }

    /// Apply every replacement. Stops at the first failure, keeping earlier edits.
    pub fn apply(&self, message: &mut Message) -> TransformResult<()> {
        for replacement in &self.replacements {
            replacement.apply(message)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }
}
