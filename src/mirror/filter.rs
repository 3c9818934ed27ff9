//! Keyword filters deciding whether a message is mirrored.
//!
//! A mirror passes a message when it has no filters, or when any one of its
//! filters matches. Each filter looks at a single facet of the message.

use std::str::FromStr;

use crate::common::error::{ConfigError, ConfigResult};
use crate::common::types::Message;
use crate::config::types::FilterConfig;

use super::matcher::{string_matches, FilterType};

/// Facet of a message a filter inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterLocation {
    Message,
    PostTag,
    Username,
    GuildNickname,
    UserRoles,
}

impl FromStr for FilterLocation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(Self::Message),
            "post_tag" => Ok(Self::PostTag),
            "username" => Ok(Self::Username),
            "guild_nickname" => Ok(Self::GuildNickname),
            "user_roles" => Ok(Self::UserRoles),
            _ => Err(ConfigError::InvalidFilterLocation {
                value: s.to_string(),
            }),
        }
    }
}

/// A single keyword filter.
#[derive(Debug, Clone)]
pub struct Filter {
    kind: FilterType,
    location: FilterLocation,
    /// Lower-cased keywords.
    keywords: Vec<String>,
}

impl Filter {
    pub fn new(kind: FilterType, location: FilterLocation, keywords: &[String]) -> Self {
        Self {
            kind,
            location,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &FilterConfig) -> ConfigResult<Self> {
        let kind = config.kind.parse()?;
        let location = config.location.parse()?;
        Ok(Self::new(kind, location, &config.keywords))
    }

    pub fn matches(&self, message: &Message) -> bool {
        match self.location {
            FilterLocation::Message => self.message_matches(message),
            FilterLocation::PostTag => self.post_tag_matches(message),
            FilterLocation::Username => self.text_matches(&message.author.username),
            FilterLocation::GuildNickname => message
                .member
                .as_ref()
                .is_some_and(|member| self.text_matches(&member.display_name)),
            FilterLocation::UserRoles => message
                .member
                .as_ref()
                .is_some_and(|member| self.text_matches(&member.role_names.concat())),
        }
    }

    /// Body text, or every embed when there is at least one.
    fn message_matches(&self, message: &Message) -> bool {
        self.text_matches(&message.content)
            || (!message.embeds.is_empty()
                && message
                    .embeds
                    .iter()
                    .all(|embed| self.text_matches(&embed.searchable_text())))
    }

    /// Messages outside forum posts are never filtered by tag.
    fn post_tag_matches(&self, message: &Message) -> bool {
        match message.channel.applied_tag_names() {
            Some(tags) => self.text_matches(&tags),
            None => true,
        }
    }

    fn text_matches(&self, content: &str) -> bool {
        string_matches(content, &self.keywords, self.kind)
    }
}

/// All filters configured on a mirror.
#[derive(Debug, Clone, Default)]
pub struct MirrorFilters {
    filters: Vec<Filter>,
}

impl MirrorFilters {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    pub fn from_config(configs: &[FilterConfig]) -> ConfigResult<Self> {
        let filters = configs
            .iter()
            .map(Filter::from_config)
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self::new(filters))
    }

    /// True when no filter is configured or any filter matches.
    pub fn matches(&self, message: &Message) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|filter| filter.matches(message))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{
        ChannelContext, ChannelKind, Embed, EmbedField, ForumTag, Member, ParentChannel,
    };

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn text_message(content: &str) -> Message {
        Message {
            content: content.to_string(),
            ..Default::default()
        }
    }

    fn embed_with_title(title: &str) -> Embed {
        Embed {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_filters_always_pass() {
        let filters = MirrorFilters::default();
        assert!(filters.matches(&text_message("anything")));
        assert!(filters.matches(&Message::default()));
    }

    #[test]
    fn test_whitelist_message() {
        let filter = Filter::new(
            FilterType::Whitelist,
            FilterLocation::Message,
            &words(&["A", "b"]),
        );
        assert!(filter.matches(&text_message("xaz")));
        assert!(!filter.matches(&text_message("xyz")));
    }

    #[test]
    fn test_blacklist_message() {
        let filter = Filter::new(FilterType::Blacklist, FilterLocation::Message, &words(&["a"]));
        assert!(filter.matches(&text_message("xyz")));
        assert!(!filter.matches(&text_message("xaz")));
    }

    #[test]
    fn test_message_filter_requires_every_embed() {
        let filter = Filter::new(
            FilterType::Whitelist,
            FilterLocation::Message,
            &words(&["alert"]),
        );

        let mut message = text_message("nothing here");
        message.embeds = vec![embed_with_title("ALERT one"), embed_with_title("alert two")];
        assert!(filter.matches(&message));

        message.embeds.push(embed_with_title("quiet"));
        assert!(!filter.matches(&message));

        // Body text still wins on its own
        message.content = "alert in body".to_string();
        assert!(filter.matches(&message));
    }

    #[test]
    fn test_message_filter_searches_embed_fields() {
        let filter = Filter::new(
            FilterType::Whitelist,
            FilterLocation::Message,
            &words(&["price"]),
        );
        let mut message = Message::default();
        message.embeds.push(Embed {
            fields: vec![EmbedField::new("Price", "10")],
            ..Default::default()
        });
        assert!(filter.matches(&message));
    }

    #[test]
    fn test_blacklist_with_no_embeds_falls_back_to_body() {
        let filter = Filter::new(FilterType::Blacklist, FilterLocation::Message, &words(&["spam"]));
        assert!(!filter.matches(&text_message("spam spam")));
    }

    fn forum_message(applied: Vec<u64>, kind: ChannelKind) -> Message {
        Message {
            channel: ChannelContext {
                id: 50,
                name: "thread".to_string(),
                applied_tags: applied,
                parent: Some(ParentChannel {
                    id: 5,
                    kind,
                    available_tags: vec![
                        ForumTag { id: 1, name: "Release".to_string() },
                        ForumTag { id: 2, name: "Rumor".to_string() },
                    ],
                }),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_post_tag_filter() {
        let filter = Filter::new(
            FilterType::Whitelist,
            FilterLocation::PostTag,
            &words(&["release"]),
        );
        assert!(filter.matches(&forum_message(vec![1], ChannelKind::Forum)));
        assert!(!filter.matches(&forum_message(vec![2], ChannelKind::Forum)));
        assert!(!filter.matches(&forum_message(Vec::new(), ChannelKind::Forum)));
    }

    #[test]
    fn test_post_tag_filter_ignores_non_forum() {
        let filter = Filter::new(
            FilterType::Whitelist,
            FilterLocation::PostTag,
            &words(&["release"]),
        );
        assert!(filter.matches(&forum_message(vec![2], ChannelKind::Text)));
        assert!(filter.matches(&text_message("no parent at all")));
    }

    #[test]
    fn test_username_filter() {
        let filter = Filter::new(
            FilterType::Blacklist,
            FilterLocation::Username,
            &words(&["spammer"]),
        );
        let mut message = text_message("hi");
        message.author.username = "TheSpammer99".to_string();
        assert!(!filter.matches(&message));

        message.author.username = "friend".to_string();
        assert!(filter.matches(&message));
    }

    #[test]
    fn test_member_filters_need_membership() {
        let nickname = Filter::new(
            FilterType::Blacklist,
            FilterLocation::GuildNickname,
            &words(&["x"]),
        );
        let roles = Filter::new(FilterType::Blacklist, FilterLocation::UserRoles, &words(&["x"]));
        let message = text_message("hi");

        // Even a blacklist that would vacuously pass is rejected without membership
        assert!(!nickname.matches(&message));
        assert!(!roles.matches(&message));
    }

    #[test]
    fn test_nickname_and_roles() {
        let mut message = text_message("hi");
        message.member = Some(Member {
            display_name: "Captain Hook".to_string(),
            role_names: vec!["Moderator".to_string(), "Trader".to_string()],
        });

        let nickname = Filter::new(
            FilterType::Whitelist,
            FilterLocation::GuildNickname,
            &words(&["captain"]),
        );
        assert!(nickname.matches(&message));

        let roles = Filter::new(
            FilterType::Whitelist,
            FilterLocation::UserRoles,
            &words(&["trader"]),
        );
        assert!(roles.matches(&message));

        let roles = Filter::new(
            FilterType::Blacklist,
            FilterLocation::UserRoles,
            &words(&["moderator"]),
        );
        assert!(!roles.matches(&message));
    }

    #[test]
    fn test_any_filter_passes_message() {
        let filters = MirrorFilters::new(vec![
            Filter::new(FilterType::Whitelist, FilterLocation::Message, &words(&["never"])),
            Filter::new(FilterType::Whitelist, FilterLocation::Message, &words(&["hello"])),
        ]);
        assert_eq!(filters.len(), 2);
        assert!(filters.matches(&text_message("hello world")));
        assert!(!filters.matches(&text_message("goodbye")));
    }

    #[test]
    fn test_empty_blacklist_admits_everything_in_union() {
        let filters = MirrorFilters::new(vec![
            Filter::new(FilterType::Blacklist, FilterLocation::Message, &words(&["spam"])),
            Filter::new(FilterType::Blacklist, FilterLocation::Message, &[]),
        ]);
        assert!(filters.matches(&text_message("spam")));
    }

    #[test]
    fn test_from_config_rejects_unknown_values() {
        let config = FilterConfig {
            kind: "whitelist".to_string(),
            location: "everywhere".to_string(),
            keywords: words(&["x"]),
        };
        let err = MirrorFilters::from_config(&[config]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFilterLocation { .. }));

        let config = FilterConfig {
            kind: "allowlist".to_string(),
            location: "message".to_string(),
            keywords: words(&["x"]),
        };
        let err = MirrorFilters::from_config(&[config]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFilterType { .. }));
    }
}
