//! Configuration file parsing (HOCON format).

use std::fs;
use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.display().to_string(),
        source,
    })?;

    load_config_str(&content)
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = load_config_str(
            r##"
            token = "abc"
            status = "idle"
            log_message = "%author% in %channel%"
            mirrors = [
              {
                name = "news"
                channel_ids = ["111", "222"]
                webhook_urls = ["https://discord.com/api/webhooks/1/token"]
                requirements { min_content_length = 5 }
                options { remove_attachments = true, mirror_messages_on_edit = true }
                replacements = [
                  { replace = "foo", with = "bar", where = "message_content" }
                  { replace = "*", with = "#112233", where = "embed_color" }
                ]
                filters = [
                  { type = "whitelist", keywords = ["launch"], where = "message" }
                ]
              }
            ]
            "##,
        )
        .unwrap();

        assert_eq!(config.token, "abc");
        assert_eq!(config.status, "idle");
        assert_eq!(config.mirrors.len(), 1);

        let mirror = &config.mirrors[0];
        assert_eq!(mirror.label(), "news");
        assert_eq!(mirror.channel_ids, vec!["111", "222"]);
        assert_eq!(mirror.requirements.min_content_length, 5);
        assert_eq!(mirror.requirements.min_embeds_count, 0);
        assert!(mirror.options.remove_attachments);
        assert!(mirror.options.mirror_messages_on_edit);
        assert!(mirror.options.mirror_messages_from_bots);
        assert_eq!(mirror.replacements.len(), 2);
        assert_eq!(mirror.replacements[0].location.as_deref(), Some("message_content"));
        assert_eq!(mirror.filters[0].kind, "whitelist");
        assert_eq!(mirror.filters[0].location, "message");
    }

    #[test]
    fn test_defaults() {
        let config = load_config_str(
            r#"
            token = "abc"
            mirrors = [ { channel_ids = ["1"], webhook_urls = ["https://discord.com/api/webhooks/1/t"] } ]
            "#,
        )
        .unwrap();

        assert_eq!(config.status, "online");
        assert!(config.log_message.is_empty());

        let mirror = &config.mirrors[0];
        assert_eq!(mirror.label(), "1");
        assert!(!mirror.options.use_webhook_profile);
        assert!(mirror.options.mirror_reply_messages);
        assert!(!mirror.options.mirror_messages_on_edit);
        assert!(mirror.replacements.is_empty());
        assert!(mirror.filters.is_empty());
    }

    #[test]
    fn test_missing_token_fails() {
        let result = load_config_str("mirrors = []");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = load_config("does-not-exist.conf");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
