//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.
//! Rule-level checks (filter types, replacement locations, colors) happen when
//! mirrors are built; this pass catches everything else up front.

use fancy_regex::Regex;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use crate::mirror::matcher::WILDCARD;

/// Presence values accepted by Discord.
const VALID_STATUSES: [&str; 4] = ["online", "idle", "dnd", "invisible"];

const WEBHOOK_URL_PREFIXES: [&str; 4] = [
    "https://discord.com/api/webhooks/",
    "https://discordapp.com/api/webhooks/",
    "https://canary.discord.com/api/webhooks/",
    "https://ptb.discord.com/api/webhooks/",
];

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.token.is_empty() {
        errors.push("token is required".to_string());
    }
    if config.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("token has not been configured (still using placeholder)".to_string());
    }

    if !VALID_STATUSES.contains(&config.status.to_lowercase().as_str()) {
        errors.push(format!(
            "status '{}' is invalid (use: online, idle, dnd, invisible)",
            config.status
        ));
    }

    if config.mirrors.is_empty() {
        errors.push("mirrors is empty - nothing to mirror".to_string());
    }

    for (i, mirror) in config.mirrors.iter().enumerate() {
        for channel_id in &mirror.channel_ids {
            if channel_id.parse::<u64>().is_err() {
                errors.push(format!(
                    "mirrors[{}].channel_ids contains a non-numeric id: '{}'",
                    i, channel_id
                ));
            }
        }

        if mirror.webhook_urls.is_empty() {
            errors.push(format!("mirrors[{}].webhook_urls is empty", i));
        }
        for url in &mirror.webhook_urls {
            if !is_webhook_url(url) {
                errors.push(format!(
                    "mirrors[{}].webhook_urls contains an invalid webhook URL: '{}'",
                    i, url
                ));
            }
        }

        for (j, replacement) in mirror.replacements.iter().enumerate() {
            if replacement.replace != WILDCARD && Regex::new(&replacement.replace).is_err() {
                errors.push(format!(
                    "mirrors[{}].replacements[{}].replace is not a valid regex: '{}'",
                    i, j, replacement.replace
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

fn is_webhook_url(url: &str) -> bool {
    WEBHOOK_URL_PREFIXES.iter().any(|prefix| {
        url.strip_prefix(prefix)
            .and_then(|rest| rest.split_once('/'))
            .is_some_and(|(id, token)| id.parse::<u64>().is_ok() && !token.is_empty())
    })
}

/// Quick check if config has the minimum required fields populated.
pub fn has_required_fields(config: &Config) -> bool {
    !config.token.is_empty() && config.mirrors.iter().any(|m| !m.webhook_urls.is_empty())
}
