//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `MIRRORKEEPER_TOKEN` - Discord token
//! - `MIRRORKEEPER_STATUS` - Presence status
//! - `MIRRORKEEPER_LOG_MESSAGE` - Mirrored message log template

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "MIRRORKEEPER";

/// Apply environment variable overrides to a config.
///
/// This allows the token to be provided via the environment instead of the
/// config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_TOKEN", ENV_PREFIX)) {
        config.token = token;
    }
    if let Ok(status) = env::var(format!("{}_STATUS", ENV_PREFIX)) {
        config.status = status;
    }
    if let Ok(log_message) = env::var(format!("{}_LOG_MESSAGE", ENV_PREFIX)) {
        config.log_message = log_message;
    }

    config
}

/// Check if any required environment variables are set but empty.
///
/// Returns a list of variable names that are set but empty.
pub fn check_empty_env_vars() -> Vec<String> {
    let vars = [format!("{}_TOKEN", ENV_PREFIX)];

    vars.into_iter()
        .filter(|var| env::var(var).map(|v| v.is_empty()).unwrap_or(false))
        .collect()
}

/// Get the config file path from environment or use default.
///
/// Checks `MIRRORKEEPER_CONFIG`, otherwise returns "mirrorkeeper.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "mirrorkeeper.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config() -> Config {
        Config {
            token: "original_token".to_string(),
            status: "online".to_string(),
            log_message: String::new(),
            mirrors: Vec::new(),
        }
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "MIRRORKEEPER");
    }

    #[test]
    fn test_get_config_path_default() {
        env::remove_var("MIRRORKEEPER_CONFIG");
        assert_eq!(get_config_path(), "mirrorkeeper.conf");
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        env::remove_var("MIRRORKEEPER_TOKEN");
        env::remove_var("MIRRORKEEPER_STATUS");
        env::remove_var("MIRRORKEEPER_LOG_MESSAGE");

        let result = apply_env_overrides(make_test_config());

        assert_eq!(result.token, "original_token");
        assert_eq!(result.status, "online");
        assert!(check_empty_env_vars().is_empty());
    }
}
