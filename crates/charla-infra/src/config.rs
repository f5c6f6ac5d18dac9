//! Settings loader.
//!
//! Reads `charla.toml` into the immutable [`Settings`] record. A missing
//! or malformed file logs and falls back to defaults; startup never
//! fails on configuration alone. The Telegram token is the one secret
//! and comes from the environment, never from the file.

use std::collections::HashSet;
use std::path::Path;

use secrecy::SecretString;
use tracing::{debug, warn};

use charla_types::config::Settings;
use charla_types::error::ConfigError;

/// Environment variable holding the Telegram bot token.
pub const TOKEN_ENV_VAR: &str = "CHARLA_TG_TOKEN";

/// Load settings from `path`.
///
/// - Missing file: defaults, logged at debug.
/// - Unreadable or unparseable file: defaults, logged as a warning.
pub async fn load_settings(path: &Path) -> Settings {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no config file at {}, using defaults", path.display());
            return Settings::default();
        }
        Err(err) => {
            warn!("failed to read {}: {err}, using defaults", path.display());
            return Settings::default();
        }
    };

    match toml::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("failed to parse {}: {err}, using defaults", path.display());
            Settings::default()
        }
    }
}

/// Read the bot token from the environment.
///
/// The value is wrapped in [`SecretString`] immediately so it never
/// shows up in Debug output or logs.
pub fn load_bot_token() -> Result<SecretString, ConfigError> {
    match std::env::var(TOKEN_ENV_VAR) {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingToken),
    }
}

/// Build the authorized-sender set.
///
/// An empty allow-list is a configuration problem worth flagging, but
/// not a fatal one: the bot runs and drops every sender.
pub fn allowed_sender_set(settings: &Settings) -> HashSet<String> {
    if settings.telegram.allowed_senders.is_empty() {
        warn!("{}", ConfigError::EmptyAllowList);
    }
    settings.telegram.allowed_senders.iter().cloned().collect()
}
