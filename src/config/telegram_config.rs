//! Telegram bot configuration. Optional: without a token the bot runs
//! with a log-only sink and no command surface.

use super::{optional_env, parse_env};
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Clone)]
pub struct TelegramEnvConfig {
    pub bot_token: String,
    pub chat_id: i64,
    pub api_url: String,
    pub poll_timeout: Duration,
}

// Keeps the token out of logs
impl std::fmt::Debug for TelegramEnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramEnvConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

impl TelegramEnvConfig {
    pub fn from_env() -> Result<Option<Self>> {
        let Some(bot_token) = optional_env("TELEGRAM_BOT_TOKEN") else {
            return Ok(None);
        };

        let chat_id = optional_env("TELEGRAM_CHAT_ID")
            .context("TELEGRAM_CHAT_ID is required when TELEGRAM_BOT_TOKEN is set")?
            .parse::<i64>()
            .context("Failed to parse TELEGRAM_CHAT_ID")?;

        Ok(Some(Self {
            bot_token,
            chat_id,
            api_url: optional_env("TELEGRAM_API_URL")
                .unwrap_or_else(|| "https://api.telegram.org".to_string()),
            poll_timeout: Duration::from_secs(parse_env("TELEGRAM_POLL_TIMEOUT_SECS", 30)?),
        }))
    }
}
