//! Bot configuration, loaded from environment variables (`.env` via dotenvy in main).

use anyhow::{Context, Result};
use std::env;

/// Application config. Credentials are required; everything else has defaults.
pub struct BotConfig {
    pub bot_token: String,
    pub openai_api_key: String,
    /// Id of the assistant that runs are created for.
    pub assistant_id: String,
    pub openai_base_url: String,
    /// Optional Telegram Bot API base URL. When set, bot requests go to this URL
    /// (points at a mock server in tests).
    /// Env: `TELEGRAM_API_URL` or `TELOXIDE_API_URL`.
    pub telegram_api_url: Option<String>,
    pub log_file: String,
    /// Sent to the chat right before the assistant run starts.
    pub thinking_message: String,
    /// How many times the run is polled before giving up.
    pub poll_max_attempts: u32,
    /// Seconds between poll attempts.
    pub poll_interval_secs: u64,
}

impl BotConfig {
    /// Loads config from environment variables.
    /// If `token` is given it overrides TELEGRAM_BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("TELEGRAM_BOT_TOKEN")
                .or_else(|_| env::var("BOT_TOKEN"))
                .context("TELEGRAM_BOT_TOKEN not set")?,
        };
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let assistant_id = env::var("ASSISTANT_ID").context("ASSISTANT_ID not set")?;
        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/abot.log".to_string());
        let thinking_message = env::var("THINKING_MESSAGE")
            .unwrap_or_else(|_| "One second, thinking…".to_string());
        let poll_max_attempts = env::var("POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);
        let poll_interval_secs = env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        Ok(Self {
            bot_token,
            openai_api_key,
            assistant_id,
            openai_base_url,
            telegram_api_url,
            log_file,
            thinking_message,
            poll_max_attempts,
            poll_interval_secs,
        })
    }

    /// Rejects configs that would fail at the first API call anyway.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("TELEGRAM_BOT_TOKEN is empty");
        }
        if self.openai_api_key.trim().is_empty() {
            anyhow::bail!("OPENAI_API_KEY is empty");
        }
        if self.assistant_id.trim().is_empty() {
            anyhow::bail!("ASSISTANT_ID is empty");
        }
        if self.poll_max_attempts == 0 {
            anyhow::bail!("POLL_MAX_ATTEMPTS must be at least 1");
        }
        Ok(())
    }
}
