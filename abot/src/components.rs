//! Component factory: builds BotComponents from config. Isolates assembly logic from
//! the runner.

use crate::config::BotConfig;
use crate::handlers::{AskHandler, CommandHandler, FallbackHandler};
use crate::threads::ThreadRegistry;
use abot_core::{Bot as CoreBot, HandlerChain};
use abot_telegram::TelegramBotAdapter;
use anyhow::Result;
use assistant_client::{mask_token, AssistantClient, AssistantService};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Core dependencies for run_bot, produced by the component factory.
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    pub bot: Arc<dyn CoreBot>,
    pub assistant: Arc<dyn AssistantService>,
    pub threads: Arc<ThreadRegistry>,
}

/// Builds the teloxide client, the assistant client, and the thread registry.
#[instrument(skip(config))]
pub fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let teloxide_bot = {
        let bot = teloxide::Bot::new(config.bot_token.clone());
        if let Some(ref url_str) = config.telegram_api_url {
            match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            }
        } else {
            bot
        }
    };

    let bot: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    let assistant: Arc<dyn AssistantService> = Arc::new(AssistantClient::with_base_url(
        config.openai_api_key.clone(),
        config.assistant_id.clone(),
        config.openai_base_url.clone(),
    ));
    info!(
        assistant_id = %config.assistant_id,
        base_url = %config.openai_base_url,
        api_key = %mask_token(&config.openai_api_key),
        "Assistant client ready"
    );

    let threads = Arc::new(ThreadRegistry::new());

    Ok(BotComponents {
        teloxide_bot,
        bot,
        assistant,
        threads,
    })
}

/// Builds the handler chain: commands → ask → fallback.
pub fn build_handler_chain(components: &BotComponents, config: &BotConfig) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(CommandHandler::new(
            components.assistant.clone(),
            components.bot.clone(),
            components.threads.clone(),
        )))
        .add_handler(Arc::new(AskHandler::new(
            components.assistant.clone(),
            components.bot.clone(),
            components.threads.clone(),
            config.thinking_message.clone(),
            config.poll_max_attempts,
            Duration::from_secs(config.poll_interval_secs),
        )))
        .add_handler(Arc::new(FallbackHandler::new(components.bot.clone())))
}
