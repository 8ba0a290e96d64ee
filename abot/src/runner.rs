//! Main entry: init logging, validate config, build components, run the REPL.

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;
use abot_core::init_tracing;
use abot_telegram::run_repl;
use anyhow::Result;
use std::path::Path;
use tracing::{info, instrument};

/// Validates config, initializes tracing, builds the components and handler chain,
/// then long-polls Telegram until the process is stopped.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;

    if let Some(parent) = Path::new(&config.log_file).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    init_tracing(&config.log_file)?;

    info!(
        assistant_id = %config.assistant_id,
        poll_max_attempts = config.poll_max_attempts,
        poll_interval_secs = config.poll_interval_secs,
        "Initializing bot"
    );

    let components = build_bot_components(&config)?;
    let handler_chain = build_handler_chain(&components, &config);

    info!("Bot started successfully");

    run_repl(components.teloxide_bot.clone(), handler_chain).await?;

    Ok(())
}
