//! REPL runner: converts each teloxide message to a core Message and hands it to the
//! HandlerChain. External interaction: teloxide REPL, get_me at startup.

use abot_core::{HandlerChain, ToCoreMessage};
use anyhow::Result;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use super::adapters::TelegramMessageWrapper;

/// Starts the REPL with the given teloxide Bot and HandlerChain.
/// Calls get_me() once for a startup log line; each incoming message is converted to a
/// core Message and processed on a spawned task so a slow assistant run never blocks
/// update polling.
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => {
            info!(
                username = %me.user.username.as_deref().unwrap_or("unknown"),
                "Bot connected to Telegram"
            );
        }
        Err(e) => {
            error!(error = %e, "get_me failed at startup");
        }
    }

    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();

        async move {
            let wrapper = TelegramMessageWrapper(&msg);
            let core_msg = wrapper.to_core();

            match msg.text() {
                Some(text) => {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        message_content = %text,
                        "Received message"
                    );
                }
                None => {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        kind = ?core_msg.kind,
                        "Received non-text message"
                    );
                }
            }

            tokio::spawn(async move {
                if let Err(e) = chain.handle(&core_msg).await {
                    error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
