//! Last handler in the chain: explains unsupported content and unknown commands,
//! and points plain text at /ask.

use crate::commands::Command;
use abot_core::{Bot, Handler, HandlerResponse, Message, MessageKind, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

// ---------- User-facing messages ----------
const MSG_PHOTO: &str = "You sent a photo, but I can't process images yet.";
const MSG_UNKNOWN_COMMAND: &str = "Unknown command. Use /help for the list of commands.";
const MSG_NO_COMMAND: &str =
    "You sent a message without a command. Use /ask <question> or see /help.";

/// Catches everything the command handlers passed over.
pub struct FallbackHandler {
    bot: Arc<dyn Bot>,
}

impl FallbackHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Handler for FallbackHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        match message.kind {
            MessageKind::Photo => {
                self.bot.send_message(&message.chat, MSG_PHOTO).await?;
                Ok(HandlerResponse::Reply(MSG_PHOTO.to_string()))
            }
            MessageKind::Other => {
                info!(
                    user_id = message.user.id,
                    chat_id = message.chat.id,
                    "Ignoring unsupported message kind"
                );
                Ok(HandlerResponse::Stop)
            }
            MessageKind::Text => {
                // Known commands were handled earlier in the chain; anything command-shaped
                // reaching this point is unknown.
                let text = if Command::parse(&message.content).is_some() {
                    MSG_UNKNOWN_COMMAND
                } else {
                    MSG_NO_COMMAND
                };
                self.bot.send_message(&message.chat, text).await?;
                Ok(HandlerResponse::Reply(text.to_string()))
            }
        }
    }
}
