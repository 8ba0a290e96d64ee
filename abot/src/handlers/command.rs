//! Handler for /start, /help, and /reset.
//!
//! /start creates the user's assistant thread on first contact and greets with the
//! thread id; /reset replaces the thread with a fresh one (the old thread is simply
//! abandoned, its state stays server-side); /help lists the commands.

use crate::commands::Command;
use crate::threads::ThreadRegistry;
use abot_core::{Bot, Handler, HandlerResponse, Message, MessageKind, Result};
use assistant_client::AssistantService;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

// ---------- User-facing messages ----------
const MSG_HELP: &str = "Available commands:\n\
    /start - start working with the bot\n\
    /ask &lt;question&gt; - ask the assistant\n\
    /reset - start a new conversation";
const MSG_RESET_OK: &str = "Starting a new conversation. Ask a question with /ask";
const MSG_THREAD_FAILED: &str = "Could not create a conversation thread. Please try again later.";

/// Handles /start, /help, and /reset; passes everything else down the chain.
pub struct CommandHandler {
    assistant: Arc<dyn AssistantService>,
    bot: Arc<dyn Bot>,
    threads: Arc<ThreadRegistry>,
}

impl CommandHandler {
    pub fn new(
        assistant: Arc<dyn AssistantService>,
        bot: Arc<dyn Bot>,
        threads: Arc<ThreadRegistry>,
    ) -> Self {
        Self {
            assistant,
            bot,
            threads,
        }
    }

    fn welcome_text(thread_id: &str) -> String {
        format!(
            "Hi, I'm your assistant!\n\
             Your thread ID: <code>{}</code>\n\
             Ask a question with: /ask &lt;your question&gt;\n\
             /help lists all available commands.",
            thread_id
        )
    }

    /// Creates a thread for the user unless one exists, then greets with the id.
    async fn handle_start(&self, message: &Message) -> Result<HandlerResponse> {
        let user_id = message.user.id;

        let thread_id = match self.threads.get(user_id) {
            Some(existing) => existing,
            None => match self.assistant.create_thread().await {
                Ok(thread_id) => {
                    self.threads.insert(user_id, thread_id.clone());
                    info!(
                        user_id = user_id,
                        thread_id = %thread_id,
                        "Thread created for user"
                    );
                    thread_id
                }
                Err(e) => {
                    error!(error = %e, user_id = user_id, "Thread creation failed on /start");
                    self.bot
                        .send_message(&message.chat, MSG_THREAD_FAILED)
                        .await?;
                    return Ok(HandlerResponse::Reply(MSG_THREAD_FAILED.to_string()));
                }
            },
        };

        let welcome = Self::welcome_text(&thread_id);
        self.bot.send_html(&message.chat, &welcome).await?;
        Ok(HandlerResponse::Reply(welcome))
    }

    /// Replaces the user's thread with a fresh one.
    async fn handle_reset(&self, message: &Message) -> Result<HandlerResponse> {
        let user_id = message.user.id;

        match self.assistant.create_thread().await {
            Ok(thread_id) => {
                self.threads.insert(user_id, thread_id.clone());
                info!(
                    user_id = user_id,
                    thread_id = %thread_id,
                    "Conversation reset, new thread registered"
                );
                self.bot.send_message(&message.chat, MSG_RESET_OK).await?;
                Ok(HandlerResponse::Reply(MSG_RESET_OK.to_string()))
            }
            Err(e) => {
                error!(error = %e, user_id = user_id, "Thread creation failed on /reset");
                self.bot
                    .send_message(&message.chat, MSG_THREAD_FAILED)
                    .await?;
                Ok(HandlerResponse::Reply(MSG_THREAD_FAILED.to_string()))
            }
        }
    }

    async fn handle_help(&self, message: &Message) -> Result<HandlerResponse> {
        self.bot.send_html(&message.chat, MSG_HELP).await?;
        Ok(HandlerResponse::Reply(MSG_HELP.to_string()))
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.kind != MessageKind::Text {
            return Ok(HandlerResponse::Continue);
        }

        match Command::parse(&message.content) {
            Some(Command::Start) => self.handle_start(message).await,
            Some(Command::Help) => self.handle_help(message).await,
            Some(Command::Reset) => self.handle_reset(message).await,
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
