//! Handler for /ask: relays the question into the user's assistant thread, polls the
//! run to completion with a typing indicator, and replies with the assistant's answer.
//!
//! **Data flow:** `/ask` → thinking message → post user message → start run → poll
//! (typing action per attempt) → strip break tags → HTML reply.

use crate::commands::Command;
use crate::format::strip_break_tags;
use crate::threads::ThreadRegistry;
use abot_core::{Bot, Chat, Handler, HandlerResponse, Message, MessageKind, Result};
use assistant_client::{AssistantService, RunState};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

// ---------- User-facing messages ----------
const MSG_NEED_START: &str = "Send /start first to create a conversation thread.";
const MSG_EMPTY_QUESTION: &str = "Please type a question after /ask.";
const MSG_NO_REPLY: &str = "❗️ The assistant did not reply in time. Please try again later.";
const MSG_RELAY_FAILED: &str =
    "❗️ Something went wrong while asking the assistant. Please try again later.";

/// Handles /ask; passes everything else down the chain.
pub struct AskHandler {
    assistant: Arc<dyn AssistantService>,
    bot: Arc<dyn Bot>,
    threads: Arc<ThreadRegistry>,
    thinking_message: String,
    poll_max_attempts: u32,
    poll_interval: Duration,
}

impl AskHandler {
    pub fn new(
        assistant: Arc<dyn AssistantService>,
        bot: Arc<dyn Bot>,
        threads: Arc<ThreadRegistry>,
        thinking_message: String,
        poll_max_attempts: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            assistant,
            bot,
            threads,
            thinking_message,
            poll_max_attempts,
            poll_interval,
        }
    }

    /// Posts the question, starts a run, and polls until a reply is available.
    /// Returns Ok(None) when the attempt budget runs out before a reply appears.
    /// The typing action is best effort; its failures never abort the poll.
    async fn relay(
        &self,
        thread_id: &str,
        question: &str,
        chat: &Chat,
    ) -> anyhow::Result<Option<String>> {
        self.assistant.post_user_message(thread_id, question).await?;
        let run_id = self.assistant.start_run(thread_id).await?;

        for attempt in 1..=self.poll_max_attempts {
            if let Err(e) = self.bot.send_typing(chat).await {
                debug!(error = %e, chat_id = chat.id, "Typing action failed, continuing poll");
            }

            match self.assistant.run_state(thread_id, &run_id).await? {
                RunState::Completed => {
                    // The run can complete a beat before the message is listable; a blank
                    // reply keeps polling instead of returning an empty answer.
                    if let Some(reply) = self.assistant.latest_assistant_reply(thread_id).await? {
                        info!(
                            thread_id = %thread_id,
                            run_id = %run_id,
                            attempt = attempt,
                            "Assistant reply received"
                        );
                        return Ok(Some(reply));
                    }
                }
                RunState::Failed(reason) => {
                    anyhow::bail!("assistant run ended as {}", reason);
                }
                RunState::Pending => {}
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        info!(
            thread_id = %thread_id,
            run_id = %run_id,
            attempts = self.poll_max_attempts,
            "No assistant reply within the attempt budget"
        );
        Ok(None)
    }

    async fn handle_ask(&self, message: &Message, question: &str) -> Result<HandlerResponse> {
        let user_id = message.user.id;

        let Some(thread_id) = self.threads.get(user_id) else {
            self.bot.send_message(&message.chat, MSG_NEED_START).await?;
            return Ok(HandlerResponse::Reply(MSG_NEED_START.to_string()));
        };

        if question.is_empty() {
            self.bot
                .send_message(&message.chat, MSG_EMPTY_QUESTION)
                .await?;
            return Ok(HandlerResponse::Reply(MSG_EMPTY_QUESTION.to_string()));
        }

        self.bot
            .send_message(&message.chat, &self.thinking_message)
            .await?;

        match self.relay(&thread_id, question, &message.chat).await {
            Ok(Some(answer)) => {
                let reply = format!(
                    "Assistant reply:\n\n{}\n\n\
                     Ask a new question with /ask or restart the conversation with /reset.",
                    strip_break_tags(&answer)
                );
                self.bot.send_html(&message.chat, &reply).await?;
                Ok(HandlerResponse::Reply(reply))
            }
            Ok(None) => {
                self.bot.send_message(&message.chat, MSG_NO_REPLY).await?;
                Ok(HandlerResponse::Reply(MSG_NO_REPLY.to_string()))
            }
            Err(e) => {
                error!(
                    error = %e,
                    user_id = user_id,
                    thread_id = %thread_id,
                    "Relay to assistant failed"
                );
                self.bot
                    .send_message(&message.chat, MSG_RELAY_FAILED)
                    .await?;
                Ok(HandlerResponse::Reply(MSG_RELAY_FAILED.to_string()))
            }
        }
    }
}

#[async_trait]
impl Handler for AskHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.kind != MessageKind::Text {
            return Ok(HandlerResponse::Continue);
        }

        match Command::parse(&message.content) {
            Some(Command::Ask(question)) => self.handle_ask(message, &question).await,
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
