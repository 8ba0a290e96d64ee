//! Bot abstraction for sending messages and chat actions.
//!
//! [`Bot`] is transport-agnostic; the Telegram implementation lives in abot-telegram.

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Abstraction for sending messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain-text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a message rendered with the transport's HTML parse mode
    /// (used for replies that carry `<code>` fragments).
    async fn send_html(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;

    /// Fires a "typing…" chat action. Best effort: callers may ignore failures
    /// while waiting on a slow assistant run.
    async fn send_typing(&self, chat: &Chat) -> Result<()>;
}
