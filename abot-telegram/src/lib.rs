//! # abot-telegram
//!
//! Telegram layer: adapters from teloxide types to core types, the [`abot_core::Bot`]
//! implementation, minimal env config, and the REPL runner. Handles only Telegram
//! connectivity and handler-chain dispatch; no assistant or command logic.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use runner::run_repl;
