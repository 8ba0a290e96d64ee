//! # abot-core
//!
//! Core types and traits for the assistant bot: [`Bot`], [`Handler`], [`HandlerChain`],
//! message and user types, and tracing initialization. Transport-agnostic; used by
//! abot-telegram and the application crate.

pub mod bot;
pub mod chain;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use chain::HandlerChain;
pub use error::{AbotError, HandlerError, Result};
pub use logger::init_tracing;
pub use types::{
    Chat, Handler, HandlerResponse, Message, MessageDirection, MessageKind, ToCoreMessage,
    ToCoreUser, User,
};
