//! Command parsing for incoming text messages.
//!
//! Telegram clients send commands as the first token of the message text, optionally
//! suffixed with the bot's username in group chats (`/ask@my_bot question`). The rest
//! of the line is the command argument.

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` — create (or show) the user's conversation thread.
    Start,
    /// `/help` — list available commands.
    Help,
    /// `/reset` — start a new conversation thread.
    Reset,
    /// `/ask <question>` — relay the question to the assistant. The argument is trimmed
    /// and may be empty.
    Ask(String),
    /// Any other `/command`; carries the command name without the slash.
    Unknown(String),
}

impl Command {
    /// Parses the message text. Returns None for non-command text (no leading `/`).
    pub fn parse(text: &str) -> Option<Command> {
        let trimmed = text.trim();
        if !trimmed.starts_with('/') {
            return None;
        }

        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim();

        // Drop an @botname suffix: "/ask@my_bot" → "ask".
        let name = head[1..].split('@').next().unwrap_or("");

        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "reset" => Some(Command::Reset),
            "ask" => Some(Command::Ask(rest.to_string())),
            other => Some(Command::Unknown(other.to_string())),
        }
    }
}
