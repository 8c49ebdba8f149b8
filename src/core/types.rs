// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat identity assigned by the messaging platform. Opaque; only used as a
/// key and for addressing replies.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Commands recognised in free text. Anything else is a question.
#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    Start,
    Help,
    Status,
    Question(String),
}

impl BotCommand {
    /// Parse an incoming text message. Commands may carry a `@botname`
    /// suffix, as Telegram appends in group chats.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let command = trimmed
            .split_whitespace()
            .next()
            .unwrap_or("")
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();

        match command.as_str() {
            "/start" => BotCommand::Start,
            "/help" => BotCommand::Help,
            "/status" => BotCommand::Status,
            _ => BotCommand::Question(text.to_string()),
        }
    }
}
