// src/integrations/types.rs — Messaging adapter trait and inbound events

use async_trait::async_trait;

use crate::core::types::ChatId;

/// Where an inbound event came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMeta {
    pub chat_id: ChatId,
    /// The message the event refers to. For a delete request this is the
    /// message carrying the button.
    pub message_id: i64,
    /// Username or first name, for logs only.
    pub sender: String,
}

/// Something a user did that the bot reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A file was uploaded. `file_name` is empty when the platform sent none.
    Document {
        meta: EventMeta,
        file_id: String,
        file_name: String,
    },
    /// A plain text message: a command or a question.
    Text { meta: EventMeta, text: String },
    /// The "Delete" button under an upload acknowledgement was pressed.
    DeleteRequest { meta: EventMeta, callback_id: String },
}

impl InboundEvent {
    pub fn meta(&self) -> &EventMeta {
        match self {
            InboundEvent::Document { meta, .. }
            | InboundEvent::Text { meta, .. }
            | InboundEvent::DeleteRequest { meta, .. } => meta,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.meta().chat_id
    }
}

/// Result of one long poll.
#[derive(Debug, Clone, Default)]
pub struct PollBatch {
    pub events: Vec<InboundEvent>,
    /// Offset to pass to the next poll. Unchanged when nothing arrived.
    pub next_offset: i64,
}

/// Adapter for the chat platform the bot lives on.
#[async_trait]
pub trait MessagingAdapter: Send + Sync {
    /// Wait for new events after `offset`.
    async fn poll(&self, offset: i64) -> anyhow::Result<PollBatch>;

    /// Send a text message. Returns the new message id.
    async fn send(&self, chat_id: ChatId, text: &str) -> anyhow::Result<i64>;

    /// Send a text message with an inline "Delete" button attached.
    async fn send_with_delete_button(&self, chat_id: ChatId, text: &str) -> anyhow::Result<i64>;

    async fn delete_message(&self, chat_id: ChatId, message_id: i64) -> anyhow::Result<()>;

    /// Acknowledge a button press so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()>;

    /// Fetch the bytes of an uploaded file.
    async fn download(&self, file_id: &str) -> anyhow::Result<Vec<u8>>;
}
