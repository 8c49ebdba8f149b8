// src/integrations/telegram.rs — Telegram adapter (Bot API)
//
// Uses the Telegram Bot API (https://core.telegram.org/bots/api) with long
// polling via getUpdates.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::core::types::ChatId;
use crate::integrations::types::{EventMeta, InboundEvent, MessagingAdapter, PollBatch};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Callback payload of the inline Delete button.
pub const DELETE_CALLBACK: &str = "delete";

const DELETE_BUTTON_LABEL: &str = "🗑 Delete";

/// Telegram integration adapter.
pub struct TelegramAdapter {
    client: Client,
    bot_token: String,
    api_base: String,
    poll_timeout_secs: u64,
}

impl TelegramAdapter {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            api_base: TELEGRAM_API_BASE.into(),
            poll_timeout_secs: 30,
        }
    }

    /// Point at a different Bot API server (self-hosted or a test double).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{file_path}", self.api_base, self.bot_token)
    }

    /// Validate the bot token by calling getMe.
    pub async fn validate(&self) -> anyhow::Result<String> {
        #[derive(Deserialize)]
        struct BotUser {
            username: Option<String>,
            first_name: Option<String>,
        }

        let bot: Option<BotUser> = self
            .call("getMe", &serde_json::json!({}), None)
            .await
            .map_err(|e| anyhow::anyhow!("Telegram auth failed: {e}"))?;

        let bot = bot.unwrap_or(BotUser {
            username: None,
            first_name: None,
        });
        Ok(format!(
            "Authenticated as @{}",
            bot.username
                .unwrap_or_else(|| bot.first_name.unwrap_or_default())
        ))
    }

    /// POST a Bot API method and unwrap the `{ok, result, description}` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Option<T>> {
        let mut request = self.client.post(self.api_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // Telegram answers errors with a JSON envelope and a 4xx status, so
        // the body is parsed regardless of status.
        let resp: TelegramResponse<T> = request.send().await?.json().await?;

        if !resp.ok {
            anyhow::bail!(
                "Telegram {method} failed: {}",
                resp.description.unwrap_or_else(|| "unknown".into())
            );
        }
        Ok(resp.result)
    }

    async fn send_message(&self, body: serde_json::Value) -> anyhow::Result<i64> {
        let sent: Option<SendMessageResp> = self.call("sendMessage", &body, None).await?;
        Ok(sent.map(|r| r.message_id).unwrap_or_default())
    }
}

// -- Telegram API response types --

#[derive(Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    update_id: i64,
    message: Option<TgMessage>,
    callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: i64,
    chat: TgChat,
    from: Option<TgUser>,
    text: Option<String>,
    document: Option<TgDocument>,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    username: Option<String>,
    first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgDocument {
    file_id: String,
    file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgCallbackQuery {
    id: String,
    from: TgUser,
    message: Option<TgMessage>,
    data: Option<String>,
}

#[derive(Deserialize)]
struct TgFile {
    file_path: Option<String>,
}

#[derive(Deserialize)]
struct SendMessageResp {
    message_id: i64,
}

fn display_name(user: Option<&TgUser>) -> String {
    user.and_then(|u| u.username.clone().or_else(|| u.first_name.clone()))
        .unwrap_or_else(|| "unknown".into())
}

/// Map one update to the event the bot cares about, if any.
///
/// A message with a document is an upload even when it also has a caption.
/// Callback presses other than the Delete button are ignored.
pub(crate) fn convert_update(update: TgUpdate) -> Option<InboundEvent> {
    if let Some(msg) = update.message {
        let meta = EventMeta {
            chat_id: ChatId(msg.chat.id),
            message_id: msg.message_id,
            sender: display_name(msg.from.as_ref()),
        };
        if let Some(doc) = msg.document {
            return Some(InboundEvent::Document {
                meta,
                file_id: doc.file_id,
                file_name: doc.file_name.unwrap_or_default(),
            });
        }
        return msg.text.map(|text| InboundEvent::Text { meta, text });
    }

    if let Some(query) = update.callback_query {
        if query.data.as_deref() != Some(DELETE_CALLBACK) {
            return None;
        }
        let msg = query.message?;
        return Some(InboundEvent::DeleteRequest {
            meta: EventMeta {
                chat_id: ChatId(msg.chat.id),
                message_id: msg.message_id,
                sender: display_name(Some(&query.from)),
            },
            callback_id: query.id,
        });
    }

    None
}

// -- MessagingAdapter implementation --

#[async_trait]
impl MessagingAdapter for TelegramAdapter {
    async fn poll(&self, offset: i64) -> anyhow::Result<PollBatch> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        // Leave headroom over the server-side long-poll wait.
        let timeout = Duration::from_secs(self.poll_timeout_secs + 10);

        let updates: Vec<TgUpdate> = self
            .call("getUpdates", &body, Some(timeout))
            .await?
            .unwrap_or_default();

        let next_offset = updates
            .iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(offset);

        let events = updates.into_iter().filter_map(convert_update).collect();
        Ok(PollBatch {
            events,
            next_offset,
        })
    }

    async fn send(&self, chat_id: ChatId, text: &str) -> anyhow::Result<i64> {
        // Plain text: answers quote documents and must not be parsed as markup.
        self.send_message(serde_json::json!({
            "chat_id": chat_id.0,
            "text": text,
        }))
        .await
    }

    async fn send_with_delete_button(&self, chat_id: ChatId, text: &str) -> anyhow::Result<i64> {
        self.send_message(serde_json::json!({
            "chat_id": chat_id.0,
            "text": text,
            "reply_markup": {
                "inline_keyboard": [[
                    { "text": DELETE_BUTTON_LABEL, "callback_data": DELETE_CALLBACK }
                ]]
            },
        }))
        .await
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: i64) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id.0,
            "message_id": message_id,
        });
        let _: Option<bool> = self.call("deleteMessage", &body, None).await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()> {
        let body = serde_json::json!({ "callback_query_id": callback_id });
        let _: Option<bool> = self.call("answerCallbackQuery", &body, None).await?;
        Ok(())
    }

    async fn download(&self, file_id: &str) -> anyhow::Result<Vec<u8>> {
        let file: Option<TgFile> = self
            .call("getFile", &serde_json::json!({ "file_id": file_id }), None)
            .await?;
        let file_path = file
            .and_then(|f| f.file_path)
            .ok_or_else(|| anyhow::anyhow!("Telegram getFile returned no file_path"))?;

        let resp = self.client.get(self.file_url(&file_path)).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("Telegram file download failed: HTTP {}", resp.status().as_u16());
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
