// src/infra/daemon/handler.rs — Per-event bot logic
//
// Every failure is handled where it happens and turned into a reply. Nothing
// here is fatal to the process.

use std::sync::Arc;

use crate::core::answer::{PromptTemplate, QuestionAnswerer};
use crate::core::safety::ContentFilter;
use crate::core::session::{Session, SessionStore};
use crate::core::types::{BotCommand, ChatId};
use crate::infra::errors::HandlerError;
use crate::integrations::msoffice::{self, DocumentFormat};
use crate::integrations::types::{EventMeta, InboundEvent, MessagingAdapter};
use crate::util::{log_preview, split_message};

pub const WELCOME_TEXT: &str = "Hi! I'm a document bot. Upload a .txt or .docx file and I'll help you answer questions about its contents.";
pub const UPLOADED_TEXT: &str = "Document uploaded. You can now ask questions.";
pub const DELETED_TEXT: &str = "Document deleted.";
pub const EMPTY_ANSWER_TEXT: &str = "The model returned an empty answer.";

/// Telegram rejects messages longer than this many characters.
pub const MAX_REPLY_CHARS: usize = 4096;

/// Everything an event handler needs. Shared across tasks via `Arc`.
pub struct BotContext {
    pub messenger: Arc<dyn MessagingAdapter>,
    pub answerer: QuestionAnswerer,
    pub store: SessionStore,
    pub filter: ContentFilter,
    pub template: Arc<PromptTemplate>,
}

impl BotContext {
    pub fn new(
        messenger: Arc<dyn MessagingAdapter>,
        answerer: QuestionAnswerer,
        filter: ContentFilter,
        template: Arc<PromptTemplate>,
    ) -> Self {
        Self {
            messenger,
            answerer,
            store: SessionStore::new(),
            filter,
            template,
        }
    }
}

/// Handle one inbound event to completion.
pub async fn handle_event(ctx: &BotContext, event: InboundEvent) {
    match event {
        InboundEvent::Document {
            meta,
            file_id,
            file_name,
        } => {
            tracing::info!(
                chat_id = %meta.chat_id,
                username = %meta.sender,
                file_name = %file_name,
                "Document received"
            );
            match accept_document(ctx, &meta, &file_id, &file_name).await {
                Ok(()) => {}
                Err(e) => report_failure(ctx, &meta, e).await,
            }
        }
        InboundEvent::Text { meta, text } => match BotCommand::parse(&text) {
            BotCommand::Start | BotCommand::Help => {
                tracing::info!(chat_id = %meta.chat_id, username = %meta.sender, "Start command");
                reply(ctx, meta.chat_id, WELCOME_TEXT).await;
            }
            BotCommand::Status => {
                let report = status_text(ctx, meta.chat_id);
                reply(ctx, meta.chat_id, &report).await;
            }
            BotCommand::Question(question) => {
                tracing::info!(
                    chat_id = %meta.chat_id,
                    username = %meta.sender,
                    question = %log_preview(&question, 100),
                    "Question received"
                );
                match answer_question(ctx, meta.chat_id, &question).await {
                    Ok(answer) => {
                        let text = if answer.trim().is_empty() {
                            EMPTY_ANSWER_TEXT
                        } else {
                            answer.as_str()
                        };
                        reply(ctx, meta.chat_id, text).await;
                    }
                    Err(e) => report_failure(ctx, &meta, e).await,
                }
            }
        },
        InboundEvent::DeleteRequest { meta, callback_id } => {
            delete_document(ctx, &meta, &callback_id).await;
        }
    }
}

/// Download, extract, screen and store an uploaded document, then
/// acknowledge it with a Delete button.
pub async fn accept_document(
    ctx: &BotContext,
    meta: &EventMeta,
    file_id: &str,
    file_name: &str,
) -> Result<(), HandlerError> {
    let format =
        DocumentFormat::from_file_name(file_name).ok_or_else(|| HandlerError::UnsupportedFormat {
            file_name: file_name.to_string(),
        })?;

    let bytes = ctx
        .messenger
        .download(file_id)
        .await
        .map_err(HandlerError::Download)?;

    let text = msoffice::read_document(format, &bytes)?;

    if let Some(phrase) = ctx.filter.check(&text) {
        return Err(HandlerError::SafetyRejection {
            phrase: phrase.to_string(),
        });
    }

    tracing::info!(
        chat_id = %meta.chat_id,
        username = %meta.sender,
        file_name = %file_name,
        chars = text.chars().count(),
        "Document accepted"
    );
    tracing::debug!(chat_id = %meta.chat_id, "Document text:\n{}", text);

    let session = Session::new(meta.chat_id, file_name, text, &ctx.template);
    if ctx.store.put(session).is_some() {
        tracing::debug!(chat_id = %meta.chat_id, "Replaced previous document");
    }

    if let Err(e) = ctx
        .messenger
        .send_with_delete_button(meta.chat_id, UPLOADED_TEXT)
        .await
    {
        tracing::error!(chat_id = %meta.chat_id, "Failed to send upload acknowledgement: {e:#}");
    }
    Ok(())
}

/// Answer a question against the chat's current document.
///
/// Works on a snapshot of the session: a replacement or deletion arriving
/// meanwhile does not affect this answer, and nothing is written back.
pub async fn answer_question(
    ctx: &BotContext,
    chat_id: ChatId,
    question: &str,
) -> Result<String, HandlerError> {
    let session = ctx.store.get(chat_id).ok_or(HandlerError::NoSession)?;
    Ok(ctx.answerer.answer(&session, question).await?)
}

/// Handle the Delete button: drop the session, remove the acknowledgement
/// message and confirm.
pub async fn delete_document(ctx: &BotContext, meta: &EventMeta, callback_id: &str) {
    let existed = ctx.store.delete(meta.chat_id);
    tracing::info!(
        chat_id = %meta.chat_id,
        username = %meta.sender,
        existed,
        "Document deleted"
    );

    if let Err(e) = ctx.messenger.answer_callback(callback_id).await {
        tracing::debug!(chat_id = %meta.chat_id, "answerCallbackQuery failed: {e:#}");
    }
    if let Err(e) = ctx
        .messenger
        .delete_message(meta.chat_id, meta.message_id)
        .await
    {
        tracing::warn!(chat_id = %meta.chat_id, "Failed to delete message: {e:#}");
    }
    reply(ctx, meta.chat_id, DELETED_TEXT).await;
}

/// `/status` reply for one chat.
pub fn status_text(ctx: &BotContext, chat_id: ChatId) -> String {
    match ctx.store.get(chat_id) {
        Some(session) => format!(
            "Loaded document: {} ({} characters), uploaded {}.\nModel: {}",
            if session.file_name().is_empty() {
                "(unnamed)"
            } else {
                session.file_name()
            },
            session.document_text().chars().count(),
            session.created_at().format("%Y-%m-%d %H:%M UTC"),
            ctx.answerer.model(),
        ),
        None => format!(
            "No document loaded. Upload a .txt or .docx file.\nModel: {}",
            ctx.answerer.model()
        ),
    }
}

/// Log a failure at the level its kind calls for and tell the user.
async fn report_failure(ctx: &BotContext, meta: &EventMeta, err: HandlerError) {
    match &err {
        HandlerError::SafetyRejection { phrase } => {
            tracing::warn!(
                chat_id = %meta.chat_id,
                username = %meta.sender,
                phrase = %phrase,
                "Suspicious phrase detected, document rejected"
            );
        }
        HandlerError::UnsupportedFormat { .. } | HandlerError::NoSession => {
            tracing::debug!(chat_id = %meta.chat_id, "{err}");
        }
        HandlerError::Extract(e) => {
            tracing::error!(
                chat_id = %meta.chat_id,
                username = %meta.sender,
                reason = e.reason(),
                "{err}"
            );
        }
        HandlerError::Download(_) | HandlerError::Answer(_) => {
            tracing::error!(chat_id = %meta.chat_id, username = %meta.sender, "{err}");
        }
    }
    reply(ctx, meta.chat_id, err.user_message()).await;
}

/// Send `text`, split over several messages when it is too long for one.
async fn reply(ctx: &BotContext, chat_id: ChatId, text: &str) {
    let pieces = split_message(text, MAX_REPLY_CHARS);
    if pieces.len() > 1 {
        tracing::debug!(chat_id = %chat_id, parts = pieces.len(), "Splitting long reply");
    }
    for piece in pieces {
        if let Err(e) = ctx.messenger.send(chat_id, piece).await {
            tracing::error!(chat_id = %chat_id, "Failed to send message: {e:#}");
            break;
        }
    }
}
