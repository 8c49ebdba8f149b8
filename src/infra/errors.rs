// src/infra/errors.rs — Error types for docqa

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocQaError {
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("No Telegram bot token. Set TELEGRAM_BOT_TOKEN or telegram.bot_token in config.toml.")]
    MissingBotToken,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a `.docx` upload could not be turned into text.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("corrupt-archive: {0}")]
    CorruptArchive(String),

    #[error("missing-part: archive has no word/document.xml")]
    MissingPart,

    #[error("malformed-xml: {0}")]
    MalformedXml(String),
}

impl ExtractError {
    /// Short machine-readable reason, used as a log field.
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractError::CorruptArchive(_) => "corrupt-archive",
            ExtractError::MissingPart => "missing-part",
            ExtractError::MalformedXml(_) => "malformed-xml",
        }
    }
}

#[derive(Error, Debug)]
pub enum AnswerError {
    #[error("prompt rendering failed: {0}")]
    Render(#[from] minijinja::Error),

    #[error("inference-failed: {cause}")]
    InferenceFailed {
        #[source]
        cause: DocQaError,
    },
}

/// Every way handling one inbound chat event can fail. Each variant maps to
/// exactly one reply and one log level; nothing propagates past the handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("download failed: {0:#}")]
    Download(anyhow::Error),

    #[error("unsupported document format: {file_name}")]
    UnsupportedFormat { file_name: String },

    #[error("could not read document: {0}")]
    Extract(#[from] ExtractError),

    #[error("document rejected, contains denylisted phrase '{phrase}'")]
    SafetyRejection { phrase: String },

    #[error("no document loaded for this chat")]
    NoSession,

    #[error("answer generation failed: {0}")]
    Answer(#[from] AnswerError),
}

impl HandlerError {
    /// Text sent back to the chat.
    pub fn user_message(&self) -> &'static str {
        match self {
            HandlerError::Download(_) => "Failed to get the file. Please try again.",
            HandlerError::UnsupportedFormat { .. } => "Only .txt and .docx files are supported.",
            HandlerError::Extract(_) => "Failed to read the document.",
            HandlerError::SafetyRejection { .. } => {
                "The document contains suspicious phrases and will not be processed."
            }
            HandlerError::NoSession => "Please upload a document first (.txt or .docx).",
            HandlerError::Answer(_) => "Failed to generate an answer.",
        }
    }
}
