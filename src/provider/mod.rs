// src/provider/mod.rs — Model provider layer

pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infra::errors::DocQaError;

/// Inference backend used to answer questions.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DocQaError>;
}

/// One single-turn completion: the rendered prompt goes out as a user message.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// The textual answer field. `None` when the backend's reply has no
    /// such field or it is not a string.
    pub content: Option<String>,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}
