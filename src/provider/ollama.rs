// src/provider/ollama.rs — Ollama local model provider

use async_trait::async_trait;
use std::time::Duration;

use super::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::errors::DocQaError;

pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| "http://localhost:11434".into())
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Per-request timeout for `chat`. Local models on CPU can be slow.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists installed models. Also serves as the startup reachability check.
    pub async fn list_models(&self) -> Result<Vec<String>, DocQaError> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .map_err(|e| provider_error(format!("Cannot reach Ollama: {}", e)))?;

        if !resp.status().is_success() {
            return Err(provider_error(format!(
                "Ollama health check failed: HTTP {}",
                resp.status().as_u16()
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| provider_error(format!("Invalid Ollama response: {}", e)))?;

        let mut models: Vec<String> = body["models"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|m| m["name"].as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        models.sort();

        Ok(models)
    }

    /// Whether `model` is among `installed`. A bare name matches its
    /// `:latest` tag, as Ollama resolves it that way.
    pub fn has_model(installed: &[String], model: &str) -> bool {
        installed
            .iter()
            .any(|m| m == model || m.strip_suffix(":latest") == Some(model))
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

fn provider_error(message: String) -> DocQaError {
    DocQaError::Provider {
        provider: "ollama".into(),
        message,
    }
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DocQaError> {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "stream": false,
        });

        if let Some(temp) = request.temperature {
            body["options"] = serde_json::json!({ "temperature": temp });
        }

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| provider_error(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            return Err(provider_error(format!("HTTP {}: {}", status, error_body)));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| provider_error(format!("Failed to parse response: {}", e)))?;

        let content = resp["message"]["content"].as_str().map(|s| s.to_string());

        let usage = TokenUsage {
            input_tokens: resp["prompt_eval_count"].as_u64().unwrap_or(0) as u32,
            output_tokens: resp["eval_count"].as_u64().unwrap_or(0) as u32,
        };

        tracing::debug!(
            model = %request.model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            total_tokens = usage.total(),
            "Ollama chat completed"
        );

        Ok(ChatResponse { content, usage })
    }
}
