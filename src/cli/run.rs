// src/cli/run.rs — Start the bot

use std::sync::Arc;
use std::time::Duration;

use crate::core::answer::{PromptTemplate, QuestionAnswerer};
use crate::core::safety::ContentFilter;
use crate::infra::config::Config;
use crate::infra::daemon::{self, BotContext};
use crate::infra::errors::DocQaError;
use crate::integrations::telegram::TelegramAdapter;
use crate::provider::ollama::OllamaProvider;
use crate::provider::ModelProvider;

/// Validate everything the bot depends on, then serve until Ctrl+C.
pub async fn run_bot(config: &Config) -> anyhow::Result<()> {
    let template = Arc::new(PromptTemplate::from_config(&config.prompt)?);
    let telegram = telegram_adapter(config)?;

    let who = telegram.validate().await?;
    tracing::info!("{who}");

    let ollama = ollama_provider(config);
    ensure_model(&ollama, &config.model.name).await?;
    tracing::info!(
        provider = ollama.name(),
        model = %config.model.name,
        url = %ollama.base_url(),
        "Model backend ready"
    );

    let provider: Arc<dyn ModelProvider> = Arc::new(ollama);
    let ctx = Arc::new(BotContext::new(
        Arc::new(telegram),
        QuestionAnswerer::from_config(provider, &config.model),
        ContentFilter::from_config(&config.safety),
        template,
    ));

    daemon::run_bot(ctx).await
}

pub fn telegram_adapter(config: &Config) -> Result<TelegramAdapter, DocQaError> {
    Ok(TelegramAdapter::new(config.bot_token()?.to_string())
        .with_api_base(&config.telegram.api_base)
        .with_poll_timeout(config.telegram.poll_timeout_secs))
}

pub fn ollama_provider(config: &Config) -> OllamaProvider {
    OllamaProvider::new(Some(config.model.ollama_url.clone()))
        .with_timeout(Duration::from_secs(config.model.request_timeout_secs))
}

/// Fails when Ollama is unreachable. A missing model only warns: it may be
/// pulled while the bot is already running.
pub async fn ensure_model(ollama: &OllamaProvider, model: &str) -> Result<bool, DocQaError> {
    let installed = ollama.list_models().await?;
    let present = OllamaProvider::has_model(&installed, model);
    if !present {
        tracing::warn!(
            model = %model,
            "Model is not installed on the Ollama server. Run `ollama pull {model}`"
        );
    }
    Ok(present)
}
