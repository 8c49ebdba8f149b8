// src/core/answer.rs — Prompt template and question answering
//
// The template is compiled once at startup. Each session binds its document
// into a render context once; every question then only adds itself.

use minijinja::{context, Environment, UndefinedBehavior, Value};
use std::sync::Arc;

use super::session::Session;
use crate::infra::config::{ModelConfig, PromptConfig};
use crate::infra::errors::{AnswerError, DocQaError};
use crate::provider::{ChatRequest, ModelProvider};

const TEMPLATE_NAME: &str = "qa";

pub const DEFAULT_TEMPLATE: &str = "\
You are a helpful assistant. Answer questions strictly based on the following document.
Answer briefly and to the point using information from the document.
If the answer is not in the document, say so.

DOCUMENT:
{{ document }}

QUESTION: {{ question }}

ANSWER:";

/// Compiled question-answering template with `document` and `question` slots.
pub struct PromptTemplate {
    env: Environment<'static>,
}

impl std::fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplate").finish_non_exhaustive()
    }
}

impl PromptTemplate {
    /// Compile `source` and check that it actually places both the document
    /// and the question in the prompt.
    pub fn parse(source: &str) -> Result<Self, DocQaError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.add_template_owned(TEMPLATE_NAME, source.to_string())
            .map_err(|e| DocQaError::Config(format!("invalid prompt template: {e}")))?;

        let template = Self { env };
        let sample = template
            .render_with(Value::from("\u{1}DOCUMENT\u{1}"), "\u{1}QUESTION\u{1}")
            .map_err(|e| DocQaError::Config(format!("invalid prompt template: {e}")))?;
        if !sample.contains("\u{1}DOCUMENT\u{1}") {
            return Err(DocQaError::Config(
                "prompt template never renders {{ document }}".into(),
            ));
        }
        if !sample.contains("\u{1}QUESTION\u{1}") {
            return Err(DocQaError::Config(
                "prompt template never renders {{ question }}".into(),
            ));
        }

        Ok(template)
    }

    pub fn from_config(prompt: &PromptConfig) -> Result<Self, DocQaError> {
        Self::parse(prompt.template.as_deref().unwrap_or(DEFAULT_TEMPLATE))
    }

    /// Build the per-session render context. The document is a template
    /// value, so template syntax inside it is never evaluated. The text is
    /// shared, not copied.
    pub fn bind(self: &Arc<Self>, document: impl Into<Arc<str>>) -> BoundPrompt {
        BoundPrompt {
            template: Arc::clone(self),
            document: Value::from(document.into()),
        }
    }

    fn render_with(&self, document: Value, question: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template(TEMPLATE_NAME)?
            .render(context! { document => document, question => question })
    }
}

/// A template with one document already bound; renders one prompt per question.
#[derive(Debug, Clone)]
pub struct BoundPrompt {
    template: Arc<PromptTemplate>,
    document: Value,
}

impl BoundPrompt {
    pub fn render(&self, question: &str) -> Result<String, minijinja::Error> {
        self.template.render_with(self.document.clone(), question)
    }
}

/// Sends rendered prompts to the model, one at a time per session.
pub struct QuestionAnswerer {
    provider: Arc<dyn ModelProvider>,
    model: String,
    temperature: Option<f32>,
}

impl QuestionAnswerer {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
        }
    }

    pub fn from_config(provider: Arc<dyn ModelProvider>, model: &ModelConfig) -> Self {
        Self {
            provider,
            model: model.name.clone(),
            temperature: model.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer `question` against the session's document.
    ///
    /// Holds the session lock for the whole call, so questions in one chat
    /// never overlap. The guard is dropped on every exit, including when the
    /// caller abandons this future mid-inference.
    pub async fn answer(&self, session: &Session, question: &str) -> Result<String, AnswerError> {
        let _guard = session.lock().await;

        let prompt = session.prompt().render(question)?;
        let request = ChatRequest {
            model: self.model.clone(),
            prompt,
            temperature: self.temperature,
        };

        let response = self
            .provider
            .chat(request)
            .await
            .map_err(|cause| AnswerError::InferenceFailed { cause })?;

        // Missing or non-text answer field counts as an empty answer.
        Ok(response.content.unwrap_or_else(|| {
            tracing::debug!(chat_id = %session.chat_id(), "Model response had no text field");
            String::new()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ChatId;
    use crate::provider::ChatResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingProvider {
        prompts: Mutex<Vec<String>>,
        reply: Option<String>,
        fail: bool,
    }

    impl RecordingProvider {
        fn replying(reply: Option<&str>) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                reply: reply.map(str::to_string),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl ModelProvider for RecordingProvider {
        fn name(&self) -> &str {
            "Recording"
        }

        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DocQaError> {
            self.prompts
                .lock()
                .unwrap()
                .push(request.prompt.clone());
            if self.fail {
                return Err(DocQaError::Provider {
                    provider: "recording".into(),
                    message: "boom".into(),
                });
            }
            Ok(ChatResponse {
                content: self.reply.clone(),
                ..Default::default()
            })
        }
    }

    fn default_template() -> Arc<PromptTemplate> {
        Arc::new(PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap())
    }

    #[test]
    fn test_default_template_renders_both_slots() {
        let bound = default_template().bind("Paris is the capital of France.\n");
        let prompt = bound.render("What is the capital of France?").unwrap();
        assert!(prompt.contains("DOCUMENT:\nParis is the capital of France.\n"));
        assert!(prompt.contains("QUESTION: What is the capital of France?"));
        assert!(prompt.ends_with("ANSWER:"));
    }

    #[test]
    fn test_document_template_syntax_is_inert() {
        let bound = default_template().bind("{{ question }} and {% if true %}x{% endif %}");
        let prompt = bound.render("Q?").unwrap();
        assert!(prompt.contains("{{ question }} and {% if true %}x{% endif %}"));
    }

    #[test]
    fn test_no_html_escaping() {
        let bound = default_template().bind("a < b & \"c\"");
        assert!(bound.render("x").unwrap().contains("a < b & \"c\""));
    }

    #[test]
    fn test_template_without_question_rejected() {
        let err = PromptTemplate::parse("Doc: {{ document }}").unwrap_err();
        assert!(err.to_string().contains("question"));
    }

    #[test]
    fn test_template_without_document_rejected() {
        assert!(PromptTemplate::parse("Q: {{ question }}").is_err());
    }

    #[test]
    fn test_template_syntax_error_rejected() {
        assert!(PromptTemplate::parse("{{ document }} {{ question").is_err());
    }

    #[test]
    fn test_template_unknown_variable_rejected() {
        assert!(PromptTemplate::parse("{{ document }} {{ question }} {{ nope }}").is_err());
    }

    #[test]
    fn test_from_config_uses_override() {
        let cfg = PromptConfig {
            template: Some("[{{ document }}]({{ question }})".into()),
        };
        let template = Arc::new(PromptTemplate::from_config(&cfg).unwrap());
        assert_eq!(template.bind("d").render("q").unwrap(), "[d](q)");
    }

    #[tokio::test]
    async fn test_answer_returns_model_text() {
        let provider = Arc::new(RecordingProvider::replying(Some("Paris.")));
        let answerer = QuestionAnswerer::new(provider.clone(), "gemma3:1b");
        let session = Session::new(ChatId(1), "a.txt", "Paris is the capital.\n", &default_template());

        let answer = answerer.answer(&session, "Capital?").await.unwrap();
        assert_eq!(answer, "Paris.");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Paris is the capital.\n"));
    }

    #[tokio::test]
    async fn test_missing_answer_field_is_empty_answer() {
        let provider = Arc::new(RecordingProvider::replying(None));
        let answerer = QuestionAnswerer::new(provider, "m");
        let session = Session::new(ChatId(1), "a.txt", "doc", &default_template());

        assert_eq!(answerer.answer(&session, "q").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_inference_failure_releases_lock() {
        let provider = Arc::new(RecordingProvider {
            fail: true,
            ..RecordingProvider::replying(None)
        });
        let answerer = QuestionAnswerer::new(provider, "m");
        let session = Session::new(ChatId(1), "a.txt", "doc", &default_template());

        let err = answerer.answer(&session, "q").await.unwrap_err();
        assert!(matches!(err, AnswerError::InferenceFailed { .. }));
        assert!(session.try_lock().is_ok());
    }
}
