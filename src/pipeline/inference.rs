//! Inference: one request, one text response.
//!
//! [`QuizModel`] is the seam between the pipeline and whatever hosts the
//! model. The pipeline builds exactly one [`InferenceRequest`] per document
//! (fixed prompt plus inline attachments), hands it to the model and returns
//! the text unchanged. No retries: a failed call fails the run.
//!
//! The model is resolved once from [`QuizConfig`] and passed into the
//! generator explicitly, so tests and embedders can substitute their own.

use crate::config::{QuizConfig, DEFAULT_PROVIDER};
use crate::error::QuizError;
use crate::pipeline::encode::Attachment;
use crate::providers::{gemini::GeminiClient, llm::ProviderModel};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// A prompt plus the attachments it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub prompt: String,
    pub attachments: Vec<Attachment>,
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            prompt: prompt.into(),
            attachments,
        }
    }
}

/// Text returned by the model plus whatever usage the provider reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A hosted multimodal model that turns an [`InferenceRequest`] into text.
#[async_trait]
pub trait QuizModel: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Submit the request and return the model's text.
    async fn generate(&self, request: &InferenceRequest) -> Result<ModelResponse, QuizError>;
}

/// Environment variables consulted, in order, for the Gemini credential.
pub const GEMINI_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Resolve the model client, from most-specific to least-specific.
///
/// 1. **Pre-built model** (`config.quiz_model`), used as-is.
/// 2. **Named non-Gemini provider** (`config.provider_name`), created through
///    the edgequake-llm factory, which reads that provider's own API key.
/// 3. **Gemini** with `config.api_key`.
/// 4. **Gemini** with `GOOGLE_API_KEY`, then `GEMINI_API_KEY`.
pub fn resolve_model(config: &QuizConfig) -> Result<Arc<dyn QuizModel>, QuizError> {
    if let Some(ref model) = config.quiz_model {
        return Ok(Arc::clone(model));
    }

    let provider = config.provider_name.trim().to_lowercase();
    if provider != DEFAULT_PROVIDER {
        debug!("Using edgequake-llm provider '{}' ({})", provider, config.model);
        let model = ProviderModel::from_factory(&provider, &config.model)?
            .with_temperature(config.temperature);
        return Ok(Arc::new(model));
    }

    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(gemini_key_from_env)
        .ok_or_else(|| QuizError::ProviderNotConfigured {
            provider: DEFAULT_PROVIDER.to_string(),
            hint: "Set GOOGLE_API_KEY (or GEMINI_API_KEY) to a Gemini API key.".to_string(),
        })?;

    let client = GeminiClient::new(&config.gemini_base_url, api_key, &config.model)?
        .with_temperature(config.temperature);
    Ok(Arc::new(client))
}

fn gemini_key_from_env() -> Option<String> {
    GEMINI_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl QuizModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &InferenceRequest) -> Result<ModelResponse, QuizError> {
            Ok(ModelResponse::text(format!(
                "{} attachments",
                request.attachments.len()
            )))
        }
    }

    #[test]
    fn prebuilt_model_wins() {
        let config = QuizConfig::builder()
            .quiz_model(Arc::new(EchoModel))
            .provider_name("openai")
            .build()
            .unwrap();
        assert_eq!(resolve_model(&config).unwrap().name(), "echo");
    }

    #[test]
    fn explicit_api_key_builds_gemini_client() {
        let config = QuizConfig::builder().api_key("test-key").build().unwrap();
        assert_eq!(resolve_model(&config).unwrap().name(), "gemini");
    }

    #[tokio::test]
    async fn trait_object_dispatch() {
        let model: Arc<dyn QuizModel> = Arc::new(EchoModel);
        let request = InferenceRequest::new(
            "prompt",
            vec![Attachment::new("image/png", b"a"), Attachment::new("image/png", b"b")],
        );
        let response = model.generate(&request).await.unwrap();
        assert_eq!(response.text, "2 attachments");
        assert_eq!(response.input_tokens, None);
    }
}
