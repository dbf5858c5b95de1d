//! Adapter from edgequake-llm providers to [`QuizModel`].
//!
//! Lets the quiz run against OpenAI, Anthropic, Ollama or any other vision
//! provider edgequake-llm knows about. The request becomes one user message
//! carrying the prompt text with every attachment as an image.
//!
//! These providers only accept images, so they are limited to page-image
//! mode; `QuizConfigBuilder::build` refuses document mode for them.

use crate::error::QuizError;
use crate::pipeline::encode::Attachment;
use crate::pipeline::inference::{InferenceRequest, ModelResponse, QuizModel};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// A [`QuizModel`] backed by an edgequake-llm provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    name: String,
    temperature: Option<f32>,
}

impl ProviderModel {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, name: impl Into<String>) -> Self {
        Self {
            provider,
            name: name.into(),
            temperature: None,
        }
    }

    /// Create a named provider for `model` via [`ProviderFactory`].
    ///
    /// The factory reads the provider's own API key variable
    /// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …).
    pub fn from_factory(provider_name: &str, model: &str) -> Result<Self, QuizError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            QuizError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider, provider_name))
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

impl std::fmt::Debug for ProviderModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderModel")
            .field("name", &self.name)
            .field("provider", &"<dyn LLMProvider>")
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Convert an attachment to the edgequake-llm image type.
///
/// `detail: "high"` asks OpenAI-class models for the full tile budget, which
/// small print and diagram labels need.
pub fn to_image_data(attachment: &Attachment) -> ImageData {
    ImageData::new(attachment.data.clone(), attachment.mime_type.as_str()).with_detail("high")
}

#[async_trait]
impl QuizModel for ProviderModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<ModelResponse, QuizError> {
        let images: Vec<ImageData> = request.attachments.iter().map(to_image_data).collect();
        let messages = vec![ChatMessage::user_with_images(
            request.prompt.as_str(),
            images,
        )];
        let options = CompletionOptions {
            temperature: self.temperature,
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| QuizError::InferenceFailure {
                provider: self.name.clone(),
                detail: e.to_string(),
            })?;

        if response.content.trim().is_empty() {
            return Err(QuizError::InferenceFailure {
                provider: self.name.clone(),
                detail: "response contained no text".to_string(),
            });
        }

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.name, response.prompt_tokens, response.completion_tokens
        );

        Ok(ModelResponse {
            text: response.content,
            input_tokens: Some(response.prompt_tokens as u32),
            output_tokens: Some(response.completion_tokens as u32),
        })
    }
}
