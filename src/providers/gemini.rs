//! Native client for the Gemini `generateContent` REST endpoint.
//!
//! Gemini accepts arbitrary binary parts as `inline_data` with a MIME type,
//! which is what lets a whole PDF travel as `application/pdf`. The request
//! is a single `user` turn: the prompt as a text part followed by one
//! inline part per attachment.
//!
//! The response text is the concatenation of the first candidate's text
//! parts. A blocked prompt, a response without candidates, or a candidate
//! without text are all treated as failures.

use crate::error::QuizError;
use crate::pipeline::inference::{InferenceRequest, ModelResponse, QuizModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const PROVIDER: &str = "gemini";

/// Gemini REST client bound to one model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: &str,
    ) -> Result<Self, QuizError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| QuizError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            api_key: api_key.into(),
            temperature: None,
        })
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn failure(detail: impl Into<String>) -> QuizError {
        QuizError::InferenceFailure {
            provider: PROVIDER.to_string(),
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl QuizModel for GeminiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<ModelResponse, QuizError> {
        let body = GenerateContentRequest::from_request(request, self.temperature);
        info!(
            "Sending generateContent request with {} attachment(s)",
            request.attachments.len()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::failure(format!("request failed: {e}")))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| Self::failure(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(Self::failure(format!(
                "HTTP {}: {}",
                status,
                api_error_message(&raw)
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| Self::failure(format!("malformed response: {e}")))?;
        let result = parsed.into_model_response().map_err(Self::failure)?;
        debug!(
            "Gemini returned {} chars ({:?} in / {:?} out tokens)",
            result.text.len(),
            result.input_tokens,
            result.output_tokens
        );
        Ok(result)
    }
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw text.
fn api_error_message(raw: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(raw)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| raw.trim().to_string())
}

// ── Wire types: request ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a InferenceRequest, temperature: Option<f32>) -> Self {
        let mut parts = Vec::with_capacity(request.attachments.len() + 1);
        parts.push(GeminiPart::Text {
            text: &request.prompt,
        });
        parts.extend(request.attachments.iter().map(|a| GeminiPart::InlineData {
            inline_data: GeminiInlineData {
                mime_type: &a.mime_type,
                data: &a.data,
            },
        }));

        Self {
            contents: vec![GeminiContent {
                role: "user",
                parts,
            }],
            generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: GeminiInlineData<'a> },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

// ── Wire types: response ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

impl GenerateContentResponse {
    fn into_model_response(self) -> Result<ModelResponse, String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(format!("prompt was blocked: {reason}"));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| "response has no candidates".to_string())?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(format!(
                "response contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ));
        }

        let usage = self.usage_metadata.unwrap_or_default();
        Ok(ModelResponse {
            text,
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::Attachment;
    use mockito::Matcher;
    use serde_json::json;

    fn sample_request() -> InferenceRequest {
        InferenceRequest::new(
            "Make a quiz",
            vec![
                Attachment::new("image/png", b"page one"),
                Attachment::new("image/png", b"page two"),
            ],
        )
    }

    #[test]
    fn endpoint_includes_model_and_trims_slash() {
        let c = GeminiClient::new("https://example.test/", "k", "gemini-2.0-flash").unwrap();
        assert_eq!(
            c.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn request_body_shape() {
        let request = sample_request();
        let body = serde_json::to_value(GenerateContentRequest::from_request(&request, None)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "Make a quiz"},
                        {"inline_data": {"mime_type": "image/png", "data": "cGFnZSBvbmU="}},
                        {"inline_data": {"mime_type": "image/png", "data": "cGFnZSB0d28="}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn request_body_carries_temperature_when_set() {
        let request = sample_request();
        let body =
            serde_json::to_value(GenerateContentRequest::from_request(&request, Some(0.5))).unwrap();
        assert_eq!(body["generationConfig"]["temperature"], json!(0.5));
    }

    #[test]
    fn response_text_joins_parts() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Grade level: middle school\n"}, {"text": "1. What…"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 1200, "candidatesTokenCount": 340}
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let out = parsed.into_model_response().unwrap();
        assert_eq!(out.text, "Grade level: middle school\n1. What…");
        assert_eq!(out.input_tokens, Some(1200));
        assert_eq!(out.output_tokens, Some(340));
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let raw = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let err = parsed.into_model_response().unwrap_err();
        assert!(err.contains("SAFETY"));
    }

    #[test]
    fn empty_candidate_is_an_error() {
        let raw = json!({"candidates": [{"finishReason": "MAX_TOKENS"}]});
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let err = parsed.into_model_response().unwrap_err();
        assert!(err.contains("MAX_TOKENS"));

        let parsed: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.into_model_response().is_err());
    }

    #[test]
    fn api_error_message_extraction() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid.");
        assert_eq!(api_error_message("upstream exploded"), "upstream exploded");
    }

    #[tokio::test]
    async fn generate_round_trip_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""role":"user""#.into()),
                Matcher::Regex(r#""mime_type":"image/png""#.into()),
                Matcher::Regex(r#""text":"Make a quiz""#.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{"content": {"parts": [{"text": "Question 1: ..."}]}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = GeminiClient::new(&server.url(), "test-key", "gemini-2.0-flash").unwrap();
        let out = client.generate(&sample_request()).await.unwrap();

        assert_eq!(out.text, "Question 1: ...");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_becomes_inference_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(429)
            .with_body(r#"{"error":{"code":429,"message":"Resource has been exhausted"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(&server.url(), "k", "gemini-2.0-flash").unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();

        match err {
            QuizError::InferenceFailure { provider, detail } => {
                assert_eq!(provider, "gemini");
                assert!(detail.contains("429"), "got: {detail}");
                assert!(detail.contains("exhausted"), "got: {detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
