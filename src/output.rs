//! Result types returned by a quiz run.

use crate::config::AttachmentMode;
use serde::{Deserialize, Serialize};

/// The generated quiz plus run statistics.
///
/// `quiz_questions` is the model's text, verbatim. Nothing parses or
/// validates its structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutput {
    pub quiz_questions: String,
    pub stats: QuizStats,
}

/// Statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
    /// How the document was attached.
    pub mode: AttachmentMode,
    /// Provider that produced the quiz.
    pub provider: String,
    /// Pages rendered by the rasteriser (0 in raw-document mode).
    pub pages_rendered: usize,
    /// Attachments sent with the request.
    pub attachments: usize,
    /// Prompt tokens, when the provider reports them.
    pub input_tokens: Option<u32>,
    /// Completion tokens, when the provider reports them.
    pub output_tokens: Option<u32>,
    /// Wall-clock time for the whole run.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_camel_case() {
        let out = QuizOutput {
            quiz_questions: "1. ...".into(),
            stats: QuizStats {
                mode: AttachmentMode::PageImages,
                provider: "gemini".into(),
                pages_rendered: 3,
                attachments: 3,
                input_tokens: Some(10),
                output_tokens: None,
                duration_ms: 42,
            },
        };
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["quizQuestions"], "1. ...");
        assert_eq!(v["stats"]["mode"], "page_images");
        assert_eq!(v["stats"]["pagesRendered"], 3);
        assert!(v["stats"]["outputTokens"].is_null());
    }
}
