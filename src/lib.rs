//! # pdf2quiz
//!
//! Generate quiz questions from a PDF with a multimodal model (Gemini by
//! default).
//!
//! The document is handed to the model either as one PNG per page or as the
//! raw PDF, together with a fixed instruction asking for five multiple-choice
//! questions. The model's reply is returned verbatim.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      local path (CLI) or streamed multipart upload (server)
//!  ├─ 2. Workspace  unique temp directory per request
//!  ├─ 3. Rasterise  pdftoppm / pdfium → page-N.png (page-image mode only)
//!  ├─ 4. Encode     file bytes → base64 inline attachments
//!  ├─ 5. Inference  one generateContent call: prompt + attachments
//!  └─ 6. Output     { "quizQuestions": text }, workspace removed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2quiz::{generate_quiz, AttachmentMode, QuizConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // GOOGLE_API_KEY or GEMINI_API_KEY must be set.
//!     let config = QuizConfig::builder()
//!         .mode(AttachmentMode::RawDocument)
//!         .build()?;
//!     let output = generate_quiz("lecture.pdf", &config).await?;
//!     println!("{}", output.quiz_questions);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | The `pdf2quiz` binary (clap + indicatif + tracing-subscriber) |
//! | `server` | on      | The HTTP service and `pdf2quiz-server` binary (axum + tower-http) |
//! | `pdfium` | off     | In-process rasteriser backed by pdfium instead of `pdftoppm` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AttachmentMode, QuizConfig, QuizConfigBuilder, RasterizerBackend};
pub use error::QuizError;
pub use generate::{generate_quiz, generate_quiz_from_bytes, generate_quiz_sync, QuizGenerator};
pub use output::{QuizOutput, QuizStats};
pub use pipeline::inference::{InferenceRequest, ModelResponse, QuizModel};
pub use pipeline::rasterize::Rasterizer;
pub use progress::{NoopProgressCallback, ProgressCallback, QuizProgressCallback};
