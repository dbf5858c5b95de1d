//! Top-level quiz generation.
//!
//! [`QuizGenerator`] owns the two long-lived collaborators (the model client
//! and the rasteriser), built once from a [`QuizConfig`]. Each run then gets
//! a fresh [`RequestWorkspace`] for its temporary files.
//!
//! The free functions [`generate_quiz`], [`generate_quiz_sync`] and
//! [`generate_quiz_from_bytes`] wrap the whole thing for one-shot use.

use crate::config::{AttachmentMode, QuizConfig};
use crate::error::QuizError;
use crate::output::{QuizOutput, QuizStats};
use crate::pipeline::encode::AttachmentSource;
use crate::pipeline::inference::{resolve_model, InferenceRequest, ModelResponse, QuizModel};
use crate::pipeline::input::{self, UploadWriter};
use crate::pipeline::rasterize::{self, Rasterizer};
use crate::pipeline::workspace::RequestWorkspace;
use crate::progress::ProgressCallback;
use crate::prompts::quiz_prompt;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Generates quizzes. Cheap to share behind an `Arc` across requests.
#[derive(Clone)]
pub struct QuizGenerator {
    model: Arc<dyn QuizModel>,
    rasterizer: Arc<dyn Rasterizer>,
    mode: AttachmentMode,
    api_timeout: Option<Duration>,
    upload_dir: PathBuf,
    max_upload_bytes: u64,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for QuizGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizGenerator")
            .field("model", &self.model.name())
            .field("rasterizer", &self.rasterizer.name())
            .field("mode", &self.mode)
            .field("api_timeout", &self.api_timeout)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl QuizGenerator {
    /// Resolve the model and rasteriser named by `config`.
    pub fn from_config(config: &QuizConfig) -> Result<Self, QuizError> {
        let model = resolve_model(config)?;
        let rasterizer = rasterize::build_rasterizer(config)?;
        Ok(Self {
            model,
            rasterizer,
            mode: config.mode,
            api_timeout: config.api_timeout_secs.map(Duration::from_secs),
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
            progress: config.progress_callback.clone(),
        })
    }

    pub fn mode(&self) -> AttachmentMode {
        self.mode
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Open a fresh workspace under the configured upload root.
    pub async fn workspace(&self) -> Result<RequestWorkspace, QuizError> {
        RequestWorkspace::create_async(&self.upload_dir).await
    }

    /// Generate a quiz for a PDF already on disk.
    ///
    /// Rendered pages are written inside `workspace`; the caller closes it.
    pub async fn generate(
        &self,
        pdf_path: &Path,
        workspace: &RequestWorkspace,
    ) -> Result<QuizOutput, QuizError> {
        let result = self.run(pdf_path, workspace).await;
        if let Some(ref cb) = self.progress {
            match &result {
                Ok(output) => cb.on_complete(output.quiz_questions.len()),
                Err(e) => cb.on_error(&e.to_string()),
            }
        }
        result
    }

    async fn run(
        &self,
        pdf_path: &Path,
        workspace: &RequestWorkspace,
    ) -> Result<QuizOutput, QuizError> {
        let start = Instant::now();
        info!("Processing PDF: {} ({} mode)", pdf_path.display(), self.mode);
        if let Some(ref cb) = self.progress {
            cb.on_start(pdf_path);
        }

        // ── Build the attachment source ──────────────────────────────────
        let (source, pages_rendered) = match self.mode {
            AttachmentMode::PageImages => {
                let out_dir = workspace.pages_dir()?;
                let pages =
                    rasterize::rasterize_pages(Arc::clone(&self.rasterizer), pdf_path, &out_dir)
                        .await;
                info!("Converted {} pages to images", pages.len());
                if let Some(ref cb) = self.progress {
                    cb.on_pages_rendered(pages.len());
                }
                if pages.is_empty() {
                    return Err(QuizError::ConversionFailure {
                        detail: format!(
                            "{} produced no page images for {}",
                            self.rasterizer.name(),
                            pdf_path.display()
                        ),
                    });
                }
                let count = pages.len();
                (AttachmentSource::PageImages(pages), count)
            }
            AttachmentMode::RawDocument => (AttachmentSource::RawDocument(pdf_path.to_path_buf()), 0),
        };

        // ── Encode and call the model ────────────────────────────────────
        let attachments = source.encode().await?;
        let attachment_count = attachments.len();
        let request = InferenceRequest::new(quiz_prompt(self.mode), attachments);

        info!(
            "Generating quiz questions with {} from {} attachment(s)",
            self.model.name(),
            attachment_count
        );
        if let Some(ref cb) = self.progress {
            cb.on_generation_start(attachment_count);
        }
        let response = self.call_model(&request).await?;

        Ok(QuizOutput {
            quiz_questions: response.text,
            stats: QuizStats {
                mode: self.mode,
                provider: self.model.name().to_string(),
                pages_rendered,
                attachments: attachment_count,
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
                duration_ms: start.elapsed().as_millis() as u64,
            },
        })
    }

    async fn call_model(&self, request: &InferenceRequest) -> Result<ModelResponse, QuizError> {
        let result = match self.api_timeout {
            Some(limit) => tokio::time::timeout(limit, self.model.generate(request))
                .await
                .unwrap_or_else(|_| {
                    Err(QuizError::InferenceFailure {
                        provider: self.model.name().to_string(),
                        detail: format!("timed out after {}s", limit.as_secs()),
                    })
                }),
            None => self.model.generate(request).await,
        };

        if let Err(ref e) = result {
            error!("Error generating quiz questions: {}", e);
        }
        result
    }
}

/// Generate a quiz for a local PDF file.
///
/// Builds a [`QuizGenerator`] from `config`, runs it in a fresh workspace and
/// removes the workspace before returning, whatever the outcome.
///
/// # Example
/// ```rust,no_run
/// use pdf2quiz::{generate_quiz, QuizConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Reads GOOGLE_API_KEY from the environment.
/// let output = generate_quiz("chapter3.pdf", &QuizConfig::default()).await?;
/// println!("{}", output.quiz_questions);
/// # Ok(())
/// # }
/// ```
pub async fn generate_quiz(
    input_str: impl AsRef<str>,
    config: &QuizConfig,
) -> Result<QuizOutput, QuizError> {
    let pdf_path = input::resolve_local(input_str.as_ref())?;
    let generator = QuizGenerator::from_config(config)?;

    let workspace = generator.workspace().await?;
    let result = generator.generate(&pdf_path, &workspace).await;
    workspace.close_async().await;
    result
}

/// Synchronous wrapper around [`generate_quiz`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_quiz_sync(
    input_str: impl AsRef<str>,
    config: &QuizConfig,
) -> Result<QuizOutput, QuizError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| QuizError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_quiz(input_str, config))
}

/// Generate a quiz from PDF bytes held in memory.
///
/// The bytes are written into a managed workspace (subject to
/// `config.max_upload_bytes`) which is removed before returning.
pub async fn generate_quiz_from_bytes(
    bytes: &[u8],
    config: &QuizConfig,
) -> Result<QuizOutput, QuizError> {
    let generator = QuizGenerator::from_config(config)?;
    let workspace = generator.workspace().await?;

    let result = async {
        let mut writer =
            UploadWriter::create(&workspace.upload_path(), generator.max_upload_bytes()).await?;
        writer.write_chunk(bytes).await?;
        let saved = writer.finish().await?;
        generator.generate(&saved.path, &workspace).await
    }
    .await;

    workspace.close_async().await;
    result
}
