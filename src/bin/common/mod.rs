//! Flags and setup shared by the `pdf2quiz` and `pdf2quiz-server` binaries.

use clap::Args;
use pdf2quiz::{AttachmentMode, QuizConfigBuilder, RasterizerBackend};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generation options. Every flag can also be set from the environment
/// (or a `.env` file).
#[derive(Args, Debug, Clone)]
pub struct QuizArgs {
    /// How the PDF is attached: images (one PNG per page) or document (raw PDF).
    #[arg(long, env = "PDF2QUIZ_MODE", default_value = "images")]
    pub mode: AttachmentMode,

    /// Provider: gemini (native), or any edgequake-llm provider
    /// (openai, anthropic, ollama, ...).
    #[arg(long, env = "PDF2QUIZ_PROVIDER", default_value = pdf2quiz::config::DEFAULT_PROVIDER)]
    pub provider: String,

    /// Model identifier.
    #[arg(long, env = "PDF2QUIZ_MODEL", default_value = pdf2quiz::config::DEFAULT_MODEL)]
    pub model: String,

    /// Page rasteriser: pdftoppm or pdfium.
    #[arg(long, env = "PDF2QUIZ_RASTERIZER", default_value = "pdftoppm")]
    pub rasterizer: RasterizerBackend,

    /// Path to the pdftoppm executable.
    #[arg(long, env = "PDF2QUIZ_PDFTOPPM", default_value = "pdftoppm")]
    pub pdftoppm: PathBuf,

    /// Rendering DPI (72–400).
    #[arg(long, env = "PDF2QUIZ_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    pub dpi: u32,

    /// Sampling temperature. Provider default when unset.
    #[arg(long, env = "PDF2QUIZ_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Inference timeout in seconds. No timeout when unset.
    #[arg(long, env = "PDF2QUIZ_API_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub api_timeout: Option<u64>,

    /// Gemini API base URL.
    #[arg(long, env = "PDF2QUIZ_GEMINI_BASE_URL",
          default_value = pdf2quiz::config::DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Root directory for per-request workspaces. System temp dir when unset.
    #[arg(long, env = "PDF2QUIZ_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Maximum upload size in megabytes.
    #[arg(long, env = "PDF2QUIZ_MAX_UPLOAD_MB", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub max_upload_mb: u64,
}

impl QuizArgs {
    /// Start a config builder from these flags.
    pub fn builder(&self) -> QuizConfigBuilder {
        let mut builder = pdf2quiz::QuizConfig::builder()
            .mode(self.mode)
            .provider_name(&self.provider)
            .model(&self.model)
            .rasterizer_backend(self.rasterizer)
            .pdftoppm_path(&self.pdftoppm)
            .dpi(self.dpi)
            .gemini_base_url(&self.gemini_base_url)
            .max_upload_bytes(self.max_upload_mb * 1024 * 1024);
        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }
        if let Some(secs) = self.api_timeout {
            builder = builder.api_timeout_secs(secs);
        }
        if let Some(ref dir) = self.upload_dir {
            builder = builder.upload_dir(dir);
        }
        builder
    }
}

/// Install the fmt subscriber on stderr. `RUST_LOG` wins over `default`.
pub fn init_tracing(default: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}
