//! Configuration types for quiz generation.
//!
//! All generation behaviour is controlled through [`QuizConfig`], built via
//! its [`QuizConfigBuilder`]. Both binaries map their clap arguments (which
//! fall back to environment variables) onto this one struct, and library users
//! can do the same without touching the environment at all.

use crate::error::QuizError;
use crate::pipeline::inference::QuizModel;
use crate::pipeline::rasterize::Rasterizer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Default Gemini model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Default provider name. `gemini` is called natively; anything else goes through edgequake-llm.
pub const DEFAULT_PROVIDER: &str = "gemini";
/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default upload limit: 10 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration for a quiz generation run.
///
/// Built via [`QuizConfig::builder()`] or using [`QuizConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2quiz::{AttachmentMode, QuizConfig};
///
/// let config = QuizConfig::builder()
///     .mode(AttachmentMode::RawDocument)
///     .model("gemini-2.0-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct QuizConfig {
    /// How the document is attached to the inference request. Default: page images.
    pub mode: AttachmentMode,

    /// Provider name. Default: `gemini`.
    pub provider_name: String,

    /// Model identifier. Default: `gemini-2.0-flash`.
    pub model: String,

    /// Gemini API key. If None, `GOOGLE_API_KEY` then `GEMINI_API_KEY` are read.
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API.
    pub gemini_base_url: String,

    /// Pre-constructed model client. Takes precedence over `provider_name`.
    pub quiz_model: Option<Arc<dyn QuizModel>>,

    /// Which rasteriser renders pages in [`AttachmentMode::PageImages`]. Default: pdftoppm.
    pub rasterizer_backend: RasterizerBackend,

    /// Pre-constructed rasteriser. Takes precedence over `rasterizer_backend`.
    pub rasterizer: Option<Arc<dyn Rasterizer>>,

    /// Path or name of the `pdftoppm` executable.
    pub pdftoppm_path: PathBuf,

    /// Rendering DPI. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Sampling temperature passed to the model, if set.
    pub temperature: Option<f32>,

    /// Per-inference-call timeout in seconds. None waits indefinitely.
    pub api_timeout_secs: Option<u64>,

    /// Maximum accepted upload size in bytes. Default: 10 MB.
    pub max_upload_bytes: u64,

    /// Root directory for per-request workspaces. Created on first use.
    pub upload_dir: PathBuf,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            mode: AttachmentMode::default(),
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            quiz_model: None,
            rasterizer_backend: RasterizerBackend::default(),
            rasterizer: None,
            pdftoppm_path: PathBuf::from("pdftoppm"),
            dpi: 150,
            temperature: None,
            api_timeout_secs: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_dir: std::env::temp_dir().join("pdf2quiz"),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("mode", &self.mode)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("quiz_model", &self.quiz_model.as_ref().map(|_| "<dyn QuizModel>"))
            .field("rasterizer_backend", &self.rasterizer_backend)
            .field("rasterizer", &self.rasterizer.as_ref().map(|_| "<dyn Rasterizer>"))
            .field("pdftoppm_path", &self.pdftoppm_path)
            .field("dpi", &self.dpi)
            .field("temperature", &self.temperature)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`QuizConfig`].
#[derive(Debug)]
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl QuizConfigBuilder {
    pub fn mode(mut self, mode: AttachmentMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini_base_url = url.into();
        self
    }

    pub fn quiz_model(mut self, model: Arc<dyn QuizModel>) -> Self {
        self.config.quiz_model = Some(model);
        self
    }

    pub fn rasterizer_backend(mut self, backend: RasterizerBackend) -> Self {
        self.config.rasterizer_backend = backend;
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn pdftoppm_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdftoppm_path = path.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, QuizError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(QuizError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.max_upload_bytes == 0 {
            return Err(QuizError::InvalidConfig(
                "Upload limit must be greater than zero".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(QuizError::InvalidConfig("Model must not be empty".into()));
        }
        // Only the native Gemini client can inline `application/pdf`; the
        // edgequake-llm providers take images only.
        if c.mode == AttachmentMode::RawDocument
            && c.quiz_model.is_none()
            && !c.provider_name.trim().eq_ignore_ascii_case(DEFAULT_PROVIDER)
        {
            return Err(QuizError::InvalidConfig(format!(
                "Document mode sends the PDF itself, which only the '{}' provider accepts; \
                 use --mode images with provider '{}'",
                DEFAULT_PROVIDER,
                c.provider_name.trim()
            )));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(QuizError::InvalidConfig(
                "API timeout must be at least 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the PDF reaches the model.
///
/// | Mode | Attachments | Needs a rasteriser |
/// |------|-------------|--------------------|
/// | `PageImages` | one `image/png` per page, in page order (default) | yes |
/// | `RawDocument` | the whole file as `application/pdf` | no |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentMode {
    /// Rasterise every page and attach the PNGs.
    #[default]
    PageImages,
    /// Attach the PDF bytes directly.
    RawDocument,
}

impl FromStr for AttachmentMode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "images" | "image" | "pages" | "page-images" => Ok(AttachmentMode::PageImages),
            "document" | "pdf" | "raw" | "raw-document" => Ok(AttachmentMode::RawDocument),
            other => Err(QuizError::InvalidConfig(format!(
                "Unknown attachment mode '{other}' (expected 'images' or 'document')"
            ))),
        }
    }
}

impl fmt::Display for AttachmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentMode::PageImages => f.write_str("images"),
            AttachmentMode::RawDocument => f.write_str("document"),
        }
    }
}

/// Rendering engine used in [`AttachmentMode::PageImages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterizerBackend {
    /// Shell out to poppler's `pdftoppm` (default).
    #[default]
    Pdftoppm,
    /// Render in-process with pdfium (requires the `pdfium` feature).
    Pdfium,
}

impl FromStr for RasterizerBackend {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdftoppm" | "poppler" => Ok(RasterizerBackend::Pdftoppm),
            "pdfium" => Ok(RasterizerBackend::Pdfium),
            other => Err(QuizError::InvalidConfig(format!(
                "Unknown rasterizer '{other}' (expected 'pdftoppm' or 'pdfium')"
            ))),
        }
    }
}
