//! Error types for the pdf2quiz library.
//!
//! A single [`QuizError`] covers every failure a quiz run can hit, from a
//! missing upload to a rejected inference call. Each variant carries enough
//! detail for the logs; [`QuizError::public_message`] reduces it to the short,
//! fixed string an HTTP caller is allowed to see.

use std::path::PathBuf;
use thiserror::Error;

/// Public message for a request without a `pdf` file field.
pub const MSG_MISSING_FILE: &str = "No PDF file uploaded";
/// Public message when rasterisation produced no pages.
pub const MSG_CONVERSION_FAILED: &str = "Failed to convert PDF to images";
/// Public message for every other failure.
pub const MSG_PROCESSING_FAILED: &str = "Failed to process PDF";

/// All errors returned by the pdf2quiz library.
#[derive(Debug, Error)]
pub enum QuizError {
    // ── Intake errors ─────────────────────────────────────────────────────
    /// The multipart request carried no `pdf` file field.
    #[error("No PDF file uploaded")]
    MissingFile,

    /// The upload exceeded the configured size limit.
    #[error("Upload exceeds the {limit_bytes} byte limit")]
    FileTooLarge { limit_bytes: u64 },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The rasteriser failed or produced no pages, or no attachment could be built.
    #[error("PDF conversion failed: {detail}")]
    ConversionFailure { detail: String },

    // ── Inference errors ──────────────────────────────────────────────────
    /// The inference API call failed (auth, quota, network, malformed response).
    #[error("Inference call to '{provider}' failed: {detail}")]
    InferenceFailure { provider: String, detail: String },

    /// The configured provider cannot be constructed (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading, writing or deleting a file failed.
    #[error("File system error on '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuizError {
    /// Shorthand for wrapping an `io::Error` with the path it concerns.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QuizError::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QuizError::MissingFile | QuizError::FileTooLarge { .. }
        )
    }

    /// The short message safe to return to an HTTP caller.
    ///
    /// Never includes paths, provider names or upstream error text.
    pub fn public_message(&self) -> String {
        match self {
            QuizError::MissingFile => MSG_MISSING_FILE.to_string(),
            QuizError::ConversionFailure { .. } => MSG_CONVERSION_FAILED.to_string(),
            _ => MSG_PROCESSING_FAILED.to_string(),
        }
    }
}
