//! Progress-callback trait for quiz generation stages.
//!
//! Inject an [`Arc<dyn QuizProgressCallback>`] via
//! [`crate::config::QuizConfigBuilder::progress_callback`] to be told when
//! each stage of a run starts or finishes. The CLI uses it to print the
//! `Processing PDF` / `Converted N pages` lines and drive its spinner; the
//! server leaves it unset.
//!
//! # Example
//!
//! ```rust
//! use pdf2quiz::{QuizConfig, QuizProgressCallback};
//! use std::sync::Arc;
//!
//! struct PrintPages;
//!
//! impl QuizProgressCallback for PrintPages {
//!     fn on_pages_rendered(&self, page_count: usize) {
//!         println!("Converted {page_count} pages to images");
//!     }
//! }
//!
//! let config = QuizConfig::builder()
//!     .progress_callback(Arc::new(PrintPages) as Arc<dyn QuizProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the generator as a run moves through its stages.
///
/// All methods default to no-ops so implementors only override what they
/// need. Implementations must be `Send + Sync` because the server shares one
/// generator across request tasks.
pub trait QuizProgressCallback: Send + Sync {
    /// Called once when a PDF enters the pipeline.
    fn on_start(&self, pdf_path: &Path) {
        let _ = pdf_path;
    }

    /// Called after rasterisation with the number of pages found (may be 0).
    fn on_pages_rendered(&self, page_count: usize) {
        let _ = page_count;
    }

    /// Called just before the inference request is sent.
    fn on_generation_start(&self, attachment_count: usize) {
        let _ = attachment_count;
    }

    /// Called when the model returned text.
    fn on_complete(&self, quiz_len: usize) {
        let _ = quiz_len;
    }

    /// Called when the run failed.
    fn on_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl QuizProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::QuizConfig`].
pub type ProgressCallback = Arc<dyn QuizProgressCallback>;
