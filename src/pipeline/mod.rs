//! Pipeline stages for quiz generation.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and swapped (another rasteriser, another model) without touching the
//! rest.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ workspace ──▶ rasterize ──▶ encode ──▶ inference
//! (path/upload) (temp dir)  (pdftoppm)   (base64)   (Gemini)
//! ```
//!
//! 1. [`input`]: validate a local path, or stream an upload to disk
//! 2. [`workspace`]: unique per-request directory, removed on every exit path
//! 3. [`rasterize`]: render pages to PNG and order them by page number
//!    (page-image mode only)
//! 4. [`encode`]: base64-wrap the pages or the PDF with its MIME type
//! 5. [`inference`]: one request to the model; the only stage with network I/O

pub mod encode;
pub mod inference;
pub mod input;
pub mod rasterize;
pub mod workspace;
