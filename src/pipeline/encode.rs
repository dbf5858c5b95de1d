//! Attachment encoding: files on disk → base64 blobs tagged with a MIME type.
//!
//! The Gemini `generateContent` API takes binary content as `inline_data`
//! parts inside the JSON body, so every attachment is read fully and
//! base64-encoded here. Which files become attachments depends on the
//! [`AttachmentMode`]: the rasterised pages in page order, or the PDF itself.

use crate::config::AttachmentMode;
use crate::error::QuizError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// MIME type of a raw PDF attachment.
pub const PDF_MIME: &str = "application/pdf";
/// MIME type of a rendered page attachment.
pub const PNG_MIME: &str = "image/png";

/// One inline binary attachment of an inference request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// `application/pdf` or `image/png`.
    pub mime_type: String,
    /// Standard base64 of the file contents.
    pub data: String,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }
}

/// The document content to attach, one variant per [`AttachmentMode`].
#[derive(Debug, Clone)]
pub enum AttachmentSource {
    /// Rendered page images, already in page order.
    PageImages(Vec<PathBuf>),
    /// The PDF file itself.
    RawDocument(PathBuf),
}

impl AttachmentSource {
    pub fn mode(&self) -> AttachmentMode {
        match self {
            AttachmentSource::PageImages(_) => AttachmentMode::PageImages,
            AttachmentSource::RawDocument(_) => AttachmentMode::RawDocument,
        }
    }

    /// Read and encode every file of this source, preserving order.
    ///
    /// Files that have vanished since they were listed are skipped with a
    /// warning. An empty result is an error: a quiz request without any
    /// document content would only make the model invent one.
    pub async fn encode(&self) -> Result<Vec<Attachment>, QuizError> {
        let (paths, mime): (&[PathBuf], &str) = match self {
            AttachmentSource::PageImages(pages) => (pages.as_slice(), PNG_MIME),
            AttachmentSource::RawDocument(pdf) => (std::slice::from_ref(pdf), PDF_MIME),
        };

        let mut attachments = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(a) = encode_file(path, mime).await? {
                attachments.push(a);
            }
        }

        if attachments.is_empty() {
            return Err(match self {
                AttachmentSource::PageImages(_) => QuizError::ConversionFailure {
                    detail: "no page images available to attach".into(),
                },
                AttachmentSource::RawDocument(pdf) => QuizError::FileNotFound { path: pdf.clone() },
            });
        }
        Ok(attachments)
    }
}

/// Read `path` and wrap it as an attachment, or `None` if it does not exist.
pub async fn encode_file(path: &Path, mime_type: &str) -> Result<Option<Attachment>, QuizError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let attachment = Attachment::new(mime_type, &bytes);
            debug!(
                "Encoded {} ({} bytes) → {} bytes base64",
                path.display(),
                bytes.len(),
                attachment.data.len()
            );
            Ok(Some(attachment))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Skipping missing attachment {}", path.display());
            Ok(None)
        }
        Err(e) => Err(QuizError::fs(path, e)),
    }
}
