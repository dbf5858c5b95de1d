//! Input intake: a local PDF path (CLI) or an uploaded byte stream (server).
//!
//! Local paths are checked for existence, read permission and the `%PDF`
//! magic bytes up front, so the user gets a clear message instead of a
//! rasteriser failure.
//!
//! Uploads are written chunk by chunk through [`UploadWriter`], which enforces
//! the size limit while streaming: an oversize upload is rejected as soon as
//! it crosses the limit instead of after it has been buffered.

use crate::error::QuizError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Resolve a local file path, validating existence and PDF magic bytes.
pub fn resolve_local(path_str: &str) -> Result<PathBuf, QuizError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(QuizError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(QuizError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(QuizError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(QuizError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// A completed upload on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedUpload {
    pub path: PathBuf,
    pub size: u64,
}

/// Streams an upload to disk, enforcing a byte limit.
#[derive(Debug)]
pub struct UploadWriter {
    file: tokio::fs::File,
    path: PathBuf,
    written: u64,
    limit: u64,
}

impl UploadWriter {
    /// Create (or truncate) the destination file.
    pub async fn create(path: &Path, limit: u64) -> Result<Self, QuizError> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| QuizError::fs(path, e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            written: 0,
            limit,
        })
    }

    /// Append one chunk. Fails with [`QuizError::FileTooLarge`] once the
    /// total would exceed the limit; nothing past the limit is written.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), QuizError> {
        let next = self.written + chunk.len() as u64;
        if next > self.limit {
            return Err(QuizError::FileTooLarge {
                limit_bytes: self.limit,
            });
        }
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| QuizError::fs(&self.path, e))?;
        self.written = next;
        Ok(())
    }

    /// Flush and close the file.
    pub async fn finish(mut self) -> Result<SavedUpload, QuizError> {
        self.file
            .flush()
            .await
            .map_err(|e| QuizError::fs(&self.path, e))?;
        info!("Saved upload {} ({} bytes)", self.path.display(), self.written);
        Ok(SavedUpload {
            path: self.path,
            size: self.written,
        })
    }
}
