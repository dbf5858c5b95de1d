//! Per-request scratch directory with guaranteed cleanup.
//!
//! Every request gets its own `quiz-XXXXXX` directory under the upload root.
//! The uploaded PDF and all rendered pages live inside it, so removing the
//! directory removes everything the request created. Two concurrent requests
//! can never see each other's files.
//!
//! [`RequestWorkspace::close`] removes the tree and reports unexpected
//! failures through the log. If a handler returns early or panics before
//! calling it, dropping the workspace removes the tree anyway.

use crate::error::QuizError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// File name of the saved upload inside a workspace.
pub const UPLOAD_FILE_NAME: &str = "upload.pdf";
/// Sub-directory that receives rendered page images.
pub const PAGES_DIR_NAME: &str = "pages";

/// A unique directory owned by one request.
#[derive(Debug)]
pub struct RequestWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl RequestWorkspace {
    /// Create a fresh workspace under `root`, creating `root` if it is missing.
    pub fn create(root: &Path) -> Result<Self, QuizError> {
        std::fs::create_dir_all(root).map_err(|e| QuizError::fs(root, e))?;

        let dir = tempfile::Builder::new()
            .prefix("quiz-")
            .tempdir_in(root)
            .map_err(|e| QuizError::fs(root, e))?;
        let path = dir.path().to_path_buf();
        debug!("Created request workspace {}", path.display());

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// [`create`](Self::create) on the blocking pool, for async callers.
    pub async fn create_async(root: &Path) -> Result<Self, QuizError> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || Self::create(&root))
            .await
            .map_err(|e| QuizError::Internal(format!("workspace task failed: {e}")))?
    }

    /// Root of this workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the uploaded PDF is stored.
    pub fn upload_path(&self) -> PathBuf {
        self.path.join(UPLOAD_FILE_NAME)
    }

    /// Directory for rendered pages, created on demand.
    pub fn pages_dir(&self) -> Result<PathBuf, QuizError> {
        let dir = self.path.join(PAGES_DIR_NAME);
        std::fs::create_dir_all(&dir).map_err(|e| QuizError::fs(&dir, e))?;
        Ok(dir)
    }

    /// Remove the workspace and everything in it.
    ///
    /// A directory that is already gone is fine. Any other failure is logged
    /// and not returned: the response to the caller must not depend on it.
    pub fn close(mut self) {
        if let Some(dir) = self.dir.take() {
            remove_quietly(dir);
        }
    }

    /// [`close`](Self::close) on the blocking pool.
    ///
    /// Removing a workspace deletes every rendered page, which is a recursive
    /// directory walk; async handlers use this instead of `close`.
    pub async fn close_async(mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = tokio::task::spawn_blocking(move || remove_quietly(dir)).await {
                warn!("Workspace removal task failed: {}", e);
            }
        }
    }
}

impl Drop for RequestWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            remove_quietly(dir);
        }
    }
}

fn remove_quietly(dir: TempDir) {
    let path = dir.path().to_path_buf();
    match dir.close() {
        Ok(()) => debug!("Removed request workspace {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Request workspace {} was already removed", path.display())
        }
        Err(e) => warn!(
            "Failed to remove request workspace {}: {}",
            path.display(),
            e
        ),
    }
}
