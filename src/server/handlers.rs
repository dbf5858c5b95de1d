use super::AppState;
use crate::error::QuizError;
use crate::pipeline::input::{SavedUpload, UploadWriter};
use crate::pipeline::workspace::RequestWorkspace;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Form field that carries the PDF.
pub const PDF_FIELD: &str = "pdf";

/// Success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub quiz_questions: String,
}

/// Error body plus status. Only the public message leaves the process.
#[derive(Debug)]
pub struct ApiError(pub QuizError);

impl From<QuizError> for ApiError {
    fn from(e: QuizError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    /// Missing file is the only 400; everything else is a 500.
    pub fn status(&self) -> StatusCode {
        match self.0 {
            QuizError::MissingFile => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            warn!("Rejected upload: {}", self.0);
        } else {
            error!("Error processing PDF: {}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.public_message() });
        (status, Json(body)).into_response()
    }
}

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/process-pdf`
///
/// Streams the `pdf` field into a fresh workspace, runs the generator and
/// removes the workspace before answering.
pub async fn process_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<QuizResponse>, ApiError> {
    // Not multipart at all: treat like a form without the file.
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Multipart rejected: {}", rejection.body_text());
        QuizError::MissingFile
    })?;

    let workspace = state.generator.workspace().await?;
    let result = async {
        let saved = save_upload(&mut multipart, &workspace, state.generator.max_upload_bytes())
            .await?
            .ok_or(QuizError::MissingFile)?;
        state.generator.generate(&saved.path, &workspace).await
    }
    .await;
    workspace.close_async().await;

    let output = result?;
    info!(
        "Quiz generated: {} chars, {} attachment(s), {} ms",
        output.quiz_questions.len(),
        output.stats.attachments,
        output.stats.duration_ms
    );
    Ok(Json(QuizResponse {
        quiz_questions: output.quiz_questions,
    }))
}

/// Write the first `pdf` file part to `workspace`. `None` when there is none.
///
/// A part named `pdf` without a filename is a plain form value, not a file,
/// and is skipped like any other field.
async fn save_upload(
    multipart: &mut Multipart,
    workspace: &RequestWorkspace,
    limit: u64,
) -> Result<Option<SavedUpload>, QuizError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error(limit))? {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }
        if field.file_name().is_none() {
            debug!("Ignoring non-file `{}` field", PDF_FIELD);
            continue;
        }
        let mut writer = UploadWriter::create(&workspace.upload_path(), limit).await?;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error(limit))? {
            writer.write_chunk(&chunk).await?;
        }
        return writer.finish().await.map(Some);
    }
    Ok(None)
}

fn multipart_error(limit: u64) -> impl Fn(MultipartError) -> QuizError {
    move |e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            QuizError::FileTooLarge { limit_bytes: limit }
        } else {
            QuizError::Internal(format!("malformed multipart body: {}", e.body_text()))
        }
    }
}
