//! HTTP service: multipart PDF upload in, `{"quizQuestions": ...}` out.
//!
//! # Routes
//!
//! - `POST /api/process-pdf` - generate a quiz from the `pdf` form field
//! - `POST /.netlify/functions/process-pdf` - same handler, serverless path
//! - `GET /health` - liveness probe
//!
//! Anything else falls through to the static front-end directory when one is
//! configured.

mod handlers;

pub use handlers::{health_check, process_pdf, ApiError, QuizResponse, PDF_FIELD};

use crate::generate::QuizGenerator;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared, immutable request state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<QuizGenerator>,
}

impl AppState {
    pub fn new(generator: QuizGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}

/// Build the application router.
///
/// The body limit sits slightly above the file limit; the upload writer
/// enforces the exact figure while streaming the `pdf` field.
pub fn router(state: AppState, public_dir: Option<PathBuf>) -> Router {
    let body_limit = usize::try_from(state.generator.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let mut app = Router::new()
        .route("/api/process-pdf", post(process_pdf))
        .route("/.netlify/functions/process-pdf", post(process_pdf))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    if let Some(dir) = public_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
