//! HTTP contract tests for the quiz service.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! model and rasteriser are fakes, so no network or poppler is needed.

#![cfg(feature = "server")]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pdf2quiz::prompts::PAGE_IMAGES_PROMPT;
use pdf2quiz::server::{self, AppState};
use pdf2quiz::{
    AttachmentMode, InferenceRequest, ModelResponse, QuizConfig, QuizError, QuizGenerator,
    QuizModel, Rasterizer,
};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const BOUNDARY: &str = "pdf2quiz-test-boundary";
const QUIZ: &str = "Grade level: middle school

1. What do plants need for photosynthesis?
A) Sunlight  B) Sand  C) Salt  D) Smoke
Answer: A

2. Which part of the leaf absorbs light?
A) Root  B) Chlorophyll  C) Stem  D) Bark
Answer: B

3. What gas do plants release?
A) Nitrogen  B) Helium  C) Oxygen  D) Argon
Answer: C

4. In the diagram, which arrow points to the stomata?
A) Arrow 1  B) Arrow 2  C) Arrow 3  D) Arrow 4
Answer: D

5. Where does photosynthesis take place?
A) Chloroplast  B) Nucleus  C) Cell wall  D) Vacuole
Answer: A";

// ── Fakes ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeModel {
    requests: Mutex<Vec<InferenceRequest>>,
    fail: bool,
}

impl FakeModel {
    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl QuizModel for FakeModel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<ModelResponse, QuizError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(QuizError::InferenceFailure {
                provider: "fake".into(),
                detail: "API key invalid".into(),
            });
        }
        Ok(ModelResponse::text(QUIZ))
    }
}

/// Writes `pages` PNG files; zero pages simulates a rasteriser that failed.
struct FakeRasterizer {
    pages: usize,
}

impl Rasterizer for FakeRasterizer {
    fn name(&self) -> &str {
        "fake"
    }

    fn rasterize(&self, _pdf: &Path, out_dir: &Path, prefix: &str) -> Result<(), QuizError> {
        if self.pages == 0 {
            return Err(QuizError::ConversionFailure {
                detail: "corrupt PDF".into(),
            });
        }
        for n in 1..=self.pages {
            std::fs::write(out_dir.join(format!("{prefix}-{n}.png")), b"\x89PNG")
                .map_err(|e| QuizError::fs(out_dir, e))?;
        }
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Harness {
    app: Router,
    model: Arc<FakeModel>,
    upload_root: tempfile::TempDir,
}

fn harness(model: FakeModel, pages: usize, mode: AttachmentMode, limit: u64) -> Harness {
    let upload_root = tempfile::tempdir().unwrap();
    let model = Arc::new(model);
    let config = QuizConfig::builder()
        .mode(mode)
        .quiz_model(model.clone())
        .rasterizer(Arc::new(FakeRasterizer { pages }))
        .upload_dir(upload_root.path())
        .max_upload_bytes(limit)
        .build()
        .unwrap();
    let generator = QuizGenerator::from_config(&config).unwrap();
    Harness {
        app: server::router(AppState::new(generator), None),
        model,
        upload_root,
    }
}

fn default_harness() -> Harness {
    harness(
        FakeModel::default(),
        3,
        AttachmentMode::PageImages,
        10 * 1024 * 1024,
    )
}

fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"lesson.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// A form with a single plain-text value, no filename.
fn text_field_body(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n\
         {value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn upload(uri: &str, field: &str, data: &[u8]) -> Request<Body> {
    multipart_request(uri, multipart_body(field, data))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_no_leftovers(root: &Path) {
    let left: Vec<_> = std::fs::read_dir(root).unwrap().collect();
    assert!(left.is_empty(), "request left files behind: {left:?}");
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn valid_pdf_returns_quiz() {
    let h = default_harness();
    let (status, body) = send(h.app.clone(), upload("/api/process-pdf", "pdf", b"%PDF-1.7")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "quizQuestions": QUIZ }));

    let requests = h.model.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.prompt, PAGE_IMAGES_PROMPT);
    assert_eq!(request.attachments.len(), 3);
    assert!(request.attachments.iter().all(|a| a.mime_type == "image/png"));
    drop(requests);
    assert_eq!(QUIZ.matches("Answer:").count(), 5);
    assert_no_leftovers(h.upload_root.path());
}

#[tokio::test]
async fn serverless_route_behaves_the_same() {
    let h = default_harness();
    let (status, body) = send(
        h.app.clone(),
        upload("/.netlify/functions/process-pdf", "pdf", b"%PDF-1.7"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quizQuestions"], QUIZ);
    assert_no_leftovers(h.upload_root.path());
}

#[tokio::test]
async fn raw_document_mode_sends_one_pdf_part() {
    let h = harness(
        FakeModel::default(),
        0,
        AttachmentMode::RawDocument,
        10 * 1024 * 1024,
    );
    let (status, _) = send(h.app.clone(), upload("/api/process-pdf", "pdf", b"%PDF-1.7")).await;

    assert_eq!(status, StatusCode::OK);
    let requests = h.model.requests.lock().unwrap();
    assert_eq!(requests[0].attachments.len(), 1);
    assert_eq!(requests[0].attachments[0].mime_type, "application/pdf");
}

#[tokio::test]
async fn missing_pdf_field_is_400() {
    let h = default_harness();
    let (status, body) = send(h.app.clone(), upload("/api/process-pdf", "document", b"%PDF")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "No PDF file uploaded" }));
    assert_eq!(h.model.calls(), 0);
    assert_no_leftovers(h.upload_root.path());
}

#[tokio::test]
async fn text_value_named_pdf_is_not_a_file() {
    for mode in [AttachmentMode::PageImages, AttachmentMode::RawDocument] {
        let h = harness(FakeModel::default(), 3, mode, 10 * 1024 * 1024);
        let request = multipart_request("/api/process-pdf", text_field_body("pdf", "just some text"));
        let (status, body) = send(h.app.clone(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{mode} mode");
        assert_eq!(body, serde_json::json!({ "error": "No PDF file uploaded" }));
        assert_eq!(h.model.calls(), 0);
        assert_no_leftovers(h.upload_root.path());
    }
}

#[tokio::test]
async fn non_multipart_request_is_400() {
    let h = default_harness();
    let request = Request::builder()
        .method("POST")
        .uri("/api/process-pdf")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(h.app.clone(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No PDF file uploaded");
}

#[tokio::test]
async fn oversize_upload_is_generic_500() {
    let limit: u64 = 1024 * 1024;
    // Just over the file limit, and far over the whole-body limit.
    for size in [limit as usize + 10, 3 * limit as usize] {
        let h = harness(FakeModel::default(), 1, AttachmentMode::PageImages, limit);
        let data = vec![b'x'; size];
        let (status, body) = send(h.app.clone(), upload("/api/process-pdf", "pdf", &data)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{size} bytes");
        assert_eq!(body, serde_json::json!({ "error": "Failed to process PDF" }));
        assert_eq!(h.model.calls(), 0);
        assert_no_leftovers(h.upload_root.path());
    }
}

#[tokio::test]
async fn zero_pages_is_conversion_error_without_model_call() {
    let h = harness(
        FakeModel::default(),
        0,
        AttachmentMode::PageImages,
        10 * 1024 * 1024,
    );
    let (status, body) = send(h.app.clone(), upload("/api/process-pdf", "pdf", b"%PDF-1.7")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Failed to convert PDF to images" }));
    assert_eq!(h.model.calls(), 0);
    assert_no_leftovers(h.upload_root.path());
}

#[tokio::test]
async fn model_failure_is_generic_500() {
    let h = harness(
        FakeModel {
            fail: true,
            ..Default::default()
        },
        2,
        AttachmentMode::PageImages,
        10 * 1024 * 1024,
    );
    let (status, body) = send(h.app.clone(), upload("/api/process-pdf", "pdf", b"%PDF-1.7")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // Upstream detail stays in the logs.
    assert_eq!(body, serde_json::json!({ "error": "Failed to process PDF" }));
    assert_eq!(h.model.calls(), 1);
    assert_no_leftovers(h.upload_root.path());
}

#[tokio::test]
async fn health_reports_ok() {
    let h = default_harness();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(h.app.clone(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn concurrent_requests_do_not_collide() {
    let h = default_harness();
    let a = send(h.app.clone(), upload("/api/process-pdf", "pdf", b"%PDF-a"));
    let b = send(h.app.clone(), upload("/api/process-pdf", "pdf", b"%PDF-b"));
    let ((sa, _), (sb, _)) = tokio::join!(a, b);

    assert_eq!(sa, StatusCode::OK);
    assert_eq!(sb, StatusCode::OK);
    assert_eq!(h.model.calls(), 2);
    assert_no_leftovers(h.upload_root.path());
}
