//! End-to-end tests for the HTTP surface with in-process collaborators

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use course_align::{
    config::AlignConfig,
    providers::{EmbeddingProvider, LocalDocumentStore},
    server::{
        state::{AppState, Collaborators},
        AlignServer,
    },
    storage::SubmissionDb,
    Error, FixedJitter, FrameworkChunk, FrameworkIndex, Result,
};

const BOUNDARY: &str = "XyZBoundary42";

const COURSE_TEXT: &str = "Week 1 lesson plan. Learning objectives: students will describe \
    bias in AI systems. The curriculum closes each module with a portfolio assessment \
    and a reflection activity.";

/// Returns a fixed vector and counts calls
struct CountingEmbedder {
    vector: Option<Vec<f32>>,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    fn new(vector: Option<Vec<f32>>) -> Arc<Self> {
        Arc::new(Self {
            vector,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vector
            .clone()
            .ok_or_else(|| Error::embedding("service unavailable"))
    }

    fn dimensions(&self) -> usize {
        2
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.vector.is_some())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

struct Harness {
    router: Router,
    state: AppState,
    embedder: Arc<CountingEmbedder>,
    dir: TempDir,
}

fn harness(vector: Option<Vec<f32>>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let embedder = CountingEmbedder::new(vector);
    let framework = FrameworkIndex::new(vec![
        FrameworkChunk::new("assessment_portfolio_001", "Assessment", "Portfolio-based assessment")
            .with_embedding(vec![1.0, 0.0]),
        FrameworkChunk::new("core_concepts_ethics_001", "Core Content", "Ethics across topics")
            .with_embedding(vec![0.6, 0.8]),
        FrameworkChunk::new("quality_assurance_001", "Quality Assurance", "Review cycles")
            .with_embedding(vec![0.0, 1.0]),
    ]);

    let config = AlignConfig::default();
    let state = AppState::with_collaborators(
        config.clone(),
        Collaborators {
            embedder: embedder.clone(),
            documents: Arc::new(LocalDocumentStore::new(dir.path().to_path_buf()).unwrap()),
            db: Arc::new(SubmissionDb::in_memory().unwrap()),
            framework,
            jitter: Box::new(FixedJitter(1.0)),
        },
    );
    let router = AlignServer::with_state(config, state.clone()).router();

    Harness {
        router,
        state,
        embedder,
        dir,
    }
}

fn multipart_body(files: &[(&str, &[u8])], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (filename, payload) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn upload(router: &Router, files: &[(&str, &[u8])]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload-files")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(files, &[("courseTitle", "AI Ethics")])))
        .unwrap();
    send(router, request).await
}

async fn analyze(router: &Router, submission_id: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze-course")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "submissionId": submission_id }).to_string()))
        .unwrap();
    send(router, request).await
}

#[tokio::test]
async fn test_health() {
    let h = harness(None);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_follows_ready_flag() {
    let h = harness(None);
    let ready = || Request::builder().uri("/ready").body(Body::empty()).unwrap();

    let response = h.router.clone().oneshot(ready()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    h.state.set_ready(false);
    let response = h.router.clone().oneshot(ready()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_info_reports_submission_count() {
    let h = harness(None);
    upload(&h.router, &[("syllabus.txt", COURSE_TEXT.as_bytes())]).await;

    let request = Request::builder().uri("/api/info").body(Body::empty()).unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submissions"], 1);
    assert_eq!(body["framework_chunks"], 3);
    assert_eq!(body["embedding_provider"], "counting");
}

#[tokio::test]
async fn test_upload_then_analyze_with_embeddings() {
    let h = harness(Some(vec![1.0, 0.0]));

    let (status, body) = upload(&h.router, &[("syllabus.txt", COURSE_TEXT.as_bytes())]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["filesUploaded"], 1);
    assert_eq!(body["submission"]["original_filenames"], json!(["syllabus.txt"]));
    assert_eq!(body["submission"]["form_fields"]["courseTitle"], "AI Ethics");
    let id = body["submission"]["id"].as_str().unwrap().to_string();

    let (status, body) = analyze(&h.router, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchCount"], 2);

    let results = body["analysisResults"].as_array().unwrap();
    assert_eq!(results[0]["category"], "Assessment");
    assert_eq!(results[0]["alignment_score"], 100);
    assert_eq!(results[1]["category"], "Core Content");
    assert_eq!(results[1]["alignment_score"], 60);
    assert!((body["overallScore"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 1);

    let request = Request::builder()
        .uri(format!("/api/submissions/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submission"]["analysis_status"], "completed");
    assert_eq!(body["analysis"]["framework_matches"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_binary_upload_is_stored_exactly() {
    let h = harness(None);
    let payload: &[u8] = &[0x0D, 0x0A, 0x00, 0xFF, 0x0D, 0x0A];

    let (status, body) = upload(&h.router, &[("blob.bin", payload)]).await;
    assert_eq!(status, StatusCode::OK);

    let path = body["submission"]["file_paths"][0].as_str().unwrap();
    let stored = std::fs::read(h.dir.path().join(path)).unwrap();
    assert_eq!(stored, payload);
}

#[tokio::test]
async fn test_embedding_failure_uses_keyword_estimate() {
    let h = harness(None);

    let (_, body) = upload(&h.router, &[("syllabus.txt", COURSE_TEXT.as_bytes())]).await;
    let id = body["submission"]["id"].as_str().unwrap().to_string();

    let (status, body) = analyze(&h.router, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchCount"], 0);
    assert_eq!(body["analysisResults"].as_array().unwrap().len(), 1);
    assert_eq!(body["analysisResults"][0]["title"], "Keyword-Based Alignment Estimate");
    assert_eq!(body["overallScore"], 0.0);
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_framework_match_reports_limited_alignment() {
    let h = harness(Some(vec![-1.0, 0.0]));

    let (_, body) = upload(&h.router, &[("syllabus.txt", COURSE_TEXT.as_bytes())]).await;
    let id = body["submission"]["id"].as_str().unwrap().to_string();

    let (status, body) = analyze(&h.router, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysisResults"][0]["title"], "Limited Framework Alignment");
    assert_eq!(body["analysisResults"][0]["alignment_score"], 15);
    assert_eq!(body["matchCount"], 0);
    assert_eq!(body["overallScore"], 0.0);

    let request = Request::builder()
        .uri(format!("/api/submissions/{}", id))
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&h.router, request).await;
    assert_eq!(body["analysis"]["detailed_feedback"]["total_matches"], 0);
}

#[tokio::test]
async fn test_short_text_skips_embedding_call() {
    let h = harness(Some(vec![1.0, 0.0]));

    let (_, body) = upload(&h.router, &[("note.txt", b"too short")]).await;
    let id = body["submission"]["id"].as_str().unwrap().to_string();

    let (status, body) = analyze(&h.router, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysisResults"][0]["title"], "Insufficient Content");
    assert_eq!(body["analysisResults"][0]["alignment_score"], 0);
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_multipart_upload_rejected() {
    let h = harness(None);
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload-files")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["type"], "unsupported_media_type");
}

#[tokio::test]
async fn test_missing_boundary_rejected() {
    let h = harness(None);
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload-files")
        .header(CONTENT_TYPE, "multipart/form-data")
        .body(Body::from(multipart_body(&[("a.txt", b"x")], &[])))
        .unwrap();

    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "malformed_body");
}

#[tokio::test]
async fn test_upload_without_files_rejected() {
    let h = harness(None);
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload-files")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(&[], &[("courseTitle", "Empty")])))
        .unwrap();

    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "bad_request");
}

#[tokio::test]
async fn test_analyze_unknown_submission() {
    let h = harness(None);
    let (status, body) = analyze(&h.router, "7f1c3a2e-9b4d-4c6e-8a1f-2d3b4c5e6f70").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn test_get_method_on_upload_not_allowed() {
    let h = harness(None);
    let request = Request::builder()
        .uri("/api/upload-files")
        .body(Body::empty())
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
