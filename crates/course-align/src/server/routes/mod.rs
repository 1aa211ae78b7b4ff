//! API routes for the alignment server

pub mod analyze;
pub mod submissions;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for course files
        .route(
            "/upload-files",
            post(upload::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/analyze-course", post(analyze::analyze_course))
        .route("/submissions/:id", get(submissions::get_submission))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let submissions = state.db().count_submissions().unwrap_or_else(|e| {
        tracing::warn!("Failed to count submissions: {}", e);
        0
    });

    Json(serde_json::json!({
        "name": "course-align",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Course material alignment against a reference education framework",
        "endpoints": {
            "POST /api/upload-files": "Upload course files (multipart/form-data)",
            "POST /api/analyze-course": "Classify a submission against the framework",
            "GET /api/submissions/:id": "Get a submission and its latest analysis",
        },
        "embedding_provider": state.embedder().name(),
        "framework_chunks": state.framework_size(),
        "submissions": submissions,
        "similarity_floor": state.config().classification.similarity_floor,
    }))
}
