//! Course analysis endpoint

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::ingestion::extract_text;
use crate::server::state::AppState;
use crate::types::{AnalysisStatus, AnalyzeRequest, AnalyzeResponse, Finding};

/// POST /api/analyze-course - Classify a submission's files
///
/// Collaborator failures past request validation are logged and degrade the
/// result; they never fail the request.
pub async fn analyze_course(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    let submission_id = request.submission_id;

    let stored_paths = match state.db().get_submission(&submission_id) {
        Ok(Some(submission)) => submission.file_paths,
        Ok(None) => return Err(Error::SubmissionNotFound(submission_id.to_string())),
        Err(e) => {
            tracing::error!("Failed to look up submission {}: {}", submission_id, e);
            Vec::new()
        }
    };

    let file_paths = if request.file_paths.is_empty() {
        stored_paths
    } else {
        request.file_paths
    };
    if file_paths.is_empty() {
        return Err(Error::bad_request("No files to analyze"));
    }

    tracing::info!(
        "Analyzing submission {} ({} files)",
        submission_id,
        file_paths.len()
    );
    update_status(&state, &submission_id, AnalysisStatus::Processing);

    let texts = extract_texts(&state, &file_paths).await;
    let combined = texts.join("\n\n");
    let findings = classify_text(&state, &combined).await;

    match state.db().store_analysis(&submission_id, &findings) {
        Ok(_) => update_status(&state, &submission_id, AnalysisStatus::Completed),
        Err(e) => {
            tracing::error!("Failed to store analysis for {}: {}", submission_id, e);
            update_status(&state, &submission_id, AnalysisStatus::Failed);
        }
    }

    let overall_score = Finding::overall_score(&findings);
    tracing::info!(
        "Submission {} analyzed: {} findings, overall score {:.2}",
        submission_id,
        findings.len(),
        overall_score
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        match_count: Finding::match_count(&findings),
        analysis_results: findings,
        overall_score,
    }))
}

/// Fetch and extract every file; unreadable or blank files are skipped
async fn extract_texts(state: &AppState, file_paths: &[String]) -> Vec<String> {
    let mut texts = Vec::with_capacity(file_paths.len());

    for path in file_paths {
        match state.documents().fetch(path).await {
            Ok(data) => {
                let text = extract_text(path, &data);
                if text.trim().is_empty() {
                    tracing::debug!("No text extracted from {}", path);
                } else {
                    texts.push(text);
                }
            }
            Err(e) => tracing::error!("Failed to fetch {}: {}", path, e),
        }
    }

    texts
}

/// Screen, embed, search and classify
///
/// The embedding call is skipped entirely for text the engine would reject.
async fn classify_text(state: &AppState, text: &str) -> Vec<Finding> {
    let embedding = if state.engine().screen(text).is_eligible() {
        embed_with_timeout(state, text).await
    } else {
        None
    };

    let chunks = embedding
        .as_deref()
        .map(|embedding| state.search_framework(embedding));

    let mut jitter = state.jitter();
    state
        .engine()
        .classify(text, chunks.as_deref(), embedding.as_deref(), &mut **jitter)
}

/// Embedding or `None` on failure or timeout
///
/// The timeout spans all retries of the provider, not a single request.
async fn embed_with_timeout(state: &AppState, text: &str) -> Option<Vec<f32>> {
    let timeout = state.config().embeddings.call_budget();
    let embedder = state.embedder();

    match tokio::time::timeout(timeout, embedder.embed(text)).await {
        Ok(Ok(embedding)) if !embedding.is_empty() => Some(embedding),
        Ok(Ok(_)) => {
            tracing::warn!("Embedding provider {} returned an empty vector", embedder.name());
            None
        }
        Ok(Err(e)) => {
            tracing::warn!("Embedding failed ({}), falling back to keyword estimate", e);
            None
        }
        Err(_) => {
            tracing::warn!("Embedding timed out after {:?}, falling back to keyword estimate", timeout);
            None
        }
    }
}

fn update_status(state: &AppState, submission_id: &uuid::Uuid, status: AnalysisStatus) {
    if let Err(e) = state.db().set_analysis_status(submission_id, status) {
        tracing::error!(
            "Failed to set analysis status of {} to {}: {}",
            submission_id,
            status.as_str(),
            e
        );
    }
}
