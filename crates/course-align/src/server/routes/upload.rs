//! Course file upload endpoint

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use bytes::Bytes;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::multipart;
use crate::server::state::AppState;
use crate::types::{Submission, UploadResponse};

/// POST /api/upload-files - Store uploaded files and create a submission
///
/// The raw body is parsed here rather than through a streaming extractor so
/// file payloads reach storage byte-for-byte.
pub async fn upload_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !content_type.trim_start().to_ascii_lowercase().starts_with("multipart/") {
        return Err(Error::UnsupportedMediaType(content_type.to_string()));
    }

    let form = multipart::parse_with_content_type(&body, content_type)?;
    if form.dropped() > 0 {
        tracing::warn!("Upload contained {} malformed parts, skipped", form.dropped());
    }

    let files: Vec<_> = form.files().collect();
    if files.is_empty() {
        return Err(Error::bad_request("No files provided"));
    }

    let submission_id = Uuid::new_v4();
    let mut file_paths = Vec::with_capacity(files.len());
    let mut original_filenames = Vec::with_capacity(files.len());

    for (index, part) in files.iter().enumerate() {
        let filename = part.file_name.clone().unwrap_or_default();
        let path = state
            .documents()
            .store(&submission_id, index, &filename, &part.payload)
            .await?;

        tracing::info!("Stored {} ({} bytes) as {}", filename, part.payload.len(), path);
        file_paths.push(path);
        original_filenames.push(filename);
    }

    let submission = Submission::uploaded(
        submission_id,
        file_paths,
        original_filenames,
        form.field_map(),
    );
    state.db().create_submission(&submission)?;

    tracing::info!(
        "Created submission {} with {} files",
        submission.id,
        submission.file_paths.len()
    );

    Ok(Json(UploadResponse {
        success: true,
        files_uploaded: submission.file_paths.len(),
        dropped_parts: form.dropped(),
        submission,
    }))
}
