//! Submission lookup endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::SubmissionDetail;

/// GET /api/submissions/:id - Submission with its latest analysis
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionDetail>> {
    let submission = state
        .db()
        .get_submission(&id)?
        .ok_or_else(|| Error::SubmissionNotFound(id.to_string()))?;

    let analysis = state.db().latest_analysis(&id)?;

    Ok(Json(SubmissionDetail {
        submission,
        analysis,
    }))
}
