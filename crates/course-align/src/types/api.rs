//! HTTP request and response bodies

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::finding::Finding;
use super::submission::{AnalysisRecord, Submission};

/// Body of `POST /api/analyze-course`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Submission to analyze
    pub submission_id: Uuid,
    /// Files to read; defaults to the submission's stored paths when empty
    #[serde(default)]
    pub file_paths: Vec<String>,
}

/// Response of `POST /api/analyze-course`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// Always true on a 200 response
    pub success: bool,
    /// Findings in classification order
    pub analysis_results: Vec<Finding>,
    /// Number of findings
    pub match_count: usize,
    /// Aggregate score (mean similarity, two decimals)
    pub overall_score: f64,
}

/// Response of `POST /api/upload-files`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always true on a 200 response
    pub success: bool,
    /// Created submission
    pub submission: Submission,
    /// Number of file parts stored
    pub files_uploaded: usize,
    /// Multipart sections skipped as malformed
    pub dropped_parts: usize,
}

/// Response of `GET /api/submissions/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    /// Submission record
    pub submission: Submission,
    /// Most recent analysis, if any
    pub analysis: Option<AnalysisRecord>,
}
