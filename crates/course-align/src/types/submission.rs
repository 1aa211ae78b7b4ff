//! Course submissions and their stored analyses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::finding::Finding;

/// Upload lifecycle of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Files stored
    Uploaded,
    /// Upload rejected or storage failed
    Failed,
}

impl SubmissionStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }

    /// Parse from database representation
    pub fn parse(s: &str) -> Self {
        match s {
            "failed" => Self::Failed,
            _ => Self::Uploaded,
        }
    }
}

/// Analysis lifecycle of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Not analyzed yet
    Pending,
    /// Analysis in progress
    Processing,
    /// Analysis stored
    Completed,
    /// Analysis could not run
    Failed,
}

impl AnalysisStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse from database representation
    pub fn parse(s: &str) -> Self {
        match s {
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// A set of uploaded course files awaiting or holding an analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Submission ID
    pub id: Uuid,
    /// Storage paths of the uploaded files, in upload order
    pub file_paths: Vec<String>,
    /// Client-supplied filenames, parallel to `file_paths`
    pub original_filenames: Vec<String>,
    /// Non-file form fields sent with the upload
    #[serde(default)]
    pub form_fields: HashMap<String, String>,
    /// Upload status
    pub submission_status: SubmissionStatus,
    /// Analysis status
    pub analysis_status: AnalysisStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Create a freshly uploaded submission
    pub fn uploaded(
        id: Uuid,
        file_paths: Vec<String>,
        original_filenames: Vec<String>,
        form_fields: HashMap<String, String>,
    ) -> Self {
        Self {
            id,
            file_paths,
            original_filenames,
            form_fields,
            submission_status: SubmissionStatus::Uploaded,
            analysis_status: AnalysisStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// A persisted classification result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Row ID
    pub id: i64,
    /// Submission this analysis belongs to
    pub submission_id: Uuid,
    /// Findings as produced by the engine
    pub framework_matches: Vec<Finding>,
    /// Aggregate score (mean similarity, two decimals)
    pub overall_score: f64,
    /// Analysis text of the first finding
    pub ai_analysis: String,
    /// First recommendation of each finding, joined by " | "
    pub recommendations: String,
    /// Summary statistics
    pub detailed_feedback: serde_json::Value,
    /// Creation time
    pub created_at: DateTime<Utc>,
}
