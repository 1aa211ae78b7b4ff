//! Core types for the course alignment service

pub mod api;
pub mod finding;
pub mod framework;
pub mod submission;

pub use api::{AnalyzeRequest, AnalyzeResponse, SubmissionDetail, UploadResponse};
pub use finding::Finding;
pub use framework::FrameworkChunk;
pub use submission::{AnalysisRecord, AnalysisStatus, Submission, SubmissionStatus};
