//! course-align: course material ingestion and framework alignment
//!
//! Uploaded course files arrive as raw multipart bodies, are parsed without
//! lossy decoding, and are classified against a reference education
//! framework using text embeddings with deterministic fallbacks.

pub mod classification;
pub mod config;
pub mod error;
pub mod framework;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use classification::{ClassificationEngine, FixedJitter, JitterSource, RandomJitter};
pub use config::AlignConfig;
pub use error::{Error, Result};
pub use framework::FrameworkIndex;
pub use ingestion::{MalformedBodyError, ParsedForm, Part};
pub use types::{Finding, FrameworkChunk};
