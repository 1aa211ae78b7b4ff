//! Upload ingestion: multipart parsing and text extraction

pub mod extract;
pub mod multipart;

pub use extract::{extract_text, SourceKind};
pub use multipart::{parse, parse_with_content_type, MalformedBodyError, ParsedForm, Part};
