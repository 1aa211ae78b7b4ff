//! Text extraction from stored course files
//!
//! Plain-text formats are decoded directly. Binary office formats are not
//! parsed; they yield a fixed notice so downstream stages still see content.

use std::path::Path;

/// Notice returned in place of PDF text
pub const PDF_PLACEHOLDER: &str =
    "[PDF content extracted - binary PDF text extraction is not enabled]";

/// Notice returned in place of Word document text
pub const WORD_PLACEHOLDER: &str =
    "[Word document content extracted - binary Word text extraction is not enabled]";

/// Source format, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Plain text or markdown
    Text,
    /// PDF document
    Pdf,
    /// Word document (.doc or .docx)
    Word,
    /// Anything else; decoded as text
    Unknown,
}

impl SourceKind {
    /// Detect source kind from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "md" | "markdown" => Self::Text,
            "pdf" => Self::Pdf,
            "doc" | "docx" => Self::Word,
            _ => Self::Unknown,
        }
    }

    /// Detect source kind from a file name or storage path
    pub fn from_path(path: &str) -> Self {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

/// Extract text from a stored file
pub fn extract_text(path: &str, data: &[u8]) -> String {
    match SourceKind::from_path(path) {
        SourceKind::Pdf => PDF_PLACEHOLDER.to_string(),
        SourceKind::Word => WORD_PLACEHOLDER.to_string(),
        SourceKind::Text | SourceKind::Unknown => String::from_utf8_lossy(data).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_detection() {
        assert_eq!(SourceKind::from_path("sub/0_syllabus.TXT"), SourceKind::Text);
        assert_eq!(SourceKind::from_path("plan.docx"), SourceKind::Word);
        assert_eq!(SourceKind::from_path("plan.pdf"), SourceKind::Pdf);
        assert_eq!(SourceKind::from_path("README"), SourceKind::Unknown);
    }

    #[test]
    fn test_text_is_decoded_lossily() {
        let text = extract_text("notes.txt", b"lesson \xFF plan");
        assert!(text.starts_with("lesson "));
        assert!(text.ends_with(" plan"));
    }

    #[test]
    fn test_binary_formats_use_placeholder() {
        assert_eq!(extract_text("a.pdf", b"%PDF-1.7"), PDF_PLACEHOLDER);
        assert_eq!(extract_text("a.doc", b"\xD0\xCF"), WORD_PLACEHOLDER);
    }
}
