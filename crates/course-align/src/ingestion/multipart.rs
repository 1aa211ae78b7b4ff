//! Binary-safe multipart/form-data parser
//!
//! Works directly on the raw request bytes. Payloads are never decoded as
//! text; only the header block of each part is. Parts that cannot be
//! understood are dropped and counted, and only a body with no usable
//! boundary is an error.

use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

/// Header/payload separator inside a part
const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Line break trailing every payload before the next delimiter
const PAYLOAD_TRAILER_LEN: usize = 2;

/// Errors that make a whole multipart body unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBodyError {
    /// Content-Type header has no `boundary=` parameter
    #[error("content type has no boundary parameter")]
    MissingBoundary,

    /// `boundary=` present but nothing follows it
    #[error("boundary parameter is empty")]
    EmptyBoundary,

    /// Boundary token never appears in the body
    #[error("boundary '{0}' not found in body")]
    BoundaryNotFound(String),
}

/// One section of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Value of `name=` in the content-disposition header
    pub field_name: Option<String>,
    /// Value of `filename=`; its presence marks a file attachment
    pub file_name: Option<String>,
    /// Verbatim content-type header value
    pub content_type: Option<String>,
    /// Exact payload bytes
    pub payload: Bytes,
}

impl Part {
    /// Whether this part is a file attachment
    pub fn is_file(&self) -> bool {
        self.file_name.is_some()
    }

    /// Payload decoded as (lossy) UTF-8, for text fields
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Result of parsing a multipart body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedForm {
    parts: Vec<Part>,
    dropped: usize,
}

impl ParsedForm {
    /// All parts, in body order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// File parts, in body order
    pub fn files(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_file())
    }

    /// Non-file parts, in body order
    pub fn fields(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| !p.is_file())
    }

    /// First text field with the given name
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields()
            .find(|p| p.field_name.as_deref() == Some(name))
            .map(Part::text)
    }

    /// Text fields keyed by name, first value wins
    pub fn field_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for part in self.fields() {
            if let Some(name) = &part.field_name {
                map.entry(name.clone()).or_insert_with(|| part.text());
            }
        }
        map
    }

    /// Number of parts kept
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no parts were kept
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of candidate sections that were skipped as malformed
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Extract the boundary token from a Content-Type header value
///
/// Takes everything after `boundary=`. Quoted boundaries are not unquoted.
pub fn boundary_from_content_type(content_type: &str) -> Result<&str, MalformedBodyError> {
    let (_, rest) = content_type
        .split_once("boundary=")
        .ok_or(MalformedBodyError::MissingBoundary)?;

    let boundary = rest.trim();
    if boundary.is_empty() {
        return Err(MalformedBodyError::EmptyBoundary);
    }
    Ok(boundary)
}

/// Parse a body given its Content-Type header value
pub fn parse_with_content_type(
    body: &Bytes,
    content_type: &str,
) -> Result<ParsedForm, MalformedBodyError> {
    let boundary = boundary_from_content_type(content_type)?;
    parse(body, boundary)
}

/// Parse a raw multipart body delimited by `boundary`
pub fn parse(body: &Bytes, boundary: &str) -> Result<ParsedForm, MalformedBodyError> {
    if boundary.is_empty() {
        return Err(MalformedBodyError::EmptyBoundary);
    }

    let delimiter = format!("--{}", boundary).into_bytes();
    let positions = find_all(body, &delimiter);
    if positions.is_empty() {
        return Err(MalformedBodyError::BoundaryNotFound(boundary.to_string()));
    }

    let mut form = ParsedForm::default();

    // Content before the first delimiter is preamble; after the last one is epilogue
    for window in positions.windows(2) {
        let start = window[0] + delimiter.len();
        let end = window[1];

        match parse_part(body, start, end) {
            Some(part) => form.parts.push(part),
            None => {
                tracing::debug!("Skipping malformed multipart section at byte {}", start);
                form.dropped += 1;
            }
        }
    }

    if form.dropped > 0 {
        tracing::debug!(
            "Multipart body parsed: {} parts kept, {} dropped",
            form.parts.len(),
            form.dropped
        );
    }

    Ok(form)
}

/// Parse the section `body[start..end]`; `None` means the section is dropped
fn parse_part(body: &Bytes, start: usize, end: usize) -> Option<Part> {
    let section = &body[start..end];
    let separator = find(section, HEADER_SEPARATOR)?;

    let headers = parse_headers(&section[..separator]);
    let disposition = headers.get("content-disposition")?;
    let params = disposition_params(disposition);

    let field_name = params.get("name").cloned();
    let file_name = params.get("filename").cloned();
    if field_name.is_none() && file_name.is_none() {
        return None;
    }

    let payload_start = start + separator + HEADER_SEPARATOR.len();
    let payload = if end >= payload_start + PAYLOAD_TRAILER_LEN {
        body.slice(payload_start..end - PAYLOAD_TRAILER_LEN)
    } else {
        Bytes::new()
    };

    Some(Part {
        field_name,
        file_name,
        content_type: headers.get("content-type").cloned(),
        payload,
    })
}

/// Decode a header block into lowercase keys; the first occurrence of a key wins
fn parse_headers(block: &[u8]) -> HashMap<String, String> {
    let text = String::from_utf8_lossy(block);
    let mut headers = HashMap::new();

    for line in text.split("\r\n") {
        if let Some((key, value)) = line.split_once(':') {
            headers
                .entry(key.trim().to_ascii_lowercase())
                .or_insert_with(|| value.trim().to_string());
        }
    }

    headers
}

/// Parameters of a content-disposition value, quotes removed
///
/// Semicolons inside quoted values do not split parameters.
fn disposition_params(value: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in value.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);

    for segment in segments {
        if let Some((key, raw)) = segment.split_once('=') {
            let raw = raw.trim();
            let unquoted = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            params
                .entry(key.trim().to_ascii_lowercase())
                .or_insert_with(|| unquoted.to_string());
        }
    }

    params
}

/// Offset of the first occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Offsets of every non-overlapping occurrence of `needle`
fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut offset = 0;

    while let Some(pos) = find(&haystack[offset..], needle) {
        positions.push(offset + pos);
        offset += pos + needle.len();
    }

    positions
}
