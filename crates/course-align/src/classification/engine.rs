//! Staged classification of course text
//!
//! 1. Content gate: trimmed text shorter than `min_text_chars` is rejected.
//! 2. Domain gate: fewer than `min_keyword_matches` distinct education
//!    keywords is rejected.
//! 3. Similarity scoring against framework chunks, one finding per category.
//! 4. A single low-score finding when nothing in stage 3 survives.
//!
//! Without an embedding, stage 3 is replaced by a keyword-frequency estimate.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::jitter::JitterSource;
use super::keywords::KeywordMatcher;
use super::recommendations;
use super::similarity::cosine_similarity;
use crate::config::ClassifierConfig;
use crate::types::{FrameworkChunk, Finding};

/// Category used for findings not tied to a framework section
pub const GENERAL_CATEGORY: &str = "General Assessment";

/// Title of the content-gate finding
pub const INSUFFICIENT_TITLE: &str = "Insufficient Content";
/// Title of the domain-gate finding
pub const NON_EDUCATIONAL_TITLE: &str = "Non-Educational Content";
/// Title of the no-match finding
pub const LIMITED_TITLE: &str = "Limited Framework Alignment";
/// Title of the keyword-only estimate
pub const KEYWORD_ESTIMATE_TITLE: &str = "Keyword-Based Alignment Estimate";

/// Outcome of the two pre-embedding gates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Text too short to classify
    Insufficient,
    /// Too few education keywords
    NonEducational {
        /// Distinct keywords found
        keyword_matches: usize,
    },
    /// Text may be embedded and scored
    Eligible {
        /// Distinct keywords found
        keyword_matches: usize,
    },
}

impl Screen {
    /// Whether scoring should proceed
    pub fn is_eligible(&self) -> bool {
        matches!(self, Screen::Eligible { .. })
    }
}

/// Classifies text against the reference framework
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    config: ClassifierConfig,
    keywords: KeywordMatcher,
}

impl ClassificationEngine {
    /// Create an engine from configuration
    pub fn new(config: ClassifierConfig) -> Self {
        let keywords = KeywordMatcher::new(&config.keywords);
        Self { config, keywords }
    }

    /// Engine configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Run the content and domain gates
    ///
    /// Callers use this to skip remote embedding calls for text that will
    /// be rejected anyway.
    pub fn screen(&self, text: &str) -> Screen {
        let trimmed = text.trim();
        if trimmed.chars().count() < self.config.min_text_chars {
            return Screen::Insufficient;
        }

        let keyword_matches = self.keywords.count(trimmed);
        if keyword_matches < self.config.min_keyword_matches {
            return Screen::NonEducational { keyword_matches };
        }

        Screen::Eligible { keyword_matches }
    }

    /// Classify text; always returns at least one finding
    ///
    /// `embedding` of `None` means no embedding could be obtained. Chunks may
    /// carry a precomputed similarity, which is used instead of computing a
    /// cosine against `embedding`.
    pub fn classify(
        &self,
        text: &str,
        chunks: Option<&[FrameworkChunk]>,
        embedding: Option<&[f32]>,
        jitter: &mut dyn JitterSource,
    ) -> Vec<Finding> {
        let keyword_matches = match self.screen(text) {
            Screen::Insufficient => return vec![self.insufficient_content(text)],
            Screen::NonEducational { keyword_matches } => {
                return vec![self.non_educational(keyword_matches)]
            }
            Screen::Eligible { keyword_matches } => keyword_matches,
        };

        let Some(embedding) = embedding else {
            tracing::debug!("No embedding available, using keyword estimate");
            return vec![self.keyword_estimate(keyword_matches, jitter)];
        };

        let findings = self.score_chunks(chunks.unwrap_or_default(), embedding, keyword_matches);
        if findings.is_empty() {
            return vec![self.limited_alignment(keyword_matches)];
        }

        findings
    }

    /// Stage 3: one finding per category among chunks above the floor
    fn score_chunks(
        &self,
        chunks: &[FrameworkChunk],
        embedding: &[f32],
        keyword_matches: usize,
    ) -> Vec<Finding> {
        let mut scored: Vec<(&FrameworkChunk, f32)> = chunks
            .iter()
            .map(|chunk| {
                let similarity = chunk
                    .similarity
                    .unwrap_or_else(|| cosine_similarity(embedding, &chunk.embedding));
                (chunk, similarity)
            })
            .filter(|(_, similarity)| *similarity >= self.config.similarity_floor)
            .collect();

        // Stable: equal similarities keep input order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut seen = HashSet::new();
        scored
            .into_iter()
            .filter(|&(chunk, _)| seen.insert(chunk.category.as_str()))
            .map(|(chunk, similarity)| self.chunk_finding(chunk, similarity, keyword_matches))
            .collect()
    }

    fn chunk_finding(&self, chunk: &FrameworkChunk, similarity: f32, keyword_matches: usize) -> Finding {
        let score = similarity_to_score(similarity);

        let analysis = format!(
            "{} alignment ({}%) with the {} section of the framework. Reference: \"{}\"",
            alignment_level(similarity),
            score,
            chunk.category,
            snippet(&chunk.content, self.config.snippet_chars),
        );

        Finding {
            title: chunk.display_title(),
            category: chunk.category.clone(),
            alignment_score: score,
            analysis,
            recommendations: recommendations::build(&chunk.category, score),
            evidence: vec![
                format!("Similarity score: {}", similarity),
                format!("Educational keyword matches: {}", keyword_matches),
                format!("Framework section: {}", chunk.id),
            ],
            similarity: Some(similarity),
        }
    }

    fn insufficient_content(&self, text: &str) -> Finding {
        Finding {
            title: INSUFFICIENT_TITLE.to_string(),
            category: GENERAL_CATEGORY.to_string(),
            alignment_score: 0,
            analysis: format!(
                "The submitted materials contain too little text to analyze (minimum {} characters).",
                self.config.min_text_chars
            ),
            recommendations: recommendations::fixed(&recommendations::INSUFFICIENT_CONTENT),
            evidence: vec![format!("Characters of text: {}", text.trim().chars().count())],
            similarity: None,
        }
    }

    fn non_educational(&self, keyword_matches: usize) -> Finding {
        Finding {
            title: NON_EDUCATIONAL_TITLE.to_string(),
            category: GENERAL_CATEGORY.to_string(),
            alignment_score: 0,
            analysis: "The submitted materials do not appear to be educational course content."
                .to_string(),
            recommendations: recommendations::fixed(&recommendations::NON_EDUCATIONAL),
            evidence: vec![
                format!("Educational keyword matches: {}", keyword_matches),
                format!("Required keyword matches: {}", self.config.min_keyword_matches),
            ],
            similarity: None,
        }
    }

    fn limited_alignment(&self, keyword_matches: usize) -> Finding {
        Finding {
            title: LIMITED_TITLE.to_string(),
            category: GENERAL_CATEGORY.to_string(),
            alignment_score: self.config.limited_alignment_score.min(100),
            analysis: "The materials are educational but no framework section matched closely enough to score."
                .to_string(),
            recommendations: recommendations::fixed(&recommendations::LIMITED_ALIGNMENT),
            evidence: vec![
                format!(
                    "Framework matches at or above {:.2}: 0",
                    self.config.similarity_floor
                ),
                format!("Educational keyword matches: {}", keyword_matches),
            ],
            similarity: None,
        }
    }

    fn keyword_estimate(&self, keyword_matches: usize, jitter: &mut dyn JitterSource) -> Finding {
        let raw = keyword_matches as f64 * self.config.keyword_fallback_weight * jitter.factor();
        let cap = f64::from(self.config.keyword_fallback_cap.min(100));
        let score = if raw.is_finite() { raw.round().clamp(0.0, cap) as u8 } else { 0 };

        Finding {
            title: KEYWORD_ESTIMATE_TITLE.to_string(),
            category: GENERAL_CATEGORY.to_string(),
            alignment_score: score,
            analysis: format!(
                "Framework similarity could not be computed. This estimate of {}% is based on education keyword frequency only.",
                score
            ),
            recommendations: recommendations::build(GENERAL_CATEGORY, score),
            evidence: vec![
                format!("Educational keyword matches: {}", keyword_matches),
                "Embedding unavailable; score estimated from keyword frequency".to_string(),
            ],
            similarity: None,
        }
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

/// Similarity to an integer percentage in 0..=100
fn similarity_to_score(similarity: f32) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

fn alignment_level(similarity: f32) -> &'static str {
    if similarity > 0.7 {
        "Strong"
    } else if similarity > 0.5 {
        "Moderate"
    } else {
        "Developing"
    }
}

/// First `max_chars` characters, with an ellipsis when truncated
fn snippet(content: &str, max_chars: usize) -> String {
    let content = content.trim();
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::jitter::{FixedJitter, RandomJitter};

    const COURSE_TEXT: &str = "This course includes a weekly lesson plan, a curriculum map, \
        and a final assessment portfolio for every student.";

    fn engine() -> ClassificationEngine {
        ClassificationEngine::default()
    }

    fn chunk(id: &str, category: &str, similarity: f32) -> FrameworkChunk {
        FrameworkChunk::new(id, category, format!("Reference content for {}", category))
            .with_similarity(similarity)
    }

    fn classify(text: &str, chunks: Option<&[FrameworkChunk]>, embedding: Option<&[f32]>) -> Vec<Finding> {
        engine().classify(text, chunks, embedding, &mut FixedJitter(1.0))
    }

    #[test]
    fn test_short_text_is_insufficient() {
        let findings = classify("short", None, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, INSUFFICIENT_TITLE);
        assert_eq!(findings[0].alignment_score, 0);
        assert!(!findings[0].recommendations.is_empty());
    }

    #[test]
    fn test_whitespace_padding_does_not_pass_gate() {
        let padded = format!("{}tiny{}", " ".repeat(40), " ".repeat(40));
        assert_eq!(engine().screen(&padded), Screen::Insufficient);
    }

    #[test]
    fn test_non_domain_prose() {
        let text = "The weather today is sunny and warm, perfect for a picnic in the park with \
            friends and family. We packed sandwiches, lemonade, and a frisbee, then walked along \
            the river until the sun went down.";
        let findings = classify(text, None, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, NON_EDUCATIONAL_TITLE);
        assert_eq!(findings[0].alignment_score, 0);
        assert_eq!(findings[0].evidence[0], "Educational keyword matches: 0");
    }

    #[test]
    fn test_two_keywords_is_not_enough() {
        let text = "Our lesson today covers the curriculum of the history of the local region in depth.";
        assert_eq!(engine().screen(text), Screen::NonEducational { keyword_matches: 2 });
    }

    #[test]
    fn test_precomputed_similarity_scores_directly() {
        let chunks = vec![chunk("assessment_portfolio_001", "Assessment", 0.85)];
        let embedding = vec![0.1, 0.2, 0.3];
        let findings = classify(COURSE_TEXT, Some(chunks.as_slice()), Some(embedding.as_slice()));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, "Assessment");
        assert_eq!(findings[0].alignment_score, 85);
        assert!(findings[0].recommendations[0].to_lowercase().contains("strong"));
        assert_eq!(findings[0].similarity, Some(0.85));
        assert!(findings[0].analysis.contains("85%"));
        assert_eq!(findings[0].evidence[0], "Similarity score: 0.85");
    }

    #[test]
    fn test_similarity_evidence_is_not_rounded() {
        let chunks = vec![chunk("a", "Assessment", 0.8125)];
        let findings = classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0][..]));
        assert_eq!(findings[0].evidence[0], "Similarity score: 0.8125");
    }

    #[test]
    fn test_same_category_keeps_highest() {
        let chunks = vec![
            chunk("a", "Assessment", 0.9),
            chunk("b", "Assessment", 0.6),
        ];
        let findings = classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0][..]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].alignment_score, 90);
        assert!(findings[0].evidence.iter().any(|e| e == "Framework section: a"));
    }

    #[test]
    fn test_out_of_order_input_is_ranked() {
        let chunks = vec![
            chunk("low", "Assessment", 0.45),
            chunk("other", "Core Content", 0.5),
            chunk("high", "Assessment", 0.8),
        ];
        let findings = classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0][..]));
        let scores: Vec<u8> = findings.iter().map(|f| f.alignment_score).collect();
        assert_eq!(scores, vec![80, 50]);
    }

    #[test]
    fn test_cosine_when_not_precomputed() {
        let chunks = vec![
            FrameworkChunk::new("x", "Equity & Inclusion", "Inclusive design").with_embedding(vec![1.0, 0.0]),
            FrameworkChunk::new("y", "Assessment", "Rubrics").with_embedding(vec![0.0, 1.0]),
        ];
        let findings = classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0, 0.0][..]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, "Equity & Inclusion");
        assert_eq!(findings[0].alignment_score, 100);
        assert_eq!(findings[0].title, "Equity & Inclusion Alignment");
    }

    #[test]
    fn test_below_floor_falls_back_to_limited() {
        let chunks = vec![chunk("a", "Assessment", 0.1)];
        let findings = classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0][..]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, LIMITED_TITLE);
        assert_eq!(findings[0].alignment_score, 15);
    }

    #[test]
    fn test_no_chunks_falls_back_to_limited() {
        let findings = classify(COURSE_TEXT, None, Some(&[1.0][..]));
        assert_eq!(findings[0].title, LIMITED_TITLE);
    }

    #[test]
    fn test_configurable_floor() {
        let config = ClassifierConfig { similarity_floor: 0.2, ..ClassifierConfig::default() };
        let engine = ClassificationEngine::new(config);
        let chunks = vec![chunk("a", "Assessment", 0.25)];
        let findings = engine.classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0][..]), &mut FixedJitter(1.0));
        assert_eq!(findings[0].alignment_score, 25);
        assert!(findings[0].recommendations[0].starts_with("Significant"));
    }

    #[test]
    fn test_keyword_estimate_without_embedding() {
        let findings = classify(COURSE_TEXT, None, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, KEYWORD_ESTIMATE_TITLE);
        let matches = KeywordMatcher::default().count(COURSE_TEXT);
        assert_eq!(findings[0].alignment_score as usize, matches * 10);
    }

    #[test]
    fn test_keyword_estimate_is_capped() {
        let findings = engine().classify(COURSE_TEXT, None, None, &mut FixedJitter(100.0));
        assert_eq!(findings[0].alignment_score, 90);
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let a = engine().classify(COURSE_TEXT, None, None, &mut RandomJitter::seeded(9));
        let b = engine().classify(COURSE_TEXT, None, None, &mut RandomJitter::seeded(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_embedding_path_is_deterministic() {
        let chunks = vec![chunk("a", "Assessment", 0.72), chunk("b", "Core Content", 0.41)];
        let a = engine().classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0][..]), &mut RandomJitter::seeded(1));
        let b = engine().classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0][..]), &mut RandomJitter::seeded(2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_scores_and_recommendations_bounded() {
        let chunks = vec![
            chunk("a", "Assessment", 1.7),
            chunk("b", "Core Content", 0.3),
            chunk("c", "Quality Assurance", f32::NAN),
        ];
        let findings = classify(COURSE_TEXT, Some(chunks.as_slice()), Some(&[1.0][..]));
        assert_eq!(findings.len(), 2);
        for finding in &findings {
            assert!(finding.alignment_score <= 100);
            assert!(!finding.recommendations.is_empty());
        }
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        assert_eq!(snippet("ééééé", 3), "ééé...");
        assert_eq!(snippet("short", 200), "short");
    }
}
