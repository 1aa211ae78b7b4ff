//! Classification output

use serde::{Deserialize, Serialize};

/// One unit of classification output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Short heading
    pub title: String,
    /// Category label; unique among the findings of one classification
    pub category: String,
    /// Alignment score in 0..=100
    pub alignment_score: u8,
    /// Human-readable analysis
    pub analysis: String,
    /// Ordered recommendations; the first reflects the score band
    pub recommendations: Vec<String>,
    /// Supporting evidence lines
    pub evidence: Vec<String>,
    /// Similarity to the matched framework section, when one was matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl Finding {
    /// Aggregate alignment of a finding set: mean similarity rounded to two
    /// decimals, or 0 when no finding carries a similarity
    pub fn overall_score(findings: &[Finding]) -> f64 {
        let similarities: Vec<f64> = findings
            .iter()
            .filter_map(|f| f.similarity)
            .map(f64::from)
            .collect();

        if similarities.is_empty() {
            return 0.0;
        }

        let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
        (mean * 100.0).round() / 100.0
    }

    /// Number of findings backed by a framework match
    ///
    /// Gate and fallback findings carry no similarity and are not counted.
    pub fn match_count(findings: &[Finding]) -> usize {
        findings.iter().filter(|f| f.similarity.is_some()).count()
    }

    /// Mean similarity without rounding, or 0 when none
    pub fn average_similarity(findings: &[Finding]) -> f64 {
        let similarities: Vec<f64> = findings
            .iter()
            .filter_map(|f| f.similarity)
            .map(f64::from)
            .collect();

        if similarities.is_empty() {
            0.0
        } else {
            similarities.iter().sum::<f64>() / similarities.len() as f64
        }
    }
}
