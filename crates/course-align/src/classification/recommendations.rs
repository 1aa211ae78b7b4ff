//! Recommendation tables and score banding

/// Lead line for scores below 40
pub const LEAD_SIGNIFICANT: &str =
    "Significant alignment improvements needed to meet framework expectations";
/// Lead line for scores 40 to 69
pub const LEAD_FOUNDATION: &str = "Good foundation with room for enhancement";
/// Lead line for scores 70 and above
pub const LEAD_STRONG: &str = "Strong framework alignment detected";

/// Generic list for categories with no table entry
const GENERIC: [&str; 3] = [
    "Map each course module explicitly to the framework's core principles",
    "Add learning objectives that state measurable outcomes",
    "Include reflection activities that connect content to practice",
];

const EQUITY_AND_INCLUSION: [&str; 3] = [
    "Incorporate diverse perspectives and examples throughout the materials",
    "Provide accessible formats and multiple means of engagement",
    "Address bias explicitly in discussion prompts and case studies",
];

const ASSESSMENT: [&str; 3] = [
    "Align each assessment with a stated learning objective",
    "Add portfolio or project-based evidence of learning",
    "Publish rubrics so learners understand evaluation criteria",
];

const LEARNING_STRUCTURE: [&str; 3] = [
    "Open each lesson with an engaging hook and clear objectives",
    "Sequence activities from guided practice to independent work",
    "Close lessons with a synthesis or exit reflection",
];

const CORE_CONTENT: [&str; 3] = [
    "Ground concepts in real-world context and current examples",
    "Integrate ethical considerations into core topics",
    "Connect new concepts to learners' prior knowledge",
];

const FACILITATOR_TRAINING: [&str; 3] = [
    "Provide facilitator guides with discussion strategies",
    "Include preparation checklists for each session",
    "Offer guidance on managing diverse learner needs",
];

const QUALITY_ASSURANCE: [&str; 3] = [
    "Define review checkpoints for course materials",
    "Collect learner feedback after each module",
    "Document revisions against framework criteria",
];

/// Fixed list for text too short to classify
pub const INSUFFICIENT_CONTENT: [&str; 3] = [
    "Upload course materials with substantive written content",
    "Include lesson plans, syllabi, or learning objectives",
    "Make sure uploaded files contain extractable text",
];

/// Fixed list for text outside the education domain
pub const NON_EDUCATIONAL: [&str; 3] = [
    "Upload educational materials such as curricula, lesson plans, or assessments",
    "Confirm the correct files were selected for analysis",
    "Describe learning objectives and instructional activities in the materials",
];

/// Fixed list when no framework section matched
pub const LIMITED_ALIGNMENT: [&str; 3] = [
    "Review the framework's core principles and map them to course content",
    "Add explicit learning objectives tied to framework categories",
    "Incorporate assessment and reflection activities aligned with the framework",
];

/// Category-specific items, if the category has a table entry
pub fn for_category(category: &str) -> Option<&'static [&'static str]> {
    let items: &'static [&'static str] = match category {
        "Equity & Inclusion" => &EQUITY_AND_INCLUSION,
        "Assessment" => &ASSESSMENT,
        "Learning Structure" | "Lesson Structure" => &LEARNING_STRUCTURE,
        "Core Content" | "Core Framework" => &CORE_CONTENT,
        "Facilitator Training" => &FACILITATOR_TRAINING,
        "Quality Assurance" => &QUALITY_ASSURANCE,
        _ => return None,
    };
    Some(items)
}

/// Severity line for a score
pub fn lead_line(score: u8) -> &'static str {
    match score {
        0..=39 => LEAD_SIGNIFICANT,
        40..=69 => LEAD_FOUNDATION,
        _ => LEAD_STRONG,
    }
}

/// Ordered recommendations for a category at a score
///
/// The severity line always comes first. Below 70 it is prepended to the
/// full list; at 70 and above it replaces the list's first item.
pub fn build(category: &str, score: u8) -> Vec<String> {
    let base = for_category(category).unwrap_or(&GENERIC[..]);
    let rest = if score >= 70 { &base[1..] } else { base };

    std::iter::once(lead_line(score))
        .chain(rest.iter().copied())
        .map(str::to_string)
        .collect()
}

/// Owned copy of a fixed list
pub fn fixed(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        assert_eq!(lead_line(0), LEAD_SIGNIFICANT);
        assert_eq!(lead_line(39), LEAD_SIGNIFICANT);
        assert_eq!(lead_line(40), LEAD_FOUNDATION);
        assert_eq!(lead_line(69), LEAD_FOUNDATION);
        assert_eq!(lead_line(70), LEAD_STRONG);
        assert_eq!(lead_line(100), LEAD_STRONG);
    }

    #[test]
    fn test_low_band_prepends() {
        let recs = build("Assessment", 55);
        assert_eq!(recs.len(), 4);
        assert_eq!(recs[0], LEAD_FOUNDATION);
        assert_eq!(recs[1], ASSESSMENT[0]);
    }

    #[test]
    fn test_top_band_replaces_first() {
        let recs = build("Assessment", 85);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0], LEAD_STRONG);
        assert_eq!(recs[1], ASSESSMENT[1]);
        assert_eq!(recs[2], ASSESSMENT[2]);
    }

    #[test]
    fn test_unknown_category_uses_generic() {
        let recs = build("Underwater Basket Weaving", 20);
        assert_eq!(recs[0], LEAD_SIGNIFICANT);
        assert_eq!(&recs[1..], &fixed(&GENERIC)[..]);
    }
}
