//! Education-domain keyword heuristic
//!
//! Case-insensitive substring containment, not tokenization: "lessons"
//! matches "lesson" and "coursework" matches "course".

/// Built-in education vocabulary
pub fn default_vocabulary() -> Vec<String> {
    [
        "curriculum",
        "lesson",
        "assessment",
        "pedagogy",
        "learning",
        "learner",
        "student",
        "course",
        "module",
        "objective",
        "outcome",
        "syllabus",
        "teaching",
        "instruction",
        "classroom",
        "education",
        "competency",
        "rubric",
        "evaluation",
        "facilitator",
        "portfolio",
        "reflection",
        "feedback",
        "inclusion",
        "equity",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Counts distinct vocabulary terms present in a text
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    terms: Vec<String>,
}

impl KeywordMatcher {
    /// Build from a vocabulary; terms are lowercased, blanks and duplicates dropped
    pub fn new(vocabulary: &[String]) -> Self {
        let mut terms: Vec<String> = Vec::with_capacity(vocabulary.len());
        for term in vocabulary {
            let term = term.trim().to_lowercase();
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        }
        Self { terms }
    }

    /// Terms that occur in `text`, in vocabulary order
    pub fn matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        let haystack = text.to_lowercase();
        self.terms
            .iter()
            .filter(|term| haystack.contains(term.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Number of distinct terms that occur in `text`
    pub fn count(&self, text: &str) -> usize {
        self.matches(text).len()
    }

    /// Vocabulary size
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary is empty
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(&default_vocabulary())
    }
}
