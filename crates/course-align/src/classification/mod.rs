//! Content classification against the reference framework
//!
//! The engine is a pure function of its inputs. Remote embedding calls and
//! framework lookups happen in the caller; the engine only sees their results.

pub mod engine;
pub mod jitter;
pub mod keywords;
pub mod recommendations;
pub mod similarity;

pub use engine::{ClassificationEngine, Screen};
pub use jitter::{FixedJitter, JitterSource, RandomJitter};
pub use keywords::KeywordMatcher;
pub use similarity::cosine_similarity;
