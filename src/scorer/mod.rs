pub mod candidates;
pub mod keyword_scorer;

pub use keyword_scorer::{is_fresh, is_fresh_at, normalize_keyword, KeywordScorer};
