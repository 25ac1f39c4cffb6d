pub mod keyword_cache;

pub use keyword_cache::KeywordCache;
