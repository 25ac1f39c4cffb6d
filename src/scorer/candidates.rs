//! Candidate keyword generation around a seed phrase.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::scorer::keyword_scorer::normalize_keyword;
use crate::types::KeywordMetrics;

const PREFIXES: &[&str] = &["best", "top", "ultimate", "complete", "beginner", "advanced", "how to"];
const SUFFIXES: &[&str] = &["book", "guide", "manual", "handbook", "for beginners", "step by step"];

/// Seed plus prefix/suffix variations and, for multi-word seeds, the reversed
/// word order. Normalized and deduplicated, first occurrence wins.
pub fn generate(seed: &str) -> Vec<String> {
    let seed = normalize_keyword(seed);
    if seed.is_empty() {
        return Vec::new();
    }

    let mut raw = Vec::with_capacity(PREFIXES.len() + SUFFIXES.len() + 2);
    raw.push(seed.clone());
    raw.extend(PREFIXES.iter().map(|p| format!("{p} {seed}")));
    raw.extend(SUFFIXES.iter().map(|s| format!("{seed} {s}")));

    let words: Vec<&str> = seed.split(' ').collect();
    if words.len() > 1 {
        raw.push(words.iter().rev().copied().collect::<Vec<_>>().join(" "));
    }

    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|k| normalize_keyword(&k))
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Sort by opportunity (best first) and keep at most `limit`.
pub fn rank_by_opportunity(mut metrics: Vec<KeywordMetrics>, limit: usize) -> Vec<KeywordMetrics> {
    metrics.sort_by(|a, b| {
        b.opportunity_score
            .partial_cmp(&a.opportunity_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.keyword_text.cmp(&b.keyword_text))
    });
    metrics.truncate(limit);
    metrics
}
