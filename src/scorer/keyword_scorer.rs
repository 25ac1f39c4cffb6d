use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use crate::config::{keyword::*, DEFAULT_MAX_AGE_DAYS};
use crate::types::KeywordMetrics;

/// Scores keywords by estimated volume, competition and combined opportunity.
///
/// Both sub-scores carry random jitter drawn from `rng`. Pass a seeded
/// generator (or `rand::rngs::mock::StepRng`) for reproducible output.
pub struct KeywordScorer<R: Rng> {
    rng: R,
    max_age_days: i64,
}

impl<R: Rng> KeywordScorer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, max_age_days: DEFAULT_MAX_AGE_DAYS }
    }

    pub fn with_max_age_days(mut self, days: i64) -> Self {
        self.max_age_days = days;
        self
    }

    pub fn max_age_days(&self) -> i64 {
        self.max_age_days
    }

    /// Metrics for `keyword` as of `now`.
    ///
    /// Returns `previous` unchanged when it belongs to the same keyword and is
    /// still fresh. Returns `None` for a blank keyword.
    pub fn score(
        &mut self,
        keyword: &str,
        previous: Option<&KeywordMetrics>,
        now: DateTime<Utc>,
    ) -> Option<KeywordMetrics> {
        let keyword_text = normalize_keyword(keyword);
        if keyword_text.is_empty() {
            return None;
        }

        if let Some(prev) = previous {
            if prev.keyword_text == keyword_text
                && is_fresh_at(prev.last_updated, now, self.max_age_days)
            {
                return Some(prev.clone());
            }
        }

        let search_volume = self.estimate_search_volume(&keyword_text);
        let competition_score = self.estimate_competition(&keyword_text);
        let opportunity_score = opportunity_score(search_volume, competition_score);
        debug!(
            keyword = %keyword_text,
            search_volume,
            competition_score,
            opportunity_score,
            "keyword scored"
        );

        Some(KeywordMetrics {
            keyword_text,
            search_volume,
            competition_score,
            opportunity_score,
            last_updated: now,
        })
    }

    /// Synthetic monthly search volume. Stands in for a real volume source.
    fn estimate_search_volume(&mut self, keyword_text: &str) -> u32 {
        let words: Vec<&str> = keyword_text.split_whitespace().collect();
        let length_factor =
            (1.0 - (words.len() as f64 - 1.0) * LENGTH_PENALTY_PER_WORD).max(MIN_LENGTH_FACTOR);

        // Substring match: "bookkeeping" and "learning" count too.
        let common_factor = COMMON_WORDS
            .iter()
            .filter(|w| keyword_text.contains(*w))
            .fold(1.0, |acc, _| acc * COMMON_WORD_MULTIPLIER);

        let base = (BASE_VOLUME * length_factor * common_factor).trunc();
        let jitter = self.rng.gen_range(VOLUME_JITTER.0..=VOLUME_JITTER.1);
        ((base * jitter) as u32).max(MIN_VOLUME)
    }

    /// Fewer words = broader, more contested keyword.
    fn estimate_competition(&mut self, keyword_text: &str) -> f64 {
        let base = match keyword_text.split_whitespace().count() {
            0 | 1 => 0.8,
            2 => 0.6,
            3 => 0.4,
            _ => 0.2,
        };
        let jitter = self.rng.gen_range(COMPETITION_JITTER.0..=COMPETITION_JITTER.1);
        (base * jitter).clamp(0.0, 1.0)
    }
}

/// Weighted blend of normalized volume and inverted competition, rounded to 3 decimals.
pub fn opportunity_score(search_volume: u32, competition_score: f64) -> f64 {
    if search_volume == 0 {
        return 0.0;
    }
    let volume_score = (f64::from(search_volume).log10() / VOLUME_LOG_CEILING).min(1.0);
    let opportunity =
        VOLUME_WEIGHT * volume_score + COMPETITION_WEIGHT * (1.0 - competition_score.clamp(0.0, 1.0));
    ((opportunity * 1000.0).round() / 1000.0).clamp(0.0, 1.0)
}

/// Trim, lowercase and collapse runs of whitespace.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether metrics stamped `last_updated` are younger than `max_age_days` whole days.
pub fn is_fresh(last_updated: DateTime<Utc>, max_age_days: i64) -> bool {
    is_fresh_at(last_updated, Utc::now(), max_age_days)
}

pub fn is_fresh_at(last_updated: DateTime<Utc>, now: DateTime<Utc>, max_age_days: i64) -> bool {
    (now - last_updated).num_days() < max_age_days
}
