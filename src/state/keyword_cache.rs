use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::api::health::HealthState;
use crate::db::Store;
use crate::error::Result;
use crate::scorer::{normalize_keyword, KeywordScorer};
use crate::types::KeywordMetrics;

/// Read-through cache over the `keywords` table.
///
/// A lookup loads the stored copy, lets the scorer decide whether it is still
/// fresh, and writes back only recomputed metrics. The whole cycle runs under
/// a per-keyword async lock so concurrent requests for one keyword never score
/// it twice.
pub struct KeywordCache {
    store: Store,
    /// Never held across an `.await`.
    scorer: Mutex<KeywordScorer<StdRng>>,
    /// normalized keyword → in-flight lock. Entries are dropped once unused.
    in_flight: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
    health: Arc<HealthState>,
}

impl KeywordCache {
    pub fn new(store: Store, scorer: KeywordScorer<StdRng>, health: Arc<HealthState>) -> Self {
        Self {
            store,
            scorer: Mutex::new(scorer),
            in_flight: DashMap::new(),
            health,
        }
    }

    /// Scorer seeded from `seed`, or from OS entropy when `None`.
    pub fn scorer_from_seed(seed: Option<u64>, max_age_days: i64) -> KeywordScorer<StdRng> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        KeywordScorer::new(rng).with_max_age_days(max_age_days)
    }

    /// Current metrics for `keyword`. `None` for a blank keyword.
    pub async fn analyze(&self, keyword: &str, now: DateTime<Utc>) -> Result<Option<KeywordMetrics>> {
        let keyword_text = normalize_keyword(keyword);
        if keyword_text.is_empty() {
            return Ok(None);
        }

        let lock = Arc::clone(self.in_flight.entry(keyword_text.clone()).or_default().value());
        let result = {
            let _guard = lock.lock().await;
            self.refresh(&keyword_text, now).await
        };
        drop(lock);
        self.in_flight
            .remove_if(&keyword_text, |_, l| Arc::strong_count(l) == 1);

        result
    }

    /// Analyze each keyword in order. Blank entries come back as `None`.
    pub async fn analyze_all(
        &self,
        keywords: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<Option<KeywordMetrics>>> {
        let mut out = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            out.push(self.analyze(keyword, now).await?);
        }
        Ok(out)
    }

    async fn refresh(&self, keyword_text: &str, now: DateTime<Utc>) -> Result<Option<KeywordMetrics>> {
        let previous = self.store.get_keyword(keyword_text).await?;

        let scored = match self.scorer.lock() {
            Ok(mut scorer) => scorer.score(keyword_text, previous.as_ref(), now),
            Err(poisoned) => {
                warn!("keyword scorer mutex poisoned, recovering");
                poisoned.into_inner().score(keyword_text, previous.as_ref(), now)
            }
        };
        let Some(metrics) = scored else {
            return Ok(None);
        };

        if previous.as_ref() == Some(&metrics) {
            self.health.inc_keyword_cache_hits();
            debug!(keyword = %keyword_text, "keyword metrics fresh, reusing stored copy");
        } else {
            self.health.inc_keyword_recomputations();
            self.store.upsert_keyword(&metrics).await?;
            debug!(
                keyword = %keyword_text,
                opportunity = metrics.opportunity_score,
                "keyword metrics recomputed"
            );
        }
        Ok(Some(metrics))
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}
