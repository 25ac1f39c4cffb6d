//! Shared counters for the /health endpoint.
//! Updated by the keyword cache and the rank handlers.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Default)]
pub struct HealthState {
    /// Keyword lookups answered from a fresh stored copy.
    keyword_cache_hits: AtomicU64,
    /// Keyword lookups that ran the scorer.
    keyword_recomputations: AtomicU64,
    ranks_recorded: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthCounters {
    pub keyword_cache_hits: u64,
    pub keyword_recomputations: u64,
    pub ranks_recorded: u64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_keyword_cache_hits(&self) {
        self.keyword_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_keyword_recomputations(&self) {
        self.keyword_recomputations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ranks_recorded(&self) {
        self.ranks_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HealthCounters {
        HealthCounters {
            keyword_cache_hits: self.keyword_cache_hits.load(Ordering::Relaxed),
            keyword_recomputations: self.keyword_recomputations.load(Ordering::Relaxed),
            ranks_recorded: self.ranks_recorded.load(Ordering::Relaxed),
        }
    }
}
