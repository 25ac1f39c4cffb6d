use crate::error::{AppError, Result};

/// Days per month used to derive monthly sales from the daily estimate.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Inverse rank search bounds (inclusive).
pub const MIN_RANK: u32 = 1;
pub const MAX_RANK: u32 = 10_000_000;

/// Sales values are floored to this before taking a logarithm.
pub const SALES_LOG_FLOOR: f64 = 0.001;

/// Extrapolation exponents outside the calibrated anchor range.
/// Not refit against ground truth; treat as fixed.
pub mod extrapolation {
    /// Ranks better than the best anchor: sub-linear growth.
    pub const ABOVE_BEST_EXPONENT: f64 = 0.7;
    /// Ranks worse than the worst anchor: long-tail decay.
    pub const BELOW_WORST_EXPONENT: f64 = 0.8;
}

/// Relative change (percent) a trend must exceed to count as rising/declining.
pub const TREND_THRESHOLD_PERCENT: f64 = 10.0;

/// Number of most recent points averaged by the trend analysis.
pub const TREND_RECENT_WINDOW: usize = 3;

/// Keyword metrics older than this many whole days are recomputed.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// Default number of rank history rows returned by the API.
pub const DEFAULT_HISTORY_LIMIT: i64 = 30;

/// Keyword heuristic constants.
pub mod keyword {
    pub const BASE_VOLUME: f64 = 1000.0;
    pub const MIN_VOLUME: u32 = 10;
    /// Length factor drops by this much per word after the first.
    pub const LENGTH_PENALTY_PER_WORD: f64 = 0.2;
    pub const MIN_LENGTH_FACTOR: f64 = 0.1;
    pub const COMMON_WORD_MULTIPLIER: f64 = 1.5;
    pub const COMMON_WORDS: &[&str] = &["book", "guide", "how", "best", "top", "learn"];
    pub const VOLUME_JITTER: (f64, f64) = (0.5, 2.0);
    pub const COMPETITION_JITTER: (f64, f64) = (0.7, 1.3);
    /// log10 of the assumed monthly search ceiling (~10k).
    pub const VOLUME_LOG_CEILING: f64 = 4.0;
    pub const VOLUME_WEIGHT: f64 = 0.6;
    pub const COMPETITION_WEIGHT: f64 = 0.4;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Freshness window for stored keyword metrics (KEYWORD_MAX_AGE_DAYS)
    pub keyword_max_age_days: i64,
    /// Max candidates scored per suggestion request (SUGGESTION_LIMIT)
    pub suggestion_limit: usize,
    /// Fixed seed for the keyword scorer's jitter (SCORER_SEED). Unset = entropy.
    pub scorer_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "kdp_estimator.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            keyword_max_age_days: std::env::var("KEYWORD_MAX_AGE_DAYS")
                .unwrap_or_else(|_| DEFAULT_MAX_AGE_DAYS.to_string())
                .parse::<i64>()
                .unwrap_or(DEFAULT_MAX_AGE_DAYS),
            suggestion_limit: std::env::var("SUGGESTION_LIMIT")
                .unwrap_or_else(|_| "50".to_string())
                .parse::<usize>()
                .unwrap_or(50),
            scorer_seed: match std::env::var("SCORER_SEED") {
                Ok(s) => Some(s.trim().parse::<u64>().map_err(|_| {
                    AppError::Config("SCORER_SEED must be an unsigned integer".to_string())
                })?),
                Err(_) => None,
            },
        })
    }
}
