use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Book format / marketplace
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    #[default]
    Ebook,
    Paperback,
    Hardcover,
}

impl BookFormat {
    /// Lenient parse: anything unrecognised maps to the default (ebook).
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "ebook" | "kindle" | "e-book" => BookFormat::Ebook,
            "paperback" | "softcover" => BookFormat::Paperback,
            "hardcover" | "hardback" => BookFormat::Hardcover,
            _ => BookFormat::default(),
        }
    }
}

impl std::fmt::Display for BookFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookFormat::Ebook => "ebook",
            BookFormat::Paperback => "paperback",
            BookFormat::Hardcover => "hardcover",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Marketplace {
    /// Primary market.
    #[default]
    #[serde(rename = "amazon.com")]
    AmazonCom,
    #[serde(rename = "amazon.co.uk")]
    AmazonCoUk,
}

impl Marketplace {
    /// Lenient parse: anything unrecognised maps to the primary market.
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "amazon.com" | "com" | "us" => Marketplace::AmazonCom,
            "amazon.co.uk" | "co.uk" | "uk" => Marketplace::AmazonCoUk,
            _ => Marketplace::default(),
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Marketplace::AmazonCom => "amazon.com",
            Marketplace::AmazonCoUk => "amazon.co.uk",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Sales estimates / rank history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesEstimate {
    pub daily_sales: f64,
    /// Always `daily_sales * 30`.
    pub monthly_sales: f64,
}

impl SalesEstimate {
    pub const ZERO: SalesEstimate = SalesEstimate { daily_sales: 0.0, monthly_sales: 0.0 };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRecord {
    pub rank: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub format: BookFormat,
    #[serde(default)]
    pub market: Marketplace,
}

// ---------------------------------------------------------------------------
// Trend classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Implied demand increasing (ranks getting better).
    Rising,
    Declining,
    Stable,
    InsufficientData,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Trend::Rising => "rising",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient_data",
        };
        write!(f, "{s}")
    }
}

/// Daily-sales statistics over a rank history. Absent when there is too little data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub current_daily_sales: f64,
    pub average_daily_sales: f64,
    pub best_daily_sales: f64,
    pub worst_daily_sales: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub trend: Trend,
    #[serde(flatten)]
    pub summary: Option<TrendSummary>,
}

impl TrendReport {
    pub fn insufficient() -> Self {
        Self { trend: Trend::InsufficientData, summary: None }
    }
}

// ---------------------------------------------------------------------------
// Keyword metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    /// Normalized: trimmed, lowercase, single-spaced.
    pub keyword_text: String,
    pub search_volume: u32,
    /// 0.0 to 1.0, where 1.0 is the most contested.
    pub competition_score: f64,
    /// 0.0 to 1.0, higher is better.
    pub opportunity_score: f64,
    pub last_updated: DateTime<Utc>,
}
