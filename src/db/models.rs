//! Row types for the `keywords` and `rank_history` tables.
//! Timestamps are Unix seconds.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{BookFormat, KeywordMetrics, Marketplace, RankRecord, SalesEstimate};

#[derive(Debug, sqlx::FromRow)]
pub struct KeywordRow {
    pub keyword_text: String,
    pub search_volume: i64,
    pub competition_score: f64,
    pub opportunity_score: f64,
    pub last_updated: i64,
}

impl From<KeywordRow> for KeywordMetrics {
    fn from(row: KeywordRow) -> Self {
        KeywordMetrics {
            keyword_text: row.keyword_text,
            search_volume: u32::try_from(row.search_volume).unwrap_or(0),
            competition_score: row.competition_score,
            opportunity_score: row.opportunity_score,
            last_updated: from_unix(row.last_updated),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RankRow {
    pub id: i64,
    pub asin: String,
    pub rank: i64,
    pub format: String,
    pub market: String,
    pub recorded_at: i64,
    pub estimated_daily_sales: f64,
    pub estimated_monthly_sales: f64,
}

impl RankRow {
    pub fn to_record(&self) -> RankRecord {
        RankRecord {
            rank: self.rank,
            timestamp: from_unix(self.recorded_at),
            format: BookFormat::parse_lossy(&self.format),
            market: Marketplace::parse_lossy(&self.market),
        }
    }

    pub fn estimate(&self) -> SalesEstimate {
        SalesEstimate {
            daily_sales: self.estimated_daily_sales,
            monthly_sales: self.estimated_monthly_sales,
        }
    }
}

pub fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
