use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::models::{KeywordRow, RankRow};
use crate::error::Result;
use crate::types::{KeywordMetrics, RankRecord, SalesEstimate};

/// SQLite persistence for keyword metrics and rank history.
/// The estimation models never touch this; request handlers do.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database file and apply migrations.
    pub async fn open(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database ready at {db_path}");
        Ok(Self { pool })
    }

    /// Private in-memory database. One connection, so every query sees the same data.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn get_keyword(&self, keyword_text: &str) -> Result<Option<KeywordMetrics>> {
        let row = sqlx::query_as::<_, KeywordRow>(
            r#"
            SELECT keyword_text, search_volume, competition_score, opportunity_score, last_updated
            FROM keywords
            WHERE keyword_text = ?
            "#,
        )
        .bind(keyword_text)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(KeywordMetrics::from))
    }

    pub async fn upsert_keyword(&self, m: &KeywordMetrics) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO keywords (
                keyword_text, search_volume, competition_score, opportunity_score, last_updated
            ) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(keyword_text) DO UPDATE SET
                search_volume = excluded.search_volume,
                competition_score = excluded.competition_score,
                opportunity_score = excluded.opportunity_score,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&m.keyword_text)
        .bind(i64::from(m.search_volume))
        .bind(m.competition_score)
        .bind(m.opportunity_score)
        .bind(m.last_updated.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_rank(
        &self,
        asin: &str,
        record: &RankRecord,
        estimate: SalesEstimate,
    ) -> Result<RankRow> {
        let row = sqlx::query_as::<_, RankRow>(
            r#"
            INSERT INTO rank_history (
                asin, rank, format, market, recorded_at,
                estimated_daily_sales, estimated_monthly_sales
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, asin, rank, format, market, recorded_at,
                      estimated_daily_sales, estimated_monthly_sales
            "#,
        )
        .bind(asin)
        .bind(record.rank)
        .bind(record.format.to_string())
        .bind(record.market.to_string())
        .bind(record.timestamp.timestamp())
        .bind(estimate.daily_sales)
        .bind(estimate.monthly_sales)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Most recent rank rows for `asin`, newest first.
    pub async fn recent_ranks(&self, asin: &str, limit: i64) -> Result<Vec<RankRow>> {
        let rows = sqlx::query_as::<_, RankRow>(
            r#"
            SELECT id, asin, rank, format, market, recorded_at,
                   estimated_daily_sales, estimated_monthly_sales
            FROM rank_history
            WHERE asin = ?
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(asin)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Full rank history for `asin`, oldest first.
    pub async fn rank_history(&self, asin: &str) -> Result<Vec<RankRecord>> {
        let rows = sqlx::query_as::<_, RankRow>(
            r#"
            SELECT id, asin, rank, format, market, recorded_at,
                   estimated_daily_sales, estimated_monthly_sales
            FROM rank_history
            WHERE asin = ?
            ORDER BY recorded_at ASC, id ASC
            "#,
        )
        .bind(asin)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(RankRow::to_record).collect())
    }
}
