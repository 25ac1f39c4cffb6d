use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::health::{HealthCounters, HealthState};
use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::db::models::RankRow;
use crate::db::Store;
use crate::error::AppError;
use crate::estimator::{analyze_trend, estimate, rank_for_target};
use crate::scorer::candidates;
use crate::state::KeywordCache;
use crate::types::{BookFormat, KeywordMetrics, Marketplace, RankRecord, SalesEstimate, TrendReport};

#[derive(Clone)]
pub struct ApiState {
    pub store: Store,
    pub keywords: Arc<KeywordCache>,
    pub health: Arc<HealthState>,
    pub suggestion_limit: usize,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/sales/estimate", get(get_sales_estimate))
        .route("/sales/target", get(get_target_rank))
        .route("/books/:asin/ranks", post(record_rank).get(get_rank_history))
        .route("/books/:asin/trend", get(get_trend))
        .route("/keywords/analyze", post(analyze_keywords))
        .route("/keywords/suggest", get(suggest_keywords))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct EstimateQuery {
    pub rank: i64,
    pub format: Option<String>,
    pub market: Option<String>,
}

#[derive(Deserialize)]
pub struct TargetQuery {
    pub daily_sales: f64,
    pub format: Option<String>,
    pub market: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordRankRequest {
    pub rank: i64,
    pub format: Option<String>,
    pub market: Option<String>,
    /// Defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    pub query: Option<String>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub counters: HealthCounters,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub rank: i64,
    pub format: BookFormat,
    pub market: Marketplace,
    #[serde(flatten)]
    pub estimate: SalesEstimate,
}

#[derive(Debug, Serialize)]
pub struct TargetResponse {
    pub target_daily_sales: f64,
    pub format: BookFormat,
    pub market: Marketplace,
    pub rank: u32,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub asin: String,
    pub data_points: usize,
    #[serde(flatten)]
    pub report: TrendReport,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub keywords: Vec<Option<KeywordMetrics>>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub query: String,
    pub suggestions: Vec<KeywordMetrics>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "kdp-estimator",
        timestamp: Utc::now(),
        counters: state.health.snapshot(),
    })
}

async fn get_sales_estimate(
    Query(params): Query<EstimateQuery>,
) -> Result<Json<EstimateResponse>, AppError> {
    let rank = positive_rank(params.rank)?;
    let (format, market) = parse_pair(params.format.as_deref(), params.market.as_deref());
    Ok(Json(EstimateResponse {
        rank,
        format,
        market,
        estimate: estimate(rank, format, market),
    }))
}

async fn get_target_rank(
    Query(params): Query<TargetQuery>,
) -> Result<Json<TargetResponse>, AppError> {
    if !params.daily_sales.is_finite() || params.daily_sales < 0.0 {
        return Err(AppError::Validation(
            "daily_sales must be a non-negative number".to_string(),
        ));
    }
    let (format, market) = parse_pair(params.format.as_deref(), params.market.as_deref());
    Ok(Json(TargetResponse {
        target_daily_sales: params.daily_sales,
        format,
        market,
        rank: rank_for_target(params.daily_sales, format, market),
    }))
}

async fn record_rank(
    State(state): State<ApiState>,
    Path(asin): Path<String>,
    Json(body): Json<RecordRankRequest>,
) -> Result<Json<RankRow>, AppError> {
    let asin = validate_asin(&asin)?;
    let rank = positive_rank(body.rank)?;
    let (format, market) = parse_pair(body.format.as_deref(), body.market.as_deref());
    let record = RankRecord {
        rank,
        timestamp: body.timestamp.unwrap_or_else(Utc::now),
        format,
        market,
    };
    let est = estimate(record.rank, format, market);
    let row = state.store.insert_rank(&asin, &record, est).await?;
    state.health.inc_ranks_recorded();
    info!(
        asin = %asin,
        rank,
        daily_sales = est.daily_sales,
        "rank recorded"
    );
    Ok(Json(row))
}

async fn get_rank_history(
    State(state): State<ApiState>,
    Path(asin): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<RankRow>>, AppError> {
    let asin = validate_asin(&asin)?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1);
    let rows = state.store.recent_ranks(&asin, limit).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(format!("no rank history for {asin}")));
    }
    Ok(Json(rows))
}

async fn get_trend(
    State(state): State<ApiState>,
    Path(asin): Path<String>,
) -> Result<Json<TrendResponse>, AppError> {
    let asin = validate_asin(&asin)?;
    let history = state.store.rank_history(&asin).await?;
    let report = analyze_trend(&history);
    Ok(Json(TrendResponse {
        asin,
        data_points: history.len(),
        report,
    }))
}

async fn analyze_keywords(
    State(state): State<ApiState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if body.keywords.is_empty() {
        return Err(AppError::Validation("keywords array is required".to_string()));
    }
    let keywords = state.keywords.analyze_all(&body.keywords, Utc::now()).await?;
    Ok(Json(AnalyzeResponse { keywords }))
}

async fn suggest_keywords(
    State(state): State<ApiState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    let query = params.query.unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return Err(AppError::Validation("query parameter is required".to_string()));
    }
    let limit = params
        .limit
        .unwrap_or(state.suggestion_limit)
        .clamp(1, state.suggestion_limit.max(1));

    let now = Utc::now();
    let mut scored = Vec::new();
    for candidate in candidates::generate(&query) {
        if let Some(m) = state.keywords.analyze(&candidate, now).await? {
            scored.push(m);
        }
    }

    Ok(Json(SuggestResponse {
        query,
        suggestions: candidates::rank_by_opportunity(scored, limit),
    }))
}

// ---------------------------------------------------------------------------
// Boundary validation
// ---------------------------------------------------------------------------

/// ASINs are 10 ASCII alphanumerics; returned upper-cased.
fn validate_asin(asin: &str) -> Result<String, AppError> {
    let asin = asin.trim();
    if asin.len() == 10 && asin.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(asin.to_ascii_uppercase())
    } else {
        Err(AppError::Validation(
            "Invalid ASIN format. ASIN must be 10 alphanumeric characters.".to_string(),
        ))
    }
}

fn positive_rank(rank: i64) -> Result<i64, AppError> {
    if rank > 0 {
        Ok(rank)
    } else {
        Err(AppError::Validation("rank must be a positive integer".to_string()))
    }
}

fn parse_pair(format: Option<&str>, market: Option<&str>) -> (BookFormat, Marketplace) {
    (
        format.map(BookFormat::parse_lossy).unwrap_or_default(),
        market.map(Marketplace::parse_lossy).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trend;
    use chrono::{Duration, TimeZone};

    async fn state() -> ApiState {
        let store = Store::in_memory().await.unwrap();
        let health = Arc::new(HealthState::new());
        let scorer = KeywordCache::scorer_from_seed(Some(1), 7);
        ApiState {
            store: store.clone(),
            keywords: Arc::new(KeywordCache::new(store, scorer, Arc::clone(&health))),
            health,
            suggestion_limit: 5,
        }
    }

    fn rank_body(rank: i64, day: i64) -> RecordRankRequest {
        RecordRankRequest {
            rank,
            format: Some("ebook".into()),
            market: None,
            timestamp: Some(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap() + Duration::days(day)),
        }
    }

    #[test]
    fn asin_validation() {
        assert_eq!(validate_asin("b00abc1234").unwrap(), "B00ABC1234");
        assert!(validate_asin("B00ABC123").is_err());
        assert!(validate_asin("B00ABC123!").is_err());
    }

    #[tokio::test]
    async fn estimate_endpoint() {
        let Json(resp) = get_sales_estimate(Query(EstimateQuery {
            rank: 10,
            format: Some("ebook".into()),
            market: Some("amazon.com".into()),
        }))
        .await
        .unwrap();
        assert_eq!(resp.estimate.daily_sales, 1500.0);
        assert_eq!(resp.estimate.monthly_sales, 45000.0);

        let err = get_sales_estimate(Query(EstimateQuery { rank: 0, format: None, market: None }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn target_endpoint() {
        let Json(resp) = get_target_rank(Query(TargetQuery {
            daily_sales: 50.0,
            format: None,
            market: None,
        }))
        .await
        .unwrap();
        assert_eq!(resp.rank, 1_000);

        let err = get_target_rank(Query(TargetQuery { daily_sales: -1.0, format: None, market: None }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn record_then_trend() {
        let state = state().await;
        let asin = "b0test0001".to_string();
        for (day, rank) in [(0, 50_000), (1, 30_000), (2, 10_000)] {
            let Json(row) = record_rank(State(state.clone()), Path(asin.clone()), Json(rank_body(rank, day)))
                .await
                .unwrap();
            assert_eq!(row.asin, "B0TEST0001");
        }

        let Json(trend) = get_trend(State(state.clone()), Path(asin.clone())).await.unwrap();
        assert_eq!(trend.data_points, 3);
        assert_eq!(trend.report.trend, Trend::Rising);

        let Json(rows) = get_rank_history(State(state.clone()), Path(asin), Query(HistoryQuery { limit: Some(2) }))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 10_000);
        assert_eq!(rows[0].estimated_daily_sales, 8.0);
        assert_eq!(state.health.snapshot().ranks_recorded, 3);
    }

    #[tokio::test]
    async fn trend_without_history_is_insufficient() {
        let state = state().await;
        let Json(trend) = get_trend(State(state), Path("B0EMPTY001".into())).await.unwrap();
        assert_eq!(trend.data_points, 0);
        assert_eq!(trend.report.trend, Trend::InsufficientData);
    }

    #[tokio::test]
    async fn analyze_requires_keywords() {
        let state = state().await;
        let err = analyze_keywords(State(state.clone()), Json(AnalyzeRequest { keywords: vec![] }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let Json(resp) = analyze_keywords(
            State(state),
            Json(AnalyzeRequest { keywords: vec!["Romance".into(), "learn rust".into()] }),
        )
        .await
        .unwrap();
        assert_eq!(resp.keywords.len(), 2);
        assert_eq!(resp.keywords[0].as_ref().unwrap().keyword_text, "romance");
    }

    #[tokio::test]
    async fn suggestions_are_ranked_and_limited() {
        let state = state().await;
        let Json(resp) = suggest_keywords(
            State(state.clone()),
            Query(SuggestQuery { query: Some(" knitting ".into()), limit: Some(50) }),
        )
        .await
        .unwrap();
        assert_eq!(resp.query, "knitting");
        assert_eq!(resp.suggestions.len(), 5);
        assert!(resp
            .suggestions
            .windows(2)
            .all(|w| w[0].opportunity_score >= w[1].opportunity_score));

        let err = suggest_keywords(State(state), Query(SuggestQuery { query: None, limit: None }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn small_limit_still_scores_every_candidate() {
        let state = state().await;
        let Json(resp) = suggest_keywords(
            State(state.clone()),
            Query(SuggestQuery { query: Some("knitting".into()), limit: Some(1) }),
        )
        .await
        .unwrap();
        assert_eq!(resp.suggestions.len(), 1);

        let generated = candidates::generate("knitting");
        assert_eq!(
            state.health.snapshot().keyword_recomputations,
            generated.len() as u64
        );
        let mut best = 0.0_f64;
        for candidate in &generated {
            let stored = state.store.get_keyword(candidate).await.unwrap().unwrap();
            best = best.max(stored.opportunity_score);
        }
        assert_eq!(resp.suggestions[0].opportunity_score, best);
    }

    #[tokio::test]
    async fn rank_history_for_unknown_asin_is_not_found() {
        let state = state().await;
        let err = get_rank_history(
            State(state),
            Path("B0NONE0001".into()),
            Query(HistoryQuery { limit: None }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
