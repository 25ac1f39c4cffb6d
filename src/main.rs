use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kdp_estimator::api::{router, ApiState, HealthState};
use kdp_estimator::config::Config;
use kdp_estimator::db::Store;
use kdp_estimator::error::Result;
use kdp_estimator::estimator::CalibrationTable;
use kdp_estimator::state::KeywordCache;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Calibration sanity ---
    for table in CalibrationTable::all() {
        if !table.validate() {
            error!(market = %table.market, format = %table.format, "calibration table violates invariants; estimates will be zero");
        }
    }
    info!("Loaded {} calibration tables", CalibrationTable::all().len());

    // --- Database setup ---
    let store = Store::open(&cfg.db_path).await?;

    // --- Keyword scorer + cache ---
    let health = Arc::new(HealthState::new());
    let scorer = KeywordCache::scorer_from_seed(cfg.scorer_seed, cfg.keyword_max_age_days);
    if let Some(seed) = cfg.scorer_seed {
        info!("Keyword scorer seeded with {seed}");
    }
    let keywords = Arc::new(KeywordCache::new(store.clone(), scorer, Arc::clone(&health)));
    info!(
        "Keyword metrics stay fresh for {} days; suggestions capped at {}",
        cfg.keyword_max_age_days, cfg.suggestion_limit,
    );

    // --- HTTP API server ---
    let api_state = ApiState {
        store,
        keywords,
        health,
        suggestion_limit: cfg.suggestion_limit,
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
