use crate::config::{TREND_RECENT_WINDOW, TREND_THRESHOLD_PERCENT};
use crate::estimator::rank_model::estimate;
use crate::types::{RankRecord, Trend, TrendReport, TrendSummary};

/// Classify the demand trend implied by a rank history.
///
/// The history is sorted by timestamp here; callers may pass it in any order.
/// Each record is estimated with its own format and market.
pub fn analyze_trend(history: &[RankRecord]) -> TrendReport {
    if history.len() < 2 {
        return TrendReport::insufficient();
    }

    let mut sorted: Vec<&RankRecord> = history.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let sales: Vec<f64> = sorted
        .iter()
        .map(|r| estimate(r.rank, r.format, r.market).daily_sales)
        .collect();

    let (trend, change_percent) = classify(&sales);

    let n = sales.len() as f64;
    let summary = TrendSummary {
        current_daily_sales: sales[sales.len() - 1],
        average_daily_sales: sales.iter().sum::<f64>() / n,
        best_daily_sales: sales.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        worst_daily_sales: sales.iter().copied().fold(f64::INFINITY, f64::min),
        change_percent,
    };

    TrendReport { trend, summary: Some(summary) }
}

/// Returns (trend, change_percent). `sales` is oldest first, len >= 2.
fn classify(sales: &[f64]) -> (Trend, f64) {
    if sales.len() < TREND_RECENT_WINDOW {
        // Two points: direct comparison, no percentage reported.
        let (first, last) = (sales[0], sales[sales.len() - 1]);
        let trend = if last > first {
            Trend::Rising
        } else if last < first {
            Trend::Declining
        } else {
            Trend::Stable
        };
        return (trend, 0.0);
    }

    let split = sales.len() - TREND_RECENT_WINDOW;
    let recent_avg = mean(&sales[split..]);
    let older_avg = if split > 0 { mean(&sales[..split]) } else { sales[0] };

    let change_percent = if older_avg > 0.0 {
        (recent_avg - older_avg) / older_avg * 100.0
    } else {
        0.0
    };

    let trend = if change_percent > TREND_THRESHOLD_PERCENT {
        Trend::Rising
    } else if change_percent < -TREND_THRESHOLD_PERCENT {
        Trend::Declining
    } else {
        Trend::Stable
    };
    (trend, change_percent)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
