//! Rank → demand model.
//!
//! Interpolates between calibration anchors in log-log space, extrapolates
//! past either end with fixed power laws, and inverts the curve by bisection.
//! Every function here is pure and infallible: bad input yields a zero
//! estimate instead of an error.

use tracing::debug;

use crate::config::{extrapolation, DAYS_PER_MONTH, MAX_RANK, MIN_RANK, SALES_LOG_FLOOR};
use crate::estimator::calibration::CalibrationTable;
use crate::types::{BookFormat, Marketplace, SalesEstimate};

/// Daily and monthly sales for `rank`, rounded to 2 decimals.
///
/// `monthly_sales` is derived from the rounded daily figure, so
/// `monthly_sales == daily_sales * 30` always holds.
pub fn estimate(rank: i64, format: BookFormat, market: Marketplace) -> SalesEstimate {
    estimate_with_table(CalibrationTable::select(market, format), rank)
}

/// [`estimate`] against an explicit table.
pub fn estimate_with_table(table: &CalibrationTable, rank: i64) -> SalesEstimate {
    let Ok(rank) = u32::try_from(rank) else {
        debug!(rank, "rank outside estimable range, returning zero estimate");
        return SalesEstimate::ZERO;
    };
    let daily = round2(interpolate(table, rank));
    SalesEstimate {
        daily_sales: daily,
        monthly_sales: daily * DAYS_PER_MONTH,
    }
}

/// Unrounded daily sales for `rank`. Zero for rank 0 or an unusable table.
pub fn daily_sales(rank: u32, format: BookFormat, market: Marketplace) -> f64 {
    interpolate(CalibrationTable::select(market, format), rank)
}

/// Smallest rank in `[1, 10_000_000]` whose estimated daily sales do not
/// exceed `target_daily_sales`.
///
/// Targets at or above what rank 1 achieves resolve to 1; targets below what
/// the worst rank still sells (including zero, negative and NaN) resolve to
/// 10,000,000.
pub fn rank_for_target(target_daily_sales: f64, format: BookFormat, market: Marketplace) -> u32 {
    let table = CalibrationTable::select(market, format);
    if target_daily_sales.is_nan() {
        return MAX_RANK;
    }
    if interpolate(table, MIN_RANK) <= target_daily_sales {
        return MIN_RANK;
    }
    if interpolate(table, MAX_RANK) > target_daily_sales {
        return MAX_RANK;
    }

    // Invariant: sales(low) > target >= sales(high).
    let (mut low, mut high) = (MIN_RANK, MAX_RANK);
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if interpolate(table, mid) > target_daily_sales {
            low = mid;
        } else {
            high = mid;
        }
    }
    high
}

fn interpolate(table: &CalibrationTable, rank: u32) -> f64 {
    if rank == 0 || !table.validate() {
        return 0.0;
    }
    if let Some(sales) = table.exact(rank) {
        return sales;
    }
    let (Some((best_rank, best_sales)), Some((worst_rank, worst_sales))) =
        (table.best_anchor(), table.worst_anchor())
    else {
        return 0.0;
    };

    if rank < best_rank {
        let ratio = f64::from(best_rank) / f64::from(rank);
        return best_sales * ratio.powf(extrapolation::ABOVE_BEST_EXPONENT);
    }
    if rank > worst_rank {
        let ratio = f64::from(rank) / f64::from(worst_rank);
        return worst_sales / ratio.powf(extrapolation::BELOW_WORST_EXPONENT);
    }

    let Some(((lo_rank, lo_sales), (hi_rank, hi_sales))) = table.bracket(rank) else {
        return 0.0;
    };
    let log_rank = f64::from(rank).log10();
    let log_lo = f64::from(lo_rank).log10();
    let log_hi = f64::from(hi_rank).log10();
    let t = (log_rank - log_lo) / (log_hi - log_lo);

    let log_lo_sales = lo_sales.max(SALES_LOG_FLOOR).log10();
    let log_hi_sales = hi_sales.max(SALES_LOG_FLOOR).log10();
    10f64.powf(log_lo_sales + t * (log_hi_sales - log_lo_sales))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FORMATS: [BookFormat; 3] = [BookFormat::Ebook, BookFormat::Paperback, BookFormat::Hardcover];
    const MARKETS: [Marketplace; 2] = [Marketplace::AmazonCom, Marketplace::AmazonCoUk];

    fn arb_format() -> impl Strategy<Value = BookFormat> {
        prop_oneof![
            Just(BookFormat::Ebook),
            Just(BookFormat::Paperback),
            Just(BookFormat::Hardcover),
        ]
    }

    fn arb_market() -> impl Strategy<Value = Marketplace> {
        prop_oneof![Just(Marketplace::AmazonCom), Just(Marketplace::AmazonCoUk)]
    }

    #[test]
    fn rank_ten_ebook_matches_anchor() {
        let est = estimate(10, BookFormat::Ebook, Marketplace::AmazonCom);
        assert_eq!(est.daily_sales, 1500.0);
        assert_eq!(est.monthly_sales, 45000.0);
    }

    #[test]
    fn every_anchor_is_reproduced_exactly() {
        for table in CalibrationTable::all() {
            for &(anchor, sales) in table.anchors {
                let got = daily_sales(anchor, table.format, table.market);
                assert_eq!(got, sales, "{} / {} rank {anchor}", table.market, table.format);
            }
        }
    }

    #[test]
    fn non_positive_rank_is_zero() {
        assert_eq!(estimate(0, BookFormat::Ebook, Marketplace::AmazonCom), SalesEstimate::ZERO);
        assert_eq!(estimate(-5, BookFormat::Hardcover, Marketplace::AmazonCoUk), SalesEstimate::ZERO);
        assert_eq!(daily_sales(0, BookFormat::Ebook, Marketplace::AmazonCom), 0.0);
    }

    #[test]
    fn degenerate_table_is_zero() {
        let table = CalibrationTable {
            market: Marketplace::AmazonCom,
            format: BookFormat::Ebook,
            anchors: &[(100, 3.0)],
        };
        assert_eq!(estimate_with_table(&table, 100), SalesEstimate::ZERO);
    }

    #[test]
    fn interpolates_in_log_space() {
        // 316 sits halfway between 100 and 1000 in log space, so its sales
        // land on the geometric mean of the two anchors.
        let got = daily_sales(316, BookFormat::Ebook, Marketplace::AmazonCom);
        let expected = (300.0f64 * 50.0).sqrt();
        assert!((got - expected).abs() / expected < 0.01, "got {got}, expected ~{expected}");
    }

    #[test]
    fn extrapolates_long_tail() {
        let got = daily_sales(2_000_000, BookFormat::Ebook, Marketplace::AmazonCom);
        let expected = 0.1 / 2f64.powf(0.8);
        assert!((got - expected).abs() < 1e-12);
        assert!(got > 0.0);
    }

    #[test]
    fn extrapolates_above_best_anchor() {
        let table = CalibrationTable {
            market: Marketplace::AmazonCom,
            format: BookFormat::Ebook,
            anchors: &[(10, 100.0), (100, 10.0)],
        };
        let est = estimate_with_table(&table, 5);
        assert_eq!(est.daily_sales, round2(100.0 * 2f64.powf(0.7)));
    }

    #[test]
    fn unknown_pair_uses_default_table() {
        let fallback = estimate(
            250,
            BookFormat::parse_lossy("audiobook"),
            Marketplace::parse_lossy("amazon.de"),
        );
        assert_eq!(fallback, estimate(250, BookFormat::Ebook, Marketplace::AmazonCom));
    }

    #[test]
    fn target_out_of_range_returns_boundaries() {
        assert_eq!(rank_for_target(1_000_000.0, BookFormat::Ebook, Marketplace::AmazonCom), MIN_RANK);
        assert_eq!(rank_for_target(5000.0, BookFormat::Ebook, Marketplace::AmazonCom), MIN_RANK);
        assert_eq!(rank_for_target(0.0, BookFormat::Ebook, Marketplace::AmazonCom), MAX_RANK);
        assert_eq!(rank_for_target(-1.0, BookFormat::Paperback, Marketplace::AmazonCom), MAX_RANK);
        assert_eq!(rank_for_target(f64::NAN, BookFormat::Ebook, Marketplace::AmazonCom), MAX_RANK);
    }

    #[test]
    fn target_hits_anchor_rank() {
        assert_eq!(rank_for_target(50.0, BookFormat::Ebook, Marketplace::AmazonCom), 1_000);
        assert_eq!(rank_for_target(3.0, BookFormat::Paperback, Marketplace::AmazonCom), 10_000);
    }

    #[test]
    fn monthly_is_thirty_days_of_daily() {
        for format in FORMATS {
            for market in MARKETS {
                for rank in [1, 7, 42, 999, 12_345, 700_000, 9_999_999] {
                    let est = estimate(rank, format, market);
                    assert_eq!(est.monthly_sales, est.daily_sales * 30.0);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn estimate_is_monotone_in_rank(
            r1 in 1i64..12_000_000,
            delta in 0i64..1_000_000,
            format in arb_format(),
            market in arb_market(),
        ) {
            let better = estimate(r1, format, market).daily_sales;
            let worse = estimate(r1 + delta, format, market).daily_sales;
            prop_assert!(better >= worse, "rank {} -> {}, rank {} -> {}", r1, better, r1 + delta, worse);
        }

        #[test]
        fn target_rank_is_the_boundary(
            target in 0.0001f64..6000.0,
            format in arb_format(),
            market in arb_market(),
        ) {
            let rank = rank_for_target(target, format, market);
            prop_assert!((MIN_RANK..=MAX_RANK).contains(&rank));
            if rank > MIN_RANK && rank < MAX_RANK {
                prop_assert!(daily_sales(rank, format, market) <= target);
                prop_assert!(daily_sales(rank - 1, format, market) > target);
            }
        }

        #[test]
        fn target_rank_estimate_is_close(
            target in 0.05f64..10.0,
            format in arb_format(),
            market in arb_market(),
        ) {
            let rank = rank_for_target(target, format, market);
            let got = daily_sales(rank, format, market);
            prop_assert!((got - target).abs() / target < 0.02, "target {} got {} at rank {}", target, got, rank);
        }
    }
}
