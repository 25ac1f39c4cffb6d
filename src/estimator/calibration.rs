use crate::types::{BookFormat, Marketplace};

/// Rank → sales-per-day anchors for one (market, format) pair.
///
/// Invariants (checked by [`CalibrationTable::validate`]):
/// - at least two anchors
/// - anchors strictly increasing and positive
/// - sales strictly decreasing as the anchor grows
#[derive(Debug)]
pub struct CalibrationTable {
    pub market: Marketplace,
    pub format: BookFormat,
    /// `(rank_anchor, sales_per_day)`, sorted by anchor.
    pub anchors: &'static [(u32, f64)],
}

// UK sales run at roughly 30% of the US figures.
static TABLES: [CalibrationTable; 6] = [
    CalibrationTable {
        market: Marketplace::AmazonCom,
        format: BookFormat::Ebook,
        anchors: &[
            (1, 5000.0),
            (10, 1500.0),
            (100, 300.0),
            (1_000, 50.0),
            (10_000, 8.0),
            (100_000, 1.0),
            (1_000_000, 0.1),
        ],
    },
    CalibrationTable {
        market: Marketplace::AmazonCom,
        format: BookFormat::Paperback,
        anchors: &[
            (1, 2000.0),
            (10, 600.0),
            (100, 120.0),
            (1_000, 20.0),
            (10_000, 3.0),
            (100_000, 0.5),
            (1_000_000, 0.05),
        ],
    },
    CalibrationTable {
        market: Marketplace::AmazonCom,
        format: BookFormat::Hardcover,
        anchors: &[
            (1, 1000.0),
            (10, 300.0),
            (100, 60.0),
            (1_000, 10.0),
            (10_000, 1.5),
            (100_000, 0.25),
            (1_000_000, 0.025),
        ],
    },
    CalibrationTable {
        market: Marketplace::AmazonCoUk,
        format: BookFormat::Ebook,
        anchors: &[
            (1, 1500.0),
            (10, 450.0),
            (100, 90.0),
            (1_000, 15.0),
            (10_000, 2.4),
            (100_000, 0.3),
            (1_000_000, 0.03),
        ],
    },
    CalibrationTable {
        market: Marketplace::AmazonCoUk,
        format: BookFormat::Paperback,
        anchors: &[
            (1, 600.0),
            (10, 180.0),
            (100, 36.0),
            (1_000, 6.0),
            (10_000, 0.9),
            (100_000, 0.15),
            (1_000_000, 0.015),
        ],
    },
    CalibrationTable {
        market: Marketplace::AmazonCoUk,
        format: BookFormat::Hardcover,
        anchors: &[
            (1, 300.0),
            (10, 90.0),
            (100, 18.0),
            (1_000, 3.0),
            (10_000, 0.45),
            (100_000, 0.075),
            (1_000_000, 0.0075),
        ],
    },
];

/// Index of the fallback table in `TABLES` (ebook on the primary market).
const DEFAULT_TABLE: usize = 0;

impl CalibrationTable {
    /// Table for `(market, format)`, or the ebook / primary-market table when
    /// the pair has no calibration.
    pub fn select(market: Marketplace, format: BookFormat) -> &'static CalibrationTable {
        match TABLES.iter().find(|t| t.market == market && t.format == format) {
            Some(t) => t,
            None => {
                tracing::debug!(%market, %format, "no calibration for pair, using default table");
                &TABLES[DEFAULT_TABLE]
            }
        }
    }

    pub fn all() -> &'static [CalibrationTable] {
        &TABLES
    }

    pub fn best_anchor(&self) -> Option<(u32, f64)> {
        self.anchors.first().copied()
    }

    pub fn worst_anchor(&self) -> Option<(u32, f64)> {
        self.anchors.last().copied()
    }

    /// Sales value at an exact anchor rank, if `rank` is one.
    pub fn exact(&self, rank: u32) -> Option<f64> {
        self.anchors
            .binary_search_by_key(&rank, |&(anchor, _)| anchor)
            .ok()
            .map(|i| self.anchors[i].1)
    }

    /// The adjacent anchor pair `(lo, hi)` with `lo.0 <= rank <= hi.0`.
    pub fn bracket(&self, rank: u32) -> Option<((u32, f64), (u32, f64))> {
        self.anchors
            .windows(2)
            .find(|w| w[0].0 <= rank && rank <= w[1].0)
            .map(|w| (w[0], w[1]))
    }

    /// True when the table can support interpolation and a monotone estimate.
    pub fn validate(&self) -> bool {
        self.anchors.len() >= 2
            && self.anchors[0].0 > 0
            && self
                .anchors
                .windows(2)
                .all(|w| w[0].0 < w[1].0 && w[0].1 > w[1].1 && w[1].1 > 0.0)
    }
}
