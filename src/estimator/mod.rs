pub mod calibration;
pub mod rank_model;
pub mod trend;

pub use calibration::CalibrationTable;
pub use rank_model::{estimate, rank_for_target};
pub use trend::analyze_trend;
