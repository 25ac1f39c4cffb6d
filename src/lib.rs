//! Sales and keyword-opportunity estimation for self-published books.
//!
//! [`estimator`] turns a bestseller rank into daily/monthly unit sales (and
//! back), and classifies rank histories. [`scorer`] rates keyword strings by
//! estimated volume, competition and opportunity. Both are pure; the
//! [`api`], [`db`] and [`state`] modules wrap them in an HTTP service backed
//! by SQLite.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod estimator;
pub mod scorer;
pub mod state;
pub mod types;
