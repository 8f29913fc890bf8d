//! Ratings Fairness
//!
//! Per-group rating summaries, the mean gap between the two most common groups,
//! and the adverse-impact ratio (AIR) of meets/exceeds rates. Thresholds are
//! editorial rules of thumb, not significance tests.

mod config;
mod error;
mod summary;

pub use config::{FairnessConfig, GroupBy, MeetsThreshold};
pub use error::FairnessError;
pub use summary::{
    summarize, summarize_with, AirReport, AirVerdict, ColumnStats, GapReport, GapVerdict,
    GroupRate, GroupRow, GroupSummary, Statistic, Unavailable,
};
