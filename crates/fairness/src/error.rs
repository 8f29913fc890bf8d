//! Fairness Error Types

use thiserror::Error;

/// Errors constructing fairness inputs. Summaries themselves never fail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FairnessError {
    /// Threshold off the 1.0-5.0 half-point grid
    #[error("Threshold {0} must be between 1.0 and 5.0 in steps of 0.5")]
    InvalidThreshold(f64),

    /// Grouping attribute other than role or gender
    #[error("Unknown grouping attribute: {0} (expected role or gender)")]
    UnknownGroupBy(String),
}
