//! Review Error Types

use thiserror::Error;

/// Errors raised while building or importing review records
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Submission without an anonymized employee ID
    #[error("Please provide an anonymized employee ID")]
    BlankEmployeeId,

    /// Rating outside the 1-5 scale
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    RatingOutOfRange {
        field: &'static str,
        value: i64,
        min: u8,
        max: u8,
    },

    /// Uploaded table lacks required columns
    #[error("CSV missing columns. Required: {0:?}")]
    MissingColumns(Vec<String>),

    /// A specific data row failed validation
    #[error("Row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: Box<ReviewError>,
    },

    /// CSV could not be parsed or written
    #[error("Could not read CSV: {0}")]
    Csv(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<csv::Error> for ReviewError {
    fn from(err: csv::Error) -> Self {
        ReviewError::Csv(err.to_string())
    }
}

impl From<std::io::Error> for ReviewError {
    fn from(err: std::io::Error) -> Self {
        ReviewError::Io(err.to_string())
    }
}
