//! Rule Engine Error Types

use std::path::PathBuf;
use thiserror::Error;

/// How loudly a rule-table problem should be surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSeverity {
    Warning,
    Error,
}

/// Errors while loading the rule table
#[derive(Debug, Error)]
pub enum RuleLoadError {
    /// Rule file does not exist
    #[error("{0} not found; using empty rule set")]
    NotFound(PathBuf),

    /// Rule file exists but could not be read or parsed
    #[error("Failed to read rule table: {0}")]
    Unreadable(String),

    /// Header lacks required columns
    #[error("Rule table missing columns: {0:?}")]
    MissingColumns(Vec<String>),
}

impl RuleLoadError {
    pub fn severity(&self) -> LoadSeverity {
        match self {
            RuleLoadError::NotFound(_) => LoadSeverity::Warning,
            RuleLoadError::Unreadable(_) | RuleLoadError::MissingColumns(_) => LoadSeverity::Error,
        }
    }
}

/// Errors while writing the flags export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}
