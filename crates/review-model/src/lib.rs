//! Review Records
//!
//! Anonymized performance-review records and the in-memory session table
//! that holds them. The table is the single source of truth for flagging and
//! fairness summaries; it is replaced wholesale by a CSV import or appended
//! to one submission at a time.

mod error;
mod record;
mod table;

pub use error::ReviewError;
pub use record::{
    is_female_indicator, Gender, Rating, RatingColumn, ReviewRecord, ReviewSubmission, Role,
    FEMALE_INDICATORS,
};
pub use table::{ReviewTable, REQUIRED_COLUMNS, REVIEW_EXPORT_FILE_NAME};
