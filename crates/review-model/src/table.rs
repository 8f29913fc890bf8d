//! Session Review Table

use crate::error::ReviewError;
use crate::record::{Gender, Rating, ReviewRecord, ReviewSubmission, Role};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{debug, info, warn};

/// Columns an imported review table must carry, in export order
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "employee_id",
    "role",
    "gender",
    "kpi_rating",
    "competency_rating",
    "initiative_rating",
    "overall_rating",
    "comment",
];

/// File name offered for the review export
pub const REVIEW_EXPORT_FILE_NAME: &str = "fairlens_reviews.csv";

/// Row shape of the comma-delimited review format
#[derive(Debug, Serialize, Deserialize)]
struct CsvReviewRow {
    employee_id: String,
    role: String,
    gender: String,
    kpi_rating: i64,
    competency_rating: i64,
    initiative_rating: i64,
    overall_rating: i64,
    comment: String,
}

impl CsvReviewRow {
    fn into_record(self) -> Result<ReviewRecord, ReviewError> {
        if self.employee_id.trim().is_empty() {
            return Err(ReviewError::BlankEmployeeId);
        }
        Ok(ReviewRecord {
            employee_id: self.employee_id,
            role: Role::from_label(&self.role),
            gender: Gender::from_label(&self.gender),
            kpi_rating: Rating::new("kpi_rating", self.kpi_rating)?,
            competency_rating: Rating::new("competency_rating", self.competency_rating)?,
            initiative_rating: Rating::new("initiative_rating", self.initiative_rating)?,
            overall_rating: Rating::new("overall_rating", self.overall_rating)?,
            comment: self.comment,
        })
    }
}

impl From<&ReviewRecord> for CsvReviewRow {
    fn from(record: &ReviewRecord) -> Self {
        Self {
            employee_id: record.employee_id.clone(),
            role: record.role_label().to_string(),
            gender: record.gender_label().to_string(),
            kpi_rating: record.kpi_rating.value() as i64,
            competency_rating: record.competency_rating.value() as i64,
            initiative_rating: record.initiative_rating.value() as i64,
            overall_rating: record.overall_rating.value() as i64,
            comment: record.comment.clone(),
        }
    }
}

/// In-memory review table owned by one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewTable {
    rows: Vec<ReviewRecord>,
}

impl ReviewTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from already-validated records
    pub fn from_records(rows: Vec<ReviewRecord>) -> Self {
        Self { rows }
    }

    /// The ten anonymized demonstration reviews a fresh session starts with
    pub fn seeded() -> Self {
        const SEED: [(&str, Role, Gender, [u8; 4], &str); 10] = [
            ("E001", Role::Manager, Gender::Female, [4, 4, 4, 4], "Strong potential; team player."),
            ("E002", Role::Manager, Gender::Male, [3, 4, 3, 3], "Good attitude; average execution."),
            ("E003", Role::Manager, Gender::Female, [4, 3, 3, 3], "Works well under pressure; sometimes too energetic."),
            ("E004", Role::Manager, Gender::Male, [3, 3, 3, 3], "Not a good cultural fit. Hard worker though."),
            ("E005", Role::Manager, Gender::Female, [4, 4, 4, 4], "Great attitude; on-time delivery."),
            ("E006", Role::Analyst, Gender::Male, [3, 3, 3, 3], "Can be emotional in feedback."),
            ("E007", Role::Analyst, Gender::Female, [3, 3, 3, 3], "Average performance; could do better."),
            ("E008", Role::Analyst, Gender::Male, [3, 3, 3, 3], "Aggressive in meetings."),
            ("E009", Role::Analyst, Gender::Female, [4, 4, 4, 4], "Great culture fit."),
            ("E010", Role::Analyst, Gender::Male, [3, 3, 3, 3], "Bossy in team settings."),
        ];

        let rows = SEED
            .iter()
            .map(|(id, role, gender, [kpi, comp, init, overall], comment)| ReviewRecord {
                employee_id: id.to_string(),
                role: Some(*role),
                gender: Some(*gender),
                kpi_rating: Rating(*kpi),
                competency_rating: Rating(*comp),
                initiative_rating: Rating(*init),
                overall_rating: Rating(*overall),
                comment: comment.to_string(),
            })
            .collect();
        Self { rows }
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReviewRecord> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one submitted review
    pub fn submit(&mut self, submission: ReviewSubmission) -> Result<&ReviewRecord, ReviewError> {
        let record = submission.into_record()?;
        info!("Saved review for {}", record.employee_id);
        self.rows.push(record);
        Ok(&self.rows[self.rows.len() - 1])
    }

    /// Parse a comma-delimited review table
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, ReviewError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let mut missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|h| h == **column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(ReviewError::MissingColumns(missing));
        }

        let mut rows = Vec::new();
        for (index, row) in reader.deserialize::<CsvReviewRow>().enumerate() {
            let record = row?.into_record().map_err(|e| ReviewError::InvalidRow {
                row: index + 1,
                source: Box::new(e),
            })?;
            rows.push(record);
        }

        debug!("Parsed {} review rows", rows.len());
        Ok(Self { rows })
    }

    /// Replace the whole table from an upload. On any error the current
    /// rows are left untouched.
    pub fn replace_from_csv<R: Read>(&mut self, reader: R) -> Result<usize, ReviewError> {
        match Self::read_csv(reader) {
            Ok(table) => {
                info!("Uploaded CSV loaded into session ({} rows)", table.len());
                *self = table;
                Ok(self.rows.len())
            }
            Err(e) => {
                warn!("Review upload rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Write the full table in the comma-delimited review format
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ReviewError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(REQUIRED_COLUMNS)?;
        for record in &self.rows {
            writer.serialize(CsvReviewRow::from(record))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, ReviewError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| ReviewError::Csv(e.to_string()))
    }
}
