//! Audit Pass over the Review Table

use crate::error::ExportError;
use crate::matcher::evaluate;
use crate::rules::{RuleCategory, RuleSet};
use chrono::{DateTime, TimeZone};
use review_model::ReviewTable;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::info;

/// One flag tied back to the review it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagRecord {
    pub employee_id: String,
    pub role: String,
    pub gender: String,
    pub phrase: String,
    pub category: RuleCategory,
    pub tip: String,
}

/// Flag every comment in the table. Flags are recomputed on each call.
pub fn audit(table: &ReviewTable, rules: &RuleSet) -> Vec<FlagRecord> {
    let mut flags = Vec::new();
    for review in table.iter() {
        let gender = review.gender_label();
        for flag in evaluate(&review.comment, gender, rules.rules()) {
            flags.push(FlagRecord {
                employee_id: review.employee_id.clone(),
                role: review.role_label().to_string(),
                gender: gender.to_string(),
                phrase: flag.phrase,
                category: flag.category,
                tip: flag.tip,
            });
        }
    }

    info!(
        "Audit pass: {} flag(s) across {} review(s) with rules {}",
        flags.len(),
        table.len(),
        rules.version()
    );
    flags
}

/// Flag count per category, ordered by category name
pub fn category_histogram(flags: &[FlagRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for flag in flags {
        *counts.entry(flag.category.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Write flags in the comma-delimited audit snapshot format
pub fn write_flags_csv<W: Write>(flags: &[FlagRecord], writer: W) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(["employee_id", "role", "gender", "phrase", "category", "tip"])?;
    for flag in flags {
        writer.serialize(flag)?;
    }
    writer.flush()?;
    Ok(())
}

/// File name for a flags snapshot taken at `at`
pub fn flags_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("flags_{}.csv", at.format("%Y%m%d_%H%M"))
}
