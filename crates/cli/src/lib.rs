//! FairLens Command Line
//!
//! Drives the rule engine and fairness calculator over an in-memory review
//! session: seed or uploaded reviews, one read-only rule table, and on-demand
//! CSV exports.

mod config;
pub mod report;

pub use config::{AppConfig, AppConfigError};

use anyhow::{Context, Result};
use chrono::Local;
use fairness::{summarize_with, GroupBy, GroupSummary, MeetsThreshold};
use review_model::{ReviewError, ReviewSubmission, ReviewTable, REVIEW_EXPORT_FILE_NAME};
use rule_engine::{
    audit, category_histogram, flags_file_name, write_flags_csv, FlagRecord, LoadSeverity,
    RuleLoadError, RuleSet,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging to stderr
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("Failed to set tracing subscriber")
}

/// Flags view: every flag plus the per-category counts
#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub rules_version: String,
    pub flags: Vec<FlagRecord>,
    pub histogram: BTreeMap<String, usize>,
}

/// One user session: the review table and the rule table it is audited with
pub struct Session {
    pub config: AppConfig,
    pub reviews: ReviewTable,
    pub rules: RuleSet,
    /// Problem loading the rule table, if any
    pub rules_issue: Option<RuleLoadError>,
}

impl Session {
    /// Start a session on the seed reviews with the configured rule table
    pub fn start(config: AppConfig) -> Self {
        let (rules, rules_issue) = RuleSet::load_or_empty(&config.rules_path, config.rules_version.clone());
        info!("Session started with {} rule(s)", rules.len());
        Self {
            config,
            reviews: ReviewTable::seeded(),
            rules,
            rules_issue,
        }
    }

    /// Replace the review table from a CSV file. On failure the table is left as it was.
    pub fn upload(&mut self, path: &Path) -> Result<usize, ReviewError> {
        let file = File::open(path)?;
        self.reviews.replace_from_csv(file)
    }

    pub fn submit(&mut self, submission: ReviewSubmission) -> Result<Vec<FlagRecord>, ReviewError> {
        let saved = self.reviews.submit(submission)?;
        let single = ReviewTable::from_records(vec![saved.clone()]);
        Ok(audit(&single, &self.rules))
    }

    pub fn audit(&self) -> AuditReport {
        let flags = audit(&self.reviews, &self.rules);
        AuditReport {
            rules_version: self.rules.version().to_string(),
            histogram: category_histogram(&flags),
            flags,
        }
    }

    pub fn fairness(&self, group_by: GroupBy, threshold: MeetsThreshold) -> GroupSummary {
        summarize_with(self.reviews.records(), group_by, threshold, &self.config.fairness())
    }

    /// Write the review table to `path`, or to the default export name in the working directory
    pub fn export_reviews(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(REVIEW_EXPORT_FILE_NAME));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        self.reviews.write_csv(BufWriter::new(file))?;
        info!("Exported {} review(s) to {}", self.reviews.len(), path.display());
        Ok(path)
    }

    /// Write a timestamped flags snapshot into `dir`. Returns `None` when there is nothing to export.
    pub fn export_flags(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let flags = audit(&self.reviews, &self.rules);
        if flags.is_empty() {
            return Ok(None);
        }
        let path = dir.join(flags_file_name(&Local::now()));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_flags_csv(&flags, BufWriter::new(file))?;
        info!("Exported {} flag(s) to {}", flags.len(), path.display());
        Ok(Some(path))
    }

    /// Banner text for a rule-table problem
    pub fn rules_banner(&self) -> Option<String> {
        self.rules_issue.as_ref().map(|issue| match issue.severity() {
            LoadSeverity::Warning => format!("warning: {issue}"),
            LoadSeverity::Error => format!("error: {issue}"),
        })
    }
}

/// Surface an upload failure without ending the session
pub fn report_upload_error(path: &Path, err: &ReviewError) -> String {
    error!("Upload of {} rejected: {}", path.display(), err);
    format!("error: {err} (session table left unchanged)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_model::{Gender, Role};

    fn session_without_rules() -> Session {
        let config = AppConfig {
            rules_path: PathBuf::from("no/such/bias_rules.csv"),
            ..AppConfig::default()
        };
        Session::start(config)
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fairlens-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_rules_is_warning_banner() {
        let session = session_without_rules();
        assert!(session.rules.is_empty());
        assert_eq!(session.rules.version(), "v1.1-lexicon-30");
        assert!(session.rules_banner().unwrap().starts_with("warning:"));
        assert_eq!(session.reviews.len(), 10);
    }

    #[test]
    fn test_audit_report_counts_match() {
        let report = session_without_rules().audit();
        assert_eq!(report.histogram.values().sum::<usize>(), report.flags.len());
        assert!(report.flags.iter().any(|f| f.employee_id == "E004" && f.phrase == "not a good fit"));
    }

    #[test]
    fn test_submit_flags_new_review_only() {
        let mut session = session_without_rules();
        let flags = session
            .submit(ReviewSubmission {
                employee_id: "E011".to_string(),
                role: Role::Engineer,
                gender: Gender::Female,
                kpi_rating: 4,
                competency_rating: 4,
                initiative_rating: 3,
                overall_rating: 4,
                comment: "Very assertive in design reviews.".to_string(),
            })
            .unwrap();
        assert_eq!(session.reviews.len(), 11);
        assert!(flags.iter().all(|f| f.employee_id == "E011"));
        assert!(flags.iter().any(|f| f.phrase == "assertive (gendered)"));
    }

    #[test]
    fn test_bad_upload_keeps_table() {
        let dir = scratch_dir("upload");
        let path = dir.join("bad.csv");
        std::fs::write(&path, "employee_id,role\nE1,Sales\n").unwrap();

        let mut session = session_without_rules();
        let err = session.upload(&path).unwrap_err();
        assert!(matches!(err, ReviewError::MissingColumns(_)));
        assert_eq!(session.reviews, ReviewTable::seeded());
        assert!(report_upload_error(&path, &err).starts_with("error: CSV missing columns"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_then_upload_round_trip() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join(REVIEW_EXPORT_FILE_NAME);

        let session = session_without_rules();
        session.export_reviews(Some(&path)).unwrap();

        let mut reloaded = session_without_rules();
        reloaded.reviews = ReviewTable::new();
        assert_eq!(reloaded.upload(&path).unwrap(), 10);
        assert_eq!(reloaded.reviews, session.reviews);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_flags_snapshot() {
        let dir = scratch_dir("flags");
        let session = session_without_rules();
        let path = session.export_flags(&dir).unwrap().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("flags_") && name.ends_with(".csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("employee_id,role,gender,phrase,category,tip\n"));

        let mut empty = session_without_rules();
        empty.reviews = ReviewTable::new();
        assert!(empty.export_flags(&dir).unwrap().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_fairness_uses_config_thresholds() {
        let mut session = session_without_rules();
        session.config.min_group_size = 6;
        let summary = session.fairness(GroupBy::Role, MeetsThreshold::default());
        assert!(summary.groups.iter().all(|g| g.small_sample));
    }
}
