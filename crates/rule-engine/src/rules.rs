//! Rule Table Loading

use crate::error::{LoadSeverity, RuleLoadError};
use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Header columns the lexicon file must carry
pub const RULE_COLUMNS: [&str; 4] = ["phrase", "category", "context_rule", "tip"];

/// Flag category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleCategory {
    Vague,
    Bias,
    PositiveVague,
    /// Any other label, kept in title case
    Other(String),
}

impl RuleCategory {
    /// Normalize a category cell: case, surrounding space and separators are ignored
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        let key: String = trimmed
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        match key.as_str() {
            "vague" => RuleCategory::Vague,
            "bias" => RuleCategory::Bias,
            "positive-vague" => RuleCategory::PositiveVague,
            _ => RuleCategory::Other(title_case(trimmed)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuleCategory::Vague => "Vague",
            RuleCategory::Bias => "Bias",
            RuleCategory::PositiveVague => "Positive-Vague",
            RuleCategory::Other(label) => label,
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for RuleCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut at_word_start = true;
    for c in label.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Matching strategy attached to a lexicon entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextRule {
    /// Case-insensitive substring
    Always,
    /// Phrase is a case-insensitive regular expression
    Pattern,
    /// Substring, only when the comment mentions a review setting
    ReviewContext,
    /// Substring, only for female-indicated reviewees
    IfGenderFemale,
    /// Unrecognized rule name; behaves as a plain substring match
    Substring(String),
}

impl ContextRule {
    pub fn parse(label: &str) -> Self {
        let key = label.trim().to_lowercase();
        match key.as_str() {
            "always" => ContextRule::Always,
            "pattern" => ContextRule::Pattern,
            "review_context" => ContextRule::ReviewContext,
            "if_gender_female" => ContextRule::IfGenderFemale,
            _ => ContextRule::Substring(key),
        }
    }
}

/// One lexicon entry
#[derive(Debug, Clone)]
pub struct RuleRecord {
    pub phrase: String,
    pub category: RuleCategory,
    pub context_rule: ContextRule,
    pub tip: String,
    pub(crate) phrase_lower: String,
    /// Compiled form of `phrase` for `pattern` rules; `None` if it failed to compile
    pub(crate) pattern: Option<Regex>,
}

impl RuleRecord {
    pub fn new(
        phrase: impl Into<String>,
        category: RuleCategory,
        context_rule: ContextRule,
        tip: impl Into<String>,
    ) -> Self {
        let phrase = phrase.into();
        let pattern = match context_rule {
            ContextRule::Pattern => match RegexBuilder::new(&phrase).case_insensitive(true).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Pattern rule {:?} does not compile and will never match: {}", phrase, e);
                    None
                }
            },
            _ => None,
        };

        Self {
            phrase_lower: phrase.to_lowercase(),
            phrase,
            category,
            context_rule,
            tip: tip.into(),
            pattern,
        }
    }
}

/// Read-only rule table, loaded once and shared by every audit pass
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    version: String,
    rules: Vec<RuleRecord>,
}

impl RuleSet {
    pub fn new(version: impl Into<String>, rules: Vec<RuleRecord>) -> Self {
        Self {
            version: version.into(),
            rules,
        }
    }

    /// An empty rule set tagged with `version`
    pub fn empty(version: impl Into<String>) -> Self {
        Self::new(version, Vec::new())
    }

    /// Load the pipe-delimited lexicon at `path`
    pub fn load(path: impl AsRef<Path>, version: impl Into<String>) -> Result<Self, RuleLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RuleLoadError::NotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            return Err(RuleLoadError::Unreadable(format!("{}: is a directory", path.display())));
        }
        let file = File::open(path)
            .map_err(|e| RuleLoadError::Unreadable(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(file, version)
    }

    /// Parse a pipe-delimited lexicon with header `phrase|category|context_rule|tip`
    pub fn from_reader<R: Read>(reader: R, version: impl Into<String>) -> Result<Self, RuleLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| RuleLoadError::Unreadable(e.to_string()))?
            .clone();

        let mut indices = [0usize; 4];
        let mut missing = Vec::new();
        for (slot, column) in indices.iter_mut().zip(RULE_COLUMNS) {
            match headers.iter().position(|h| h == column) {
                Some(i) => *slot = i,
                None => missing.push(column.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(RuleLoadError::MissingColumns(missing));
        }
        let [phrase_idx, category_idx, rule_idx, tip_idx] = indices;

        let mut rules = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row.map_err(|e| RuleLoadError::Unreadable(e.to_string()))?;
            let cell = |i: usize| row.get(i).unwrap_or("");

            let phrase = cell(phrase_idx);
            if phrase.trim().is_empty() {
                warn!("Skipping rule row {} with blank phrase", line + 1);
                continue;
            }

            let rule = RuleRecord::new(
                phrase,
                RuleCategory::parse(cell(category_idx)),
                ContextRule::parse(cell(rule_idx)),
                cell(tip_idx).trim(),
            );
            debug!("Rule {:?} ({}, {:?})", rule.phrase, rule.category, rule.context_rule);
            rules.push(rule);
        }

        Ok(Self::new(version, rules))
    }

    /// Load the lexicon, degrading to an empty rule set on any failure. The
    /// failure is logged and handed back so the caller can surface it.
    pub fn load_or_empty(
        path: impl AsRef<Path>,
        version: impl Into<String>,
    ) -> (Self, Option<RuleLoadError>) {
        let version = version.into();
        match Self::load(path, version.clone()) {
            Ok(rules) => {
                info!("Loaded {} rules (version {})", rules.len(), rules.version);
                (rules, None)
            }
            Err(e) => {
                match e.severity() {
                    LoadSeverity::Warning => warn!("{}", e),
                    LoadSeverity::Error => error!("{}", e),
                }
                (Self::empty(version), Some(e))
            }
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rules(&self) -> &[RuleRecord] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
