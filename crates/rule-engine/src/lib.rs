//! Review Comment Rule Engine
//!
//! Flags vague or biased phrases in performance-review comments. A pipe-delimited
//! lexicon drives most matches; a few built-in heuristics cover what a flat
//! phrase list cannot express (negation windows, praise without evidence,
//! gendered descriptors).

mod audit;
mod error;
mod matcher;
mod rules;

pub use audit::{audit, category_histogram, flags_file_name, write_flags_csv, FlagRecord};
pub use error::{ExportError, LoadSeverity, RuleLoadError};
pub use matcher::{
    evaluate, is_positive_without_evidence, FlagMatch, BEHAVIOR_VERBS, CONTEXT_WORDS,
    POSITIVE_WORDS,
};
pub use rules::{ContextRule, RuleCategory, RuleRecord, RuleSet, RULE_COLUMNS};
