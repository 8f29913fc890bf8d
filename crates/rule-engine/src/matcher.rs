//! Comment Matching and Built-in Heuristics

use crate::rules::{ContextRule, RuleCategory, RuleRecord};
use review_model::is_female_indicator;
use serde::Serialize;
use tracing::debug;

/// Words that place a comment in a review setting for `review_context` rules
pub const CONTEXT_WORDS: [&str; 5] = ["meeting", "feedback", "discussion", "call", "review"];

/// Praise vocabulary for the positive-without-evidence heuristic
pub const POSITIVE_WORDS: [&str; 9] = [
    "good",
    "great",
    "improved",
    "improving",
    "excellent",
    "amazing",
    "nice",
    "pleasant",
    "awesome",
];

/// Action verbs that count as behavioral evidence
pub const BEHAVIOR_VERBS: [&str; 13] = [
    "completed",
    "delivered",
    "reduced",
    "increased",
    "launched",
    "led",
    "designed",
    "documented",
    "resolved",
    "trained",
    "implemented",
    "created",
    "shipped",
];

/// Characters before "fit" searched for a negation
const NEGATION_WINDOW: usize = 20;

const POSITIVE_VAGUE_TIP: &str =
    "Add a number or behavior (who/what/result). e.g., \u{201c}Completed 95% of Q3 deliverables.\u{201d}";
const NEGATED_FIT_TIP: &str = "Focus on job criteria: name specific gap vs role rubric.";
const ASSERTIVE_TIP: &str =
    "Judge the same behaviors consistently regardless of gender; cite behaviors.";

/// A phrase detected in one comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagMatch {
    pub phrase: String,
    pub category: RuleCategory,
    pub tip: String,
}

impl FlagMatch {
    fn new(phrase: &str, category: RuleCategory, tip: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            category,
            tip: tip.to_string(),
        }
    }
}

impl RuleRecord {
    /// Whether this rule fires for a comment. `lower` is the lower-cased comment.
    fn matches(&self, comment: &str, lower: &str, female: bool) -> bool {
        match &self.context_rule {
            ContextRule::Always | ContextRule::Substring(_) => lower.contains(&self.phrase_lower),
            ContextRule::Pattern => self
                .pattern
                .as_ref()
                .map(|re| re.is_match(comment))
                .unwrap_or(false),
            ContextRule::ReviewContext => {
                lower.contains(&self.phrase_lower) && CONTEXT_WORDS.iter().any(|w| lower.contains(w))
            }
            ContextRule::IfGenderFemale => female && lower.contains(&self.phrase_lower),
        }
    }
}

/// Flag a comment against the lexicon, then append the built-in heuristics.
///
/// Every rule is evaluated independently, in table order; a comment may match
/// any number of them.
pub fn evaluate(comment: &str, demographic: &str, rules: &[RuleRecord]) -> Vec<FlagMatch> {
    let lower = comment.to_lowercase();
    let female = is_female_indicator(demographic);

    let mut out: Vec<FlagMatch> = rules
        .iter()
        .filter(|rule| rule.matches(comment, &lower, female))
        .map(|rule| FlagMatch::new(&rule.phrase, rule.category.clone(), &rule.tip))
        .collect();

    if is_positive_without_evidence(comment) {
        out.push(FlagMatch::new(
            "positive-without-evidence",
            RuleCategory::Vague,
            POSITIVE_VAGUE_TIP,
        ));
    }

    if has_negated_fit(&lower) {
        out.push(FlagMatch::new("not a good fit", RuleCategory::Bias, NEGATED_FIT_TIP));
    }

    if female && lower.contains("assertive") {
        out.push(FlagMatch::new("assertive (gendered)", RuleCategory::Bias, ASSERTIVE_TIP));
    }

    debug!("{} flag(s) for comment of {} chars", out.len(), comment.chars().count());
    out
}

/// Praise with neither a number nor an action verb behind it
pub fn is_positive_without_evidence(comment: &str) -> bool {
    let lower = comment.to_lowercase();
    let has_positive = POSITIVE_WORDS.iter().any(|w| lower.contains(w));
    let has_numbers = lower.chars().any(char::is_numeric);
    let has_behavior = BEHAVIOR_VERBS.iter().any(|v| lower.contains(v));
    has_positive && !(has_numbers || has_behavior)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Any whole-word "fit" with "not" in the preceding window
fn has_negated_fit(lower: &str) -> bool {
    lower.match_indices("fit").any(|(start, word)| {
        let end = start + word.len();
        let bounded_left = lower[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
        let bounded_right = lower[end..].chars().next().map_or(true, |c| !is_word_char(c));
        if !(bounded_left && bounded_right) {
            return false;
        }

        let window: String = {
            let mut preceding: Vec<char> = lower[..start].chars().rev().take(NEGATION_WINDOW).collect();
            preceding.reverse();
            preceding.into_iter().collect()
        };
        window.contains("not")
    })
}
