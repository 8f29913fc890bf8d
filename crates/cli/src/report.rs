//! Text Rendering for Audit and Fairness Views

use fairness::{
    AirVerdict, FairnessConfig, GapVerdict, GroupSummary, Statistic, Unavailable,
};
use review_model::{RatingColumn, ReviewTable};
use rule_engine::FlagRecord;
use std::collections::BTreeMap;

/// Fixed privacy and governance statement
pub const PRIVACY_POLICY: &str = "\
- No PII: use anonymized IDs only.
- Aggregation-first: group metrics only when n >= 5 per group.
- Retention: session-based; no server persistence. Export locally if needed.
- Explainability: rule-based flags are transparent and editable via the rule table.
- Compliance touchpoints: Title VII principles; AIR (4/5ths) as a rule-of-thumb.";

pub fn render_privacy(rules_version: &str) -> String {
    format!("{PRIVACY_POLICY}\n- Rules version: {rules_version}\n")
}

pub fn render_reviews(table: &ReviewTable) -> String {
    let mut out = format!("{:<8} {:<9} {:<17} KPI COMP INIT OVR  COMMENT\n", "ID", "ROLE", "GENDER");
    for review in table.iter() {
        out.push_str(&format!(
            "{:<8} {:<9} {:<17} {:>3} {:>4} {:>4} {:>3}  {}\n",
            review.employee_id,
            review.role_label(),
            review.gender_label(),
            review.kpi_rating.value(),
            review.competency_rating.value(),
            review.initiative_rating.value(),
            review.overall_rating.value(),
            review.comment
        ));
    }
    out
}

pub fn render_flags(flags: &[FlagRecord]) -> String {
    if flags.is_empty() {
        return "No flags detected by current rules.\n".to_string();
    }

    let mut out = String::new();
    for flag in flags {
        out.push_str(&format!(
            "{:<8} {:<9} {:<17} {:<14} {}\n",
            flag.employee_id, flag.role, flag.gender, flag.category, flag.phrase
        ));
        if !flag.tip.is_empty() {
            out.push_str(&format!("{:>8} tip: {}\n", "", flag.tip));
        }
    }
    out.push_str("Use flags as coaching signals; rewrite with behavior-based evidence.\n");
    out
}

pub fn render_histogram(histogram: &BTreeMap<String, usize>) -> String {
    histogram
        .iter()
        .map(|(category, count)| format!("{:<16} {:>3} {}\n", category, count, "#".repeat(*count)))
        .collect()
}

fn unavailable_reason(reason: Unavailable) -> &'static str {
    match reason {
        Unavailable::FewerThanTwoGroups => "provide at least two groups",
        Unavailable::ZeroMaxRate => "no group meets the threshold",
    }
}

fn render_group_table(summary: &GroupSummary, config: &FairnessConfig) -> String {
    let mut out = format!("{:<18}", summary.group_by.as_str());
    for column in RatingColumn::ALL {
        out.push_str(&format!(" {:>18}", format!("{} mean/n", column.column_name())));
    }
    out.push('\n');

    for row in &summary.groups {
        out.push_str(&format!("{:<18}", row.group));
        for column in RatingColumn::ALL {
            let stats = row.stats(column);
            out.push_str(&format!(" {:>18}", format!("{:.2}/{}", stats.mean, stats.count)));
        }
        if row.small_sample {
            out.push_str(&format!("  (n < {})", config.min_group_size));
        }
        out.push('\n');
    }
    out
}

fn render_gap(summary: &GroupSummary, config: &FairnessConfig) -> String {
    let by = summary.group_by;
    let gap = match &summary.gap {
        Statistic::Available(gap) => gap,
        Statistic::Unavailable(reason) => {
            return format!("Gap unavailable: {}.\n", unavailable_reason(*reason));
        }
    };

    let mut out = format!(
        "{by}={}: {:.2}  vs  {by}={}: {:.2}  -> Gap = {:.2}\n",
        gap.first_group, gap.first_mean, gap.second_group, gap.second_mean, gap.gap
    );
    out.push_str(&match gap.verdict {
        GapVerdict::CalibrationReview => format!(
            "Gap >= {:.2} (1-5 scale): consider calibration review.\n",
            config.gap_alert
        ),
        GapVerdict::NoStrongDisparity => format!(
            "Mean gap < {:.2}: no strong disparity indicated.\n",
            config.gap_alert
        ),
    });
    if !gap.ignored_groups.is_empty() {
        out.push_str(&format!(
            "Note: gap compares the two most frequent groups only; not compared: {}\n",
            gap.ignored_groups.join(", ")
        ));
    }
    out
}

fn render_rates(summary: &GroupSummary, config: &FairnessConfig) -> String {
    let mut out = format!("Meets/exceeds rate (overall >= {}):\n", summary.threshold);
    for rate in &summary.rates {
        out.push_str(&format!("  {:<18} {:.2}\n", rate.group, rate.rate));
    }

    match &summary.air {
        Statistic::Available(air) => {
            out.push_str(&format!(
                "AIR (min/max) = {:.2} (rule-of-thumb >= {:.2})\n",
                air.air, config.air_alert
            ));
            out.push_str(&match air.verdict {
                AirVerdict::InvestigateDisparity => format!(
                    "AIR < {:.2}: investigate disparity (sample size, criteria clarity, rater training).\n",
                    config.air_alert
                ),
                AirVerdict::NoAdverseImpact => format!(
                    "AIR >= {:.2}: no adverse impact signal on this proxy.\n",
                    config.air_alert
                ),
            });
        }
        Statistic::Unavailable(reason) => {
            out.push_str(&format!("AIR = n/a ({}).\n", unavailable_reason(*reason)));
        }
    }
    out
}

pub fn render_summary(summary: &GroupSummary, config: &FairnessConfig) -> String {
    [
        render_group_table(summary, config),
        render_gap(summary, config),
        render_rates(summary, config),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairness::{summarize, GroupBy, MeetsThreshold};
    use rule_engine::{audit, category_histogram, RuleSet};

    #[test]
    fn test_privacy_includes_version() {
        let text = render_privacy("v9-test");
        assert!(text.starts_with("- No PII"));
        assert!(text.ends_with("- Rules version: v9-test\n"));
    }

    #[test]
    fn test_render_seeded_summary() {
        let table = ReviewTable::seeded();
        let summary = summarize(table.records(), GroupBy::Gender, MeetsThreshold::default());
        let text = render_summary(&summary, &FairnessConfig::default());
        assert!(text.contains("gender=F: 3.60  vs  gender=M: 3.00  -> Gap = 0.60"));
        assert!(text.contains("consider calibration review"));
        assert!(text.contains("\n\nMeets/exceeds rate (overall >= 3.0):\n"));
        assert!(text.contains("AIR (min/max) = 1.00"));
        assert!(!text.contains("(n < 5)"));
    }

    #[test]
    fn test_render_unavailable() {
        let summary = summarize(&[], GroupBy::Role, MeetsThreshold::default());
        let text = render_summary(&summary, &FairnessConfig::default());
        assert!(text.contains("Gap unavailable: provide at least two groups."));
        assert!(text.contains("AIR = n/a"));
    }

    #[test]
    fn test_render_flags_and_histogram() {
        let flags = audit(&ReviewTable::seeded(), &RuleSet::empty("none"));
        let text = render_flags(&flags);
        assert!(text.contains("not a good fit"));
        assert!(text.contains("tip: Focus on job criteria"));

        let histogram = render_histogram(&category_histogram(&flags));
        assert!(histogram.starts_with("Bias"));
        assert!(render_flags(&[]).starts_with("No flags detected"));
    }
}
