//! Group Summary Computation

use crate::config::{FairnessConfig, GroupBy, MeetsThreshold};
use review_model::{RatingColumn, ReviewRecord};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Slack for comparing rounded-looking ratios against policy thresholds
const EPSILON: f64 = 1e-9;

/// Mean and count of one rating column within a group
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    /// Rounded to 2 decimal places
    pub mean: f64,
    pub count: usize,
}

/// Summary row for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub group: String,
    pub kpi_rating: ColumnStats,
    pub competency_rating: ColumnStats,
    pub initiative_rating: ColumnStats,
    pub overall_rating: ColumnStats,
    /// Fewer reviews than the configured minimum for aggregation
    pub small_sample: bool,
}

impl GroupRow {
    pub fn stats(&self, column: RatingColumn) -> ColumnStats {
        match column {
            RatingColumn::Kpi => self.kpi_rating,
            RatingColumn::Competency => self.competency_rating,
            RatingColumn::Initiative => self.initiative_rating,
            RatingColumn::Overall => self.overall_rating,
        }
    }
}

/// Meets/exceeds rate for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub group: String,
    pub rate: f64,
}

/// Why a statistic could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailable {
    FewerThanTwoGroups,
    ZeroMaxRate,
}

/// A statistic that degrades to "unavailable" instead of failing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Statistic<T> {
    Available(T),
    Unavailable(Unavailable),
}

impl<T> Statistic<T> {
    pub fn available(&self) -> Option<&T> {
        match self {
            Statistic::Available(value) => Some(value),
            Statistic::Unavailable(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapVerdict {
    CalibrationReview,
    NoStrongDisparity,
}

/// Mean overall-rating gap between the two most frequent groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub first_group: String,
    pub first_mean: f64,
    pub second_group: String,
    pub second_mean: f64,
    pub gap: f64,
    /// Groups present but left out of the two-group comparison
    pub ignored_groups: Vec<String>,
    pub verdict: GapVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirVerdict {
    InvestigateDisparity,
    NoAdverseImpact,
}

/// Adverse-impact ratio over every group present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirReport {
    pub min_rate: f64,
    pub max_rate: f64,
    pub air: f64,
    pub verdict: AirVerdict,
}

/// Fairness readout for one grouping attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group_by: GroupBy,
    pub threshold: MeetsThreshold,
    /// Ordered by group label
    pub groups: Vec<GroupRow>,
    /// Same order as `groups`
    pub rates: Vec<GroupRate>,
    pub gap: Statistic<GapReport>,
    pub air: Statistic<AirReport>,
}

impl GroupSummary {
    /// AIR value, NaN when unavailable
    pub fn air_value(&self) -> f64 {
        self.air.available().map_or(f64::NAN, |report| report.air)
    }
}

/// Two decimals, ties to even
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// A group with its members, in first-encountered order
struct Partition<'a> {
    label: &'static str,
    members: Vec<&'a ReviewRecord>,
}

impl Partition<'_> {
    fn column_stats(&self, column: RatingColumn) -> ColumnStats {
        ColumnStats {
            mean: round2(self.column_mean(column)),
            count: self.members.len(),
        }
    }

    fn column_mean(&self, column: RatingColumn) -> f64 {
        mean(self.members.iter().map(|r| r.rating(column).as_f64()))
    }

    fn meets_rate(&self, threshold: MeetsThreshold) -> f64 {
        mean(self.members.iter().map(|r| {
            if r.overall_rating.as_f64() >= threshold.value() {
                1.0
            } else {
                0.0
            }
        }))
    }
}

fn partition(reviews: &[ReviewRecord], group_by: GroupBy) -> Vec<Partition<'_>> {
    let mut index: HashMap<&'static str, usize> = HashMap::new();
    let mut partitions: Vec<Partition<'_>> = Vec::new();
    for review in reviews {
        let Some(label) = group_by.label(review) else {
            continue;
        };
        let slot = *index.entry(label).or_insert_with(|| {
            partitions.push(Partition {
                label,
                members: Vec::new(),
            });
            partitions.len() - 1
        });
        partitions[slot].members.push(review);
    }
    partitions
}

/// Summarize with the default policy thresholds
pub fn summarize(
    reviews: &[ReviewRecord],
    group_by: GroupBy,
    threshold: MeetsThreshold,
) -> GroupSummary {
    summarize_with(reviews, group_by, threshold, &FairnessConfig::default())
}

/// Group reviews by `group_by` and compute stats, rates, gap and AIR.
///
/// Reviews without a value for the attribute are dropped. Never fails: too few
/// groups or a zero maximum rate yield `Statistic::Unavailable`.
pub fn summarize_with(
    reviews: &[ReviewRecord],
    group_by: GroupBy,
    threshold: MeetsThreshold,
    config: &FairnessConfig,
) -> GroupSummary {
    let partitions = partition(reviews, group_by);

    let mut sorted: Vec<&Partition<'_>> = partitions.iter().collect();
    sorted.sort_by_key(|p| p.label);

    let groups: Vec<GroupRow> = sorted
        .iter()
        .map(|p| {
            let small_sample = p.members.len() < config.min_group_size;
            if small_sample {
                warn!(
                    "{}={} has {} review(s); below n >= {} for aggregation",
                    group_by,
                    p.label,
                    p.members.len(),
                    config.min_group_size
                );
            }
            GroupRow {
                group: p.label.to_string(),
                kpi_rating: p.column_stats(RatingColumn::Kpi),
                competency_rating: p.column_stats(RatingColumn::Competency),
                initiative_rating: p.column_stats(RatingColumn::Initiative),
                overall_rating: p.column_stats(RatingColumn::Overall),
                small_sample,
            }
        })
        .collect();

    let rates: Vec<GroupRate> = sorted
        .iter()
        .map(|p| GroupRate {
            group: p.label.to_string(),
            rate: p.meets_rate(threshold),
        })
        .collect();

    for rate in &rates {
        debug!("{}={} meets/exceeds rate {:.2}", group_by, rate.group, rate.rate);
    }

    GroupSummary {
        group_by,
        threshold,
        gap: mean_gap(&partitions, group_by, config),
        air: adverse_impact(&rates, config),
        groups,
        rates,
    }
}

fn mean_gap(partitions: &[Partition<'_>], group_by: GroupBy, config: &FairnessConfig) -> Statistic<GapReport> {
    if partitions.len() < 2 {
        return Statistic::Unavailable(Unavailable::FewerThanTwoGroups);
    }

    // Stable sort keeps first-encountered order among equally frequent groups
    let mut by_frequency: Vec<&Partition<'_>> = partitions.iter().collect();
    by_frequency.sort_by(|a, b| b.members.len().cmp(&a.members.len()));

    let (first, second) = (by_frequency[0], by_frequency[1]);
    let ignored_groups: Vec<String> = by_frequency[2..]
        .iter()
        .map(|p| p.label.to_string())
        .collect();
    if !ignored_groups.is_empty() {
        warn!(
            "Gap compares {}={} and {}={} only; ignoring {:?}",
            group_by, first.label, second.label, group_by, ignored_groups
        );
    }

    let first_mean = first.column_mean(RatingColumn::Overall);
    let second_mean = second.column_mean(RatingColumn::Overall);
    let gap = (first_mean - second_mean).abs();
    let verdict = if gap + EPSILON >= config.gap_alert {
        GapVerdict::CalibrationReview
    } else {
        GapVerdict::NoStrongDisparity
    };

    Statistic::Available(GapReport {
        first_group: first.label.to_string(),
        first_mean,
        second_group: second.label.to_string(),
        second_mean,
        gap,
        ignored_groups,
        verdict,
    })
}

fn adverse_impact(rates: &[GroupRate], config: &FairnessConfig) -> Statistic<AirReport> {
    if rates.len() < 2 {
        return Statistic::Unavailable(Unavailable::FewerThanTwoGroups);
    }

    let max_rate = rates.iter().map(|r| r.rate).fold(f64::MIN, f64::max);
    let min_rate = rates.iter().map(|r| r.rate).fold(f64::MAX, f64::min);
    if max_rate <= 0.0 {
        return Statistic::Unavailable(Unavailable::ZeroMaxRate);
    }

    let air = min_rate / max_rate;
    let verdict = if air + EPSILON < config.air_alert {
        AirVerdict::InvestigateDisparity
    } else {
        AirVerdict::NoAdverseImpact
    };

    Statistic::Available(AirReport {
        min_rate,
        max_rate,
        air,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use review_model::{Gender, Rating, Role};

    fn review(id: usize, role: Option<Role>, gender: Option<Gender>, overall: u8) -> ReviewRecord {
        let rating = |v: u8| Rating::new("overall_rating", v as i64).unwrap();
        ReviewRecord {
            employee_id: format!("E{id:03}"),
            role,
            gender,
            kpi_rating: rating(overall),
            competency_rating: rating(3),
            initiative_rating: rating(3),
            overall_rating: rating(overall),
            comment: String::new(),
        }
    }

    fn two_roles(a: &[u8], b: &[u8]) -> Vec<ReviewRecord> {
        let mut reviews = Vec::new();
        for &r in a {
            reviews.push(review(reviews.len(), Some(Role::Manager), Some(Gender::Female), r));
        }
        for &r in b {
            reviews.push(review(reviews.len(), Some(Role::Analyst), Some(Gender::Male), r));
        }
        reviews
    }

    #[test]
    fn test_gap_example_raises_calibration() {
        let reviews = two_roles(&[4, 3, 4, 3, 4], &[3, 3, 3, 3, 3]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());

        let gap = summary.gap.available().unwrap();
        assert_eq!(gap.first_group, "Manager");
        assert_eq!(gap.second_group, "Analyst");
        assert!((gap.first_mean - 3.6).abs() < 1e-9);
        assert!((gap.gap - 0.6).abs() < 1e-9);
        assert_eq!(gap.verdict, GapVerdict::CalibrationReview);
        assert!(gap.ignored_groups.is_empty());
    }

    #[test]
    fn test_gap_below_alert() {
        let reviews = two_roles(&[3, 3, 3, 4], &[3, 3, 3, 3]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());
        let gap = summary.gap.available().unwrap();
        assert!((gap.gap - 0.25).abs() < 1e-9);
        assert_eq!(gap.verdict, GapVerdict::NoStrongDisparity);
    }

    #[test]
    fn test_gap_exactly_at_alert_counts() {
        // 3.3 - 3.0 is not exactly 0.3 in floating point
        let reviews = two_roles(&[4, 4, 4, 3, 3, 3, 3, 3, 3, 3], &[3, 3, 3, 3, 3, 3, 3, 3, 3, 3]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());
        assert_eq!(summary.gap.available().unwrap().verdict, GapVerdict::CalibrationReview);
    }

    #[test]
    fn test_air_example_raises_signal() {
        let reviews = two_roles(&[3, 4, 5, 3, 4], &[3, 3, 3, 2, 1]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::new(3.0).unwrap());

        assert_eq!(
            summary.rates,
            vec![
                GroupRate { group: "Analyst".to_string(), rate: 0.6 },
                GroupRate { group: "Manager".to_string(), rate: 1.0 },
            ]
        );
        let air = summary.air.available().unwrap();
        assert!((air.air - 0.6).abs() < 1e-9);
        assert_eq!(air.verdict, AirVerdict::InvestigateDisparity);
    }

    #[test]
    fn test_air_at_four_fifths_passes() {
        let reviews = two_roles(&[3, 3, 3, 3, 3], &[3, 3, 3, 3, 1]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());
        let air = summary.air.available().unwrap();
        assert!((air.air - 0.8).abs() < 1e-9);
        assert_eq!(air.verdict, AirVerdict::NoAdverseImpact);
    }

    #[test]
    fn test_zero_max_rate_is_unavailable() {
        let reviews = two_roles(&[1, 2], &[2, 1]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::new(4.5).unwrap());
        assert_eq!(summary.air, Statistic::Unavailable(Unavailable::ZeroMaxRate));
        assert!(summary.air_value().is_nan());
        assert!(summary.gap.available().is_some());
    }

    #[test]
    fn test_single_group_is_unavailable() {
        let reviews = two_roles(&[3, 4, 5], &[]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());
        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.gap, Statistic::Unavailable(Unavailable::FewerThanTwoGroups));
        assert_eq!(summary.air, Statistic::Unavailable(Unavailable::FewerThanTwoGroups));
    }

    #[test]
    fn test_empty_input_is_total() {
        let summary = summarize(&[], GroupBy::Gender, MeetsThreshold::default());
        assert!(summary.groups.is_empty());
        assert!(summary.rates.is_empty());
        assert!(summary.gap.available().is_none());
        assert!(summary.air.available().is_none());
    }

    #[test]
    fn test_missing_attribute_dropped() {
        let mut reviews = two_roles(&[4, 4], &[3, 3]);
        reviews.push(review(99, None, None, 1));
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());
        let counted: usize = summary.groups.iter().map(|g| g.overall_rating.count).sum();
        assert_eq!(counted, 4);
    }

    #[test]
    fn test_group_rows_sorted_and_rounded() {
        let reviews = two_roles(&[4, 4, 3], &[3, 3, 3, 3, 3]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());
        assert_eq!(summary.groups[0].group, "Analyst");
        let manager = &summary.groups[1];
        assert_eq!(manager.group, "Manager");
        assert_eq!(manager.overall_rating, ColumnStats { mean: 3.67, count: 3 });
        assert_eq!(manager.stats(RatingColumn::Competency).mean, 3.0);
        assert!(manager.small_sample);
        assert!(!summary.groups[0].small_sample);
    }

    #[test]
    fn test_means_round_half_to_even() {
        let reviews = two_roles(&[3, 3, 3, 3, 3, 3, 3, 4], &[3, 3, 3, 3, 3]);
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());
        let manager = &summary.groups[1];
        assert_eq!(manager.stats(RatingColumn::Kpi), ColumnStats { mean: 3.12, count: 8 });
        assert_eq!(round2(3.375), 3.38);
    }

    #[test]
    fn test_ties_broken_by_first_encountered() {
        let mut reviews = Vec::new();
        reviews.push(review(1, Some(Role::Sales), None, 5));
        reviews.push(review(2, Some(Role::Engineer), None, 2));
        reviews.push(review(3, Some(Role::Manager), None, 3));
        reviews.push(review(4, Some(Role::Engineer), None, 2));
        reviews.push(review(5, Some(Role::Sales), None, 5));
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::default());

        let gap = summary.gap.available().unwrap();
        assert_eq!(gap.first_group, "Sales");
        assert_eq!(gap.second_group, "Engineer");
        assert_eq!(gap.ignored_groups, vec!["Manager".to_string()]);
        assert!((gap.gap - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_air_uses_all_groups() {
        let mut reviews = two_roles(&[4, 4, 4, 4], &[4, 4, 4, 3]);
        reviews.push(review(50, Some(Role::Sales), None, 1));
        reviews.push(review(51, Some(Role::Sales), None, 4));
        let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::new(4.0).unwrap());
        let air = summary.air.available().unwrap();
        assert!((air.air - 0.5).abs() < 1e-9);
        assert_eq!(summary.gap.available().unwrap().ignored_groups, vec!["Sales".to_string()]);
    }

    #[test]
    fn test_seeded_gender_summary() {
        let table = review_model::ReviewTable::seeded();
        let summary = summarize(table.records(), GroupBy::Gender, MeetsThreshold::default());
        assert_eq!(summary.groups.len(), 2);
        let gap = summary.gap.available().unwrap();
        // F: 4,3,4,3,4 vs M: 3,3,3,3,3
        assert!((gap.gap - 0.6).abs() < 1e-9);
        assert_eq!(gap.verdict, GapVerdict::CalibrationReview);
        assert_eq!(summary.air.available().unwrap().verdict, AirVerdict::NoAdverseImpact);
    }

    fn ratings() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(1u8..=5, 1..12)
    }

    proptest! {
        #[test]
        fn prop_gap_and_air_symmetric(a in ratings(), b in ratings(), t in 2u8..=10) {
            let threshold = MeetsThreshold::new(t as f64 / 2.0).unwrap();
            let forward = summarize(&two_roles(&a, &b), GroupBy::Role, threshold);
            let swapped = summarize(&two_roles(&b, &a), GroupBy::Role, threshold);

            let gap_f = forward.gap.available().unwrap().gap;
            let gap_s = swapped.gap.available().unwrap().gap;
            prop_assert!((gap_f - gap_s).abs() < 1e-12);

            match (&forward.air, &swapped.air) {
                (Statistic::Available(f), Statistic::Available(s)) => {
                    prop_assert!((f.air - s.air).abs() < 1e-12);
                }
                (f, s) => prop_assert_eq!(f, s),
            }
        }

        #[test]
        fn prop_air_in_unit_interval(a in ratings(), b in ratings(), c in ratings(), t in 2u8..=10) {
            let mut reviews = two_roles(&a, &b);
            for &r in &c {
                reviews.push(review(reviews.len(), Some(Role::Sales), None, r));
            }
            let summary = summarize(&reviews, GroupBy::Role, MeetsThreshold::new(t as f64 / 2.0).unwrap());
            match summary.air {
                Statistic::Available(report) => {
                    prop_assert!(report.max_rate > 0.0);
                    prop_assert!((0.0..=1.0).contains(&report.air));
                }
                Statistic::Unavailable(reason) => prop_assert_eq!(reason, Unavailable::ZeroMaxRate),
            }
        }
    }
}
