//! Fairness Configuration

use crate::error::FairnessError;
use review_model::ReviewRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy thresholds for fairness readouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessConfig {
    /// Mean gap (1-5 scale) at or above which calibration review is advised
    pub gap_alert: f64,
    /// AIR below which a disparity investigation is advised (four-fifths rule)
    pub air_alert: f64,
    /// Groups smaller than this are marked as small samples
    pub min_group_size: usize,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            gap_alert: 0.30,
            air_alert: 0.80,
            min_group_size: 5,
        }
    }
}

/// Overall rating at or above which a review counts as meets/exceeds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct MeetsThreshold(f64);

impl MeetsThreshold {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 5.0;
    pub const STEP: f64 = 0.5;

    pub fn new(value: f64) -> Result<Self, FairnessError> {
        let on_grid = (value / Self::STEP).fract() == 0.0;
        if !value.is_finite() || value < Self::MIN || value > Self::MAX || !on_grid {
            return Err(FairnessError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for MeetsThreshold {
    fn default() -> Self {
        Self(3.0)
    }
}

impl fmt::Display for MeetsThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Attribute reviews are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Gender,
    Role,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Gender => "gender",
            GroupBy::Role => "role",
        }
    }

    /// Group label of a review, `None` when the attribute was not recorded
    pub fn label(&self, review: &ReviewRecord) -> Option<&'static str> {
        match self {
            GroupBy::Gender => review.gender.map(|g| g.as_str()),
            GroupBy::Role => review.role.map(|r| r.as_str()),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = FairnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gender" => Ok(GroupBy::Gender),
            "role" => Ok(GroupBy::Role),
            other => Err(FairnessError::UnknownGroupBy(other.to_string())),
        }
    }
}
