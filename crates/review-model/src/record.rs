//! Review Record Types

use crate::error::ReviewError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower-cased demographic values treated as female for gendered-language checks
pub const FEMALE_INDICATORS: [&str; 6] = ["f", "female", "woman", "women", "she", "her"];

const MALE_INDICATORS: [&str; 6] = ["m", "male", "man", "men", "he", "him"];

/// Whether a free-text demographic value names the female group
pub fn is_female_indicator(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    FEMALE_INDICATORS.contains(&value.as_str())
}

/// Job role, a closed set with an explicit catch-all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Manager,
    Analyst,
    Engineer,
    Sales,
    Other,
}

impl Role {
    /// Every role offered by the submission form
    pub const ALL: [Role; 5] = [
        Role::Manager,
        Role::Analyst,
        Role::Engineer,
        Role::Sales,
        Role::Other,
    ];

    /// Parse a role label. Blank means "not recorded"; unknown labels land in `Other`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let role = match label.to_lowercase().as_str() {
            "manager" => Role::Manager,
            "analyst" => Role::Analyst,
            "engineer" => Role::Engineer,
            "sales" => Role::Sales,
            _ => Role::Other,
        };
        Some(role)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::Analyst => "Analyst",
            Role::Engineer => "Engineer",
            Role::Sales => "Sales",
            Role::Other => "Other",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender used only for group-fairness demonstration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    NonBinaryOther,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Female, Gender::Male, Gender::NonBinaryOther];

    /// Parse a gender label. Blank means "not recorded"; anything unrecognized
    /// lands in `NonBinaryOther`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let lower = label.to_lowercase();
        if FEMALE_INDICATORS.contains(&lower.as_str()) {
            Some(Gender::Female)
        } else if MALE_INDICATORS.contains(&lower.as_str()) {
            Some(Gender::Male)
        } else {
            Some(Gender::NonBinaryOther)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
            Gender::NonBinaryOther => "Non-binary/Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rating on the 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rating(pub(crate) u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw rating for the named column
    pub fn new(field: &'static str, value: i64) -> Result<Self, ReviewError> {
        if value < Self::MIN as i64 || value > Self::MAX as i64 {
            Err(ReviewError::RatingOutOfRange {
                field,
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        } else {
            Ok(Self(value as u8))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

/// The four rating columns of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingColumn {
    Kpi,
    Competency,
    Initiative,
    Overall,
}

impl RatingColumn {
    pub const ALL: [RatingColumn; 4] = [
        RatingColumn::Kpi,
        RatingColumn::Competency,
        RatingColumn::Initiative,
        RatingColumn::Overall,
    ];

    /// Column name in the tabular import/export format
    pub fn column_name(&self) -> &'static str {
        match self {
            RatingColumn::Kpi => "kpi_rating",
            RatingColumn::Competency => "competency_rating",
            RatingColumn::Initiative => "initiative_rating",
            RatingColumn::Overall => "overall_rating",
        }
    }
}

/// One anonymized performance review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Anonymized identifier, never a real name
    pub employee_id: String,
    pub role: Option<Role>,
    pub gender: Option<Gender>,
    pub kpi_rating: Rating,
    pub competency_rating: Rating,
    pub initiative_rating: Rating,
    pub overall_rating: Rating,
    /// Free-text manager comment
    pub comment: String,
}

impl ReviewRecord {
    pub fn rating(&self, column: RatingColumn) -> Rating {
        match column {
            RatingColumn::Kpi => self.kpi_rating,
            RatingColumn::Competency => self.competency_rating,
            RatingColumn::Initiative => self.initiative_rating,
            RatingColumn::Overall => self.overall_rating,
        }
    }

    /// Role label, empty when not recorded
    pub fn role_label(&self) -> &'static str {
        self.role.map(|r| r.as_str()).unwrap_or("")
    }

    /// Gender label, empty when not recorded
    pub fn gender_label(&self) -> &'static str {
        self.gender.map(|g| g.as_str()).unwrap_or("")
    }
}

/// Form input for a single new review
#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub employee_id: String,
    pub role: Role,
    pub gender: Gender,
    pub kpi_rating: i64,
    pub competency_rating: i64,
    pub initiative_rating: i64,
    pub overall_rating: i64,
    pub comment: String,
}

impl ReviewSubmission {
    /// Validate and normalize into a stored record
    pub fn into_record(self) -> Result<ReviewRecord, ReviewError> {
        let employee_id = self.employee_id.trim();
        if employee_id.is_empty() {
            return Err(ReviewError::BlankEmployeeId);
        }

        Ok(ReviewRecord {
            employee_id: employee_id.to_string(),
            role: Some(self.role),
            gender: Some(self.gender),
            kpi_rating: Rating::new("kpi_rating", self.kpi_rating)?,
            competency_rating: Rating::new("competency_rating", self.competency_rating)?,
            initiative_rating: Rating::new("initiative_rating", self.initiative_rating)?,
            overall_rating: Rating::new("overall_rating", self.overall_rating)?,
            comment: self.comment.trim().to_string(),
        })
    }
}
