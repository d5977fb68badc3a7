use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::gestation::{trimester_label, Trimester};

/// Pregnancy profile, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,

    /// Last menstrual period; takes precedence over the due date
    pub lmp_date: Option<NaiveDate>,

    /// Estimated due date
    pub due_date: Option<NaiveDate>,

    pub high_risk_notes: Option<String>,

    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating or replacing a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    pub lmp_date: Option<NaiveDate>,

    pub due_date: Option<NaiveDate>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub high_risk_notes: Option<String>,
}

/// Profile as displayed, with the gestational age at a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub lmp_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,

    /// Empty when no notes were given
    pub high_risk_notes: String,

    pub gestational_age_weeks: Option<i64>,
    pub gestational_age_days: Option<i64>,

    #[serde(with = "trimester_label")]
    pub trimester: Option<Trimester>,
}

impl ProfileSummary {
    /// Summary for a user without a profile
    pub fn empty() -> Self {
        Self {
            lmp_date: None,
            due_date: None,
            high_risk_notes: String::new(),
            gestational_age_weeks: None,
            gestational_age_days: None,
            trimester: None,
        }
    }
}
