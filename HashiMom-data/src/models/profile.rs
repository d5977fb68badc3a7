use serde::{Deserialize, Serialize};

/// Storage model for a pregnancy profile, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: String,

    /// Last menstrual period, ISO-8601 date
    pub lmp_date: Option<String>,

    /// Estimated due date, ISO-8601 date
    pub due_date: Option<String>,

    pub high_risk_notes: Option<String>,

    /// RFC 3339 timestamp of the last write
    pub updated_at: String,
}

/// Full replacement of the mutable profile fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub lmp_date: Option<String>,
    pub due_date: Option<String>,
    pub high_risk_notes: Option<String>,
}
