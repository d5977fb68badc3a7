use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A logged symptom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: i64,
    pub user_id: Uuid,
    pub symptom: String,
    /// 0 (none) to 10 (worst)
    pub severity: u8,
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

/// Request payload for logging a symptom
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogSymptomRequest {
    #[validate(length(min = 1, max = 200, message = "Symptom must be between 1 and 200 characters"))]
    pub symptom: String,

    #[validate(range(min = 0, max = 10, message = "Severity must be between 0 and 10"))]
    pub severity: u8,

    #[validate(length(max = 1000, message = "Note cannot exceed 1000 characters"))]
    pub note: Option<String>,

    /// Defaults to now when not provided
    pub logged_at: Option<DateTime<Utc>>,
}
