use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A recorded medication intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub user_id: Uuid,
    pub medication_name: String,
    pub dose: Option<String>,
    pub time_of_day: Option<String>,
    pub taken_at: DateTime<Utc>,
}

/// Request payload for recording a medication intake
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordMedicationRequest {
    #[validate(length(min = 1, max = 200, message = "Medication name must be between 1 and 200 characters"))]
    pub medication_name: String,

    #[validate(length(max = 100, message = "Dose cannot exceed 100 characters"))]
    pub dose: Option<String>,

    #[validate(length(max = 100, message = "Time of day cannot exceed 100 characters"))]
    pub time_of_day: Option<String>,

    /// Defaults to now when not provided
    pub taken_at: Option<DateTime<Utc>>,
}
