use serde::{Deserialize, Serialize};

/// Storage model for a medication intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub id: i64,
    pub user_id: String,
    pub medication_name: String,
    pub dose: Option<String>,
    /// Free text such as "morning"
    pub time_of_day: Option<String>,
    /// RFC 3339 UTC timestamp
    pub taken_at: String,
}

/// Input data for recording a medication intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedicationRecord {
    pub medication_name: String,
    pub dose: Option<String>,
    pub time_of_day: Option<String>,
    pub taken_at: String,
}
