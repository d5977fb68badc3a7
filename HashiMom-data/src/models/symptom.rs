use serde::{Deserialize, Serialize};

/// Storage model for a logged symptom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomRecord {
    pub id: i64,
    pub user_id: String,
    pub symptom: String,
    /// 0-10
    pub severity: u8,
    pub note: Option<String>,
    /// RFC 3339 UTC timestamp
    pub logged_at: String,
}

/// Input data for logging a symptom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSymptomRecord {
    pub symptom: String,
    pub severity: u8,
    pub note: Option<String>,
    pub logged_at: String,
}
