use serde::{Deserialize, Serialize};

/// Storage model for a lab result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabRecord {
    /// Insertion identifier, used to break ties between same-day results
    pub id: i64,

    /// Owning user
    pub user_id: String,

    /// Analyte name exactly as entered (e.g. "TSH")
    pub test_name: String,

    /// Numeric result kept as text; qualitative findings are allowed
    pub result: String,

    /// Optional units as entered
    pub units: Option<String>,

    /// ISO-8601 calendar date (YYYY-MM-DD)
    pub test_date: String,
}

/// Input data for appending a lab result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLabRecord {
    pub test_name: String,
    pub result: String,
    pub units: Option<String>,
    /// ISO-8601 calendar date (YYYY-MM-DD)
    pub test_date: String,
}
