use serde::{Deserialize, Serialize};

/// Storage model for a trimester-specific reference range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRangeRecord {
    /// Uppercased analyte name (TSH, FT4, ...)
    pub analyte: String,

    /// "T1", "T2" or "T3"
    pub trimester: String,

    pub low: f64,
    pub high: f64,
    pub unit: String,
}
