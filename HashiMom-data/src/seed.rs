//! Trimester reference ranges for the thyroid analytes.
//!
//! Example values for product validation only, not medical advice. Ranges
//! should be adjusted to the reporting laboratory's intervals.

use crate::models::ReferenceRangeRecord;

/// (analyte, trimester, low, high, unit)
pub const REFERENCE_RANGE_SEED: [(&str, &str, f64, f64, &str); 12] = [
    ("TSH", "T1", 0.1, 2.5, "mIU/L"),
    ("TSH", "T2", 0.2, 3.0, "mIU/L"),
    ("TSH", "T3", 0.3, 3.0, "mIU/L"),
    ("FT4", "T1", 0.8, 1.7, "ng/dL"),
    ("FT4", "T2", 0.7, 1.6, "ng/dL"),
    ("FT4", "T3", 0.7, 1.5, "ng/dL"),
    ("TPOAB", "T1", 0.0, 35.0, "IU/mL"),
    ("TPOAB", "T2", 0.0, 35.0, "IU/mL"),
    ("TPOAB", "T3", 0.0, 35.0, "IU/mL"),
    ("TGAB", "T1", 0.0, 35.0, "IU/mL"),
    ("TGAB", "T2", 0.0, 35.0, "IU/mL"),
    ("TGAB", "T3", 0.0, 35.0, "IU/mL"),
];

/// The seed table as storage records
pub fn seed_records() -> Vec<ReferenceRangeRecord> {
    REFERENCE_RANGE_SEED
        .iter()
        .map(|&(analyte, trimester, low, high, unit)| ReferenceRangeRecord {
            analyte: analyte.to_string(),
            trimester: trimester.to_string(),
            low,
            high,
            unit: unit.to_string(),
        })
        .collect()
}
