use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::gestation::{trimester_label, Trimester};
use super::lab::ThyroidPanel;

/// Shown with every summary
pub const SUMMARY_DISCLAIMER: &str =
    "For reference only. This is not medical advice; please follow your doctor's guidance.";

/// Lookback window used when none is requested
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Symptom line of a summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomSummaryRow {
    pub date: NaiveDate,
    pub symptom_name: String,
    pub severity: u8,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMeta {
    pub lookback_days: u32,
    pub disclaimer: String,
    pub generated_at: DateTime<Utc>,
}

/// Exportable overview for a care visit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    #[serde(with = "trimester_label")]
    pub trimester: Option<Trimester>,

    pub thyroid_panel: ThyroidPanel,

    /// Newest first
    pub symptoms: Vec<SymptomSummaryRow>,

    pub meta: SummaryMeta,
}
