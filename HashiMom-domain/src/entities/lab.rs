use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::gestation::{trimester_label, Trimester};

/// A single lab result. Results are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    /// Insertion order; breaks ties between results on the same day
    pub id: i64,

    pub user_id: Uuid,

    /// Analyte name as entered
    pub test_name: String,

    /// Result text, normally a number
    pub result: String,

    pub units: Option<String>,

    pub test_date: NaiveDate,
}

/// Request payload for recording a lab result
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLabRequest {
    #[validate(length(min = 1, max = 100, message = "Test name must be between 1 and 100 characters"))]
    pub test_name: String,

    #[validate(length(max = 100, message = "Result cannot exceed 100 characters"))]
    pub result: String,

    #[validate(length(max = 50, message = "Units cannot exceed 50 characters"))]
    pub units: Option<String>,

    /// Defaults to the current local date when not provided
    pub test_date: Option<NaiveDate>,
}

/// Classification of a lab value against its reference range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LabStatus {
    Low,
    High,
    Normal,
    /// No classification possible
    Na,
}

impl LabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabStatus::Low => "LOW",
            LabStatus::High => "HIGH",
            LabStatus::Normal => "NORMAL",
            LabStatus::Na => "NA",
        }
    }
}

impl std::fmt::Display for LabStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status, delta and matched range shown next to a lab result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabEvaluation {
    #[serde(with = "trimester_label")]
    pub trimester: Option<Trimester>,

    pub status: LabStatus,

    /// Percent change from the previous same-analyte result, one decimal
    pub delta: Option<f64>,

    pub ref_low: Option<f64>,
    pub ref_high: Option<f64>,
    pub ref_unit: Option<String>,
}

impl LabEvaluation {
    /// Evaluation with nothing known
    pub fn not_available(trimester: Option<Trimester>) -> Self {
        Self {
            trimester,
            status: LabStatus::Na,
            delta: None,
            ref_low: None,
            ref_high: None,
            ref_unit: None,
        }
    }
}

/// A lab result together with its evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabEntry {
    #[serde(flatten)]
    pub lab: LabResult,

    #[serde(flatten)]
    pub evaluation: LabEvaluation,
}

/// Most recent TSH and FT4 results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThyroidPanel {
    pub tsh: Option<LabEntry>,
    pub ft4: Option<LabEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        let values: Vec<serde_json::Value> = [LabStatus::Low, LabStatus::High, LabStatus::Normal, LabStatus::Na]
            .iter()
            .map(|s| serde_json::to_value(s).unwrap())
            .collect();
        assert_eq!(values, vec!["LOW", "HIGH", "NORMAL", "NA"]);
    }

    #[test]
    fn test_create_request_validation() {
        let valid = CreateLabRequest {
            test_name: "TSH".to_string(),
            result: "2.1".to_string(),
            units: Some("mIU/L".to_string()),
            test_date: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateLabRequest {
            test_name: String::new(),
            ..valid.clone()
        };
        assert!(empty_name.validate().is_err());

        let long_units = CreateLabRequest {
            units: Some("u".repeat(51)),
            ..valid
        };
        assert!(long_units.validate().is_err());
    }

    #[test]
    fn test_entry_flattens_lab_and_evaluation() {
        let entry = LabEntry {
            lab: LabResult {
                id: 7,
                user_id: Uuid::nil(),
                test_name: "TSH".to_string(),
                result: "3.1".to_string(),
                units: None,
                test_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            },
            evaluation: LabEvaluation {
                trimester: Some(Trimester::T2),
                status: LabStatus::High,
                delta: Some(55.0),
                ref_low: Some(0.2),
                ref_high: Some(3.0),
                ref_unit: Some("mIU/L".to_string()),
            },
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["test_date"], "2024-05-01");
        assert_eq!(json["status"], "HIGH");
        assert_eq!(json["trimester"], "T2");
        assert_eq!(json["ref_unit"], "mIU/L");
    }
}
