//! Lab status evaluator.
//!
//! Classifies a result against the trimester reference range and computes
//! the percent change from the previous result of the same analyte. Nothing
//! here performs I/O; callers supply the history and the ranges.

use crate::entities::gestation::Trimester;
use crate::entities::lab::{LabEvaluation, LabResult, LabStatus};
use crate::entities::reference_range::{ReferenceRange, ReferenceRangeLookup};

/// Parse result text as a number, ignoring surrounding whitespace
pub fn parse_result(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Bounds are inclusive of NORMAL
pub fn classify(value: f64, range: &ReferenceRange) -> LabStatus {
    if value < range.low {
        LabStatus::Low
    } else if value > range.high {
        LabStatus::High
    } else {
        LabStatus::Normal
    }
}

/// Status of a result for an analyte in the given trimester
pub fn evaluate_status<L>(result: &str, analyte: &str, trimester: Option<Trimester>, ranges: &L) -> LabStatus
where
    L: ReferenceRangeLookup + ?Sized,
{
    let Some(value) = parse_result(result) else {
        return LabStatus::Na;
    };
    let Some(trimester) = trimester else {
        return LabStatus::Na;
    };
    match ranges.lookup(analyte, trimester) {
        Some(range) => classify(value, range),
        None => LabStatus::Na,
    }
}

/// Round to one decimal from the exact binary value.
///
/// Scaling by ten first would round the product and can turn -98.65000000000001
/// into an exact tie. Precision formatting works on the full expansion.
fn round_one_decimal(value: f64) -> Option<f64> {
    format!("{:.1}", value).parse().ok()
}

/// Percent change from `previous` to `current`, one decimal.
///
/// Absent when either side does not parse or the previous value is zero.
pub fn percent_change(current: &str, previous: &str) -> Option<f64> {
    let current = parse_result(current)?;
    let previous = parse_result(previous)?;
    if previous == 0.0 {
        return None;
    }
    round_one_decimal((current - previous) / previous * 100.0).filter(|delta| delta.is_finite())
}

/// The most recent same-analyte result before `current`.
///
/// Same user, exact analyte name, earlier test date or the same date with a
/// smaller id.
pub fn find_previous<'a>(history: &'a [LabResult], current: &LabResult) -> Option<&'a LabResult> {
    history
        .iter()
        .filter(|lab| lab.user_id == current.user_id && lab.test_name == current.test_name)
        .filter(|lab| (lab.test_date, lab.id) < (current.test_date, current.id))
        .max_by_key(|lab| (lab.test_date, lab.id))
}

/// Full evaluation of a lab against its predecessor and the range table
pub fn evaluate_lab<L>(
    lab: &LabResult,
    previous: Option<&LabResult>,
    trimester: Option<Trimester>,
    ranges: &L,
) -> LabEvaluation
where
    L: ReferenceRangeLookup + ?Sized,
{
    let range = trimester.and_then(|t| ranges.lookup(&lab.test_name, t));

    LabEvaluation {
        trimester,
        status: evaluate_status(&lab.result, &lab.test_name, trimester, ranges),
        delta: previous.and_then(|prev| percent_change(&lab.result, &prev.result)),
        ref_low: range.map(|r| r.low),
        ref_high: range.map(|r| r.high),
        ref_unit: range.map(|r| r.unit.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::reference_range::ReferenceRangeTable;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn tsh_table() -> ReferenceRangeTable {
        vec![
            ReferenceRange {
                analyte: "TSH".to_string(),
                trimester: Trimester::T1,
                low: 0.1,
                high: 2.5,
                unit: "mIU/L".to_string(),
            },
            ReferenceRange {
                analyte: "TSH".to_string(),
                trimester: Trimester::T2,
                low: 0.2,
                high: 3.0,
                unit: "mIU/L".to_string(),
            },
        ]
        .into_iter()
        .collect()
    }

    fn lab(user: Uuid, id: i64, name: &str, result: &str, date: (i32, u32, u32)) -> LabResult {
        LabResult {
            id,
            user_id: user,
            test_name: name.to_string(),
            result: result.to_string(),
            units: None,
            test_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        }
    }

    #[test]
    fn test_parse_result_trims_whitespace() {
        assert_eq!(parse_result(" 2.5 \n"), Some(2.5));
        assert_eq!(parse_result("2,5"), None);
        assert_eq!(parse_result("positive"), None);
        assert_eq!(parse_result(""), None);
        assert_eq!(parse_result("NaN"), None);
    }

    #[test]
    fn test_tsh_second_trimester_bounds() {
        let table = tsh_table();
        let t2 = Some(Trimester::T2);

        assert_eq!(evaluate_status("3.0", "TSH", t2, &table), LabStatus::Normal);
        assert_eq!(evaluate_status("3.1", "TSH", t2, &table), LabStatus::High);
        assert_eq!(evaluate_status("0.2", "TSH", t2, &table), LabStatus::Normal);
        assert_eq!(evaluate_status("0.19", "TSH", t2, &table), LabStatus::Low);
    }

    #[test]
    fn test_status_not_available() {
        let table = tsh_table();

        assert_eq!(evaluate_status("abc", "TSH", Some(Trimester::T2), &table), LabStatus::Na);
        assert_eq!(evaluate_status("2.0", "TSH", None, &table), LabStatus::Na);
        assert_eq!(evaluate_status("2.0", "TSH", Some(Trimester::T3), &table), LabStatus::Na);
        assert_eq!(evaluate_status("2.0", "FT3", Some(Trimester::T1), &table), LabStatus::Na);
    }

    #[test]
    fn test_analyte_lookup_is_case_insensitive() {
        let table = tsh_table();
        assert_eq!(evaluate_status("2.6", "tsh", Some(Trimester::T1), &table), LabStatus::High);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change("3.0", "2.0"), Some(50.0));
        assert_eq!(percent_change("1.5", "2.0"), Some(-25.0));
        assert_eq!(percent_change("2.0", "2.0"), Some(0.0));
        assert_eq!(percent_change("1.0", "3.0"), Some(-66.7));
        assert_eq!(percent_change("3.0", "0"), None);
        assert_eq!(percent_change("3.0", "n/a"), None);
        assert_eq!(percent_change("high", "2.0"), None);
    }

    #[test]
    fn test_percent_change_rounds_suppressed_tsh() {
        // -98.650000000000006 lies just past the tie
        assert_eq!(percent_change("0.027", "2.0"), Some(-98.7));
        assert_eq!(percent_change("0.007", "2.0"), Some(-99.7));
        assert_eq!(percent_change("0.011", "2.0"), Some(-99.5));
        assert_eq!(percent_change("2.005", "2.0"), Some(0.2));
    }

    #[test]
    fn test_delta_sign_follows_direction() {
        assert!(percent_change("2.2", "2.1").unwrap() > 0.0);
        assert!(percent_change("2.0", "2.1").unwrap() < 0.0);
    }

    #[test]
    fn test_find_previous_orders_by_date_then_id() {
        let user = Uuid::new_v4();
        let history = vec![
            lab(user, 1, "TSH", "2.0", (2024, 1, 10)),
            lab(user, 2, "TSH", "2.4", (2024, 3, 1)),
            lab(user, 3, "tsh", "9.0", (2024, 2, 1)),
            lab(user, 4, "TSH", "2.8", (2024, 3, 1)),
            lab(Uuid::new_v4(), 5, "TSH", "1.0", (2024, 2, 20)),
        ];

        assert_eq!(find_previous(&history, &history[3]).map(|l| l.id), Some(2));
        assert_eq!(find_previous(&history, &history[1]).map(|l| l.id), Some(1));
        assert_eq!(find_previous(&history, &history[0]), None);
        assert_eq!(find_previous(&history, &history[2]), None);
    }

    #[test]
    fn test_evaluate_lab_reports_range_and_delta() {
        let user = Uuid::new_v4();
        let previous = lab(user, 1, "TSH", "2.0", (2024, 4, 1));
        let current = lab(user, 2, "TSH", "3.0", (2024, 5, 1));

        let evaluation = evaluate_lab(&current, Some(&previous), Some(Trimester::T2), &tsh_table());

        assert_eq!(evaluation.status, LabStatus::Normal);
        assert_eq!(evaluation.delta, Some(50.0));
        assert_eq!(evaluation.ref_low, Some(0.2));
        assert_eq!(evaluation.ref_high, Some(3.0));
        assert_eq!(evaluation.ref_unit.as_deref(), Some("mIU/L"));
    }

    #[test]
    fn test_evaluate_lab_keeps_range_for_unparseable_result() {
        let current = lab(Uuid::new_v4(), 1, "TSH", "pending", (2024, 5, 1));
        let evaluation = evaluate_lab(&current, None, Some(Trimester::T1), &tsh_table());

        assert_eq!(evaluation.status, LabStatus::Na);
        assert_eq!(evaluation.delta, None);
        assert_eq!(evaluation.ref_high, Some(2.5));
    }

    #[test]
    fn test_evaluate_lab_without_trimester() {
        let current = lab(Uuid::new_v4(), 1, "TSH", "2.0", (2024, 5, 1));
        let evaluation = evaluate_lab(&current, None, None, &tsh_table());

        assert_eq!(evaluation, LabEvaluation::not_available(None));
    }
}
