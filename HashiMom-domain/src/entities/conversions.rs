use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use hashimom_data::models::{
    LabRecord, MedicationRecord, NewLabRecord, NewMedicationRecord, NewSymptomRecord, ProfileRecord,
    ProfileUpdate, ReferenceRangeRecord, SymptomRecord,
};

use super::lab::{CreateLabRequest, LabResult};
use super::medication::{Medication, RecordMedicationRequest};
use super::profile::{Profile, UpsertProfileRequest};
use super::reference_range::ReferenceRange;
use super::symptom::{LogSymptomRequest, Symptom};

// Conversion functions between domain entities and data models
// These follow the pattern convert_to_[target_layer]_[model_name]

/// Parse a stored user id
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Parse a stored ISO-8601 calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| format!("Invalid date: {}", value))
}

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid timestamp: {}", value))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Fixed-width UTC form, so stored timestamps compare as strings
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ----- Labs -----

pub fn convert_to_domain_lab(record: LabRecord) -> Result<LabResult, String> {
    Ok(LabResult {
        id: record.id,
        user_id: parse_string_to_uuid(&record.user_id)?,
        test_date: parse_date(&record.test_date)?,
        test_name: record.test_name,
        result: record.result,
        units: record.units,
    })
}

/// Build the storage input; `test_date` is the already-defaulted date
pub fn convert_to_data_new_lab(request: &CreateLabRequest, test_date: NaiveDate) -> NewLabRecord {
    NewLabRecord {
        test_name: request.test_name.trim().to_string(),
        result: request.result.trim().to_string(),
        units: non_empty(request.units.clone()),
        test_date: format_date(test_date),
    }
}

// ----- Profiles -----

pub fn convert_to_domain_profile(record: ProfileRecord) -> Result<Profile, String> {
    Ok(Profile {
        user_id: parse_string_to_uuid(&record.user_id)?,
        lmp_date: record.lmp_date.as_deref().map(parse_date).transpose()?,
        due_date: record.due_date.as_deref().map(parse_date).transpose()?,
        high_risk_notes: record.high_risk_notes,
        updated_at: parse_timestamp(&record.updated_at)?,
    })
}

/// Both dates are kept as given; blank notes are stored as absent
pub fn convert_to_data_profile_update(request: &UpsertProfileRequest) -> ProfileUpdate {
    ProfileUpdate {
        lmp_date: request.lmp_date.map(format_date),
        due_date: request.due_date.map(format_date),
        high_risk_notes: non_empty(request.high_risk_notes.clone()),
    }
}

// ----- Reference ranges -----

pub fn convert_to_domain_range(record: ReferenceRangeRecord) -> Result<ReferenceRange, String> {
    Ok(ReferenceRange {
        trimester: record.trimester.parse()?,
        analyte: record.analyte,
        low: record.low,
        high: record.high,
        unit: record.unit,
    })
}

// ----- Symptoms -----

pub fn convert_to_domain_symptom(record: SymptomRecord) -> Result<Symptom, String> {
    Ok(Symptom {
        id: record.id,
        user_id: parse_string_to_uuid(&record.user_id)?,
        logged_at: parse_timestamp(&record.logged_at)?,
        symptom: record.symptom,
        severity: record.severity,
        note: record.note,
    })
}

pub fn convert_to_data_new_symptom(request: &LogSymptomRequest, logged_at: DateTime<Utc>) -> NewSymptomRecord {
    NewSymptomRecord {
        symptom: request.symptom.trim().to_string(),
        severity: request.severity,
        note: non_empty(request.note.clone()),
        logged_at: format_timestamp(logged_at),
    }
}

// ----- Medications -----

pub fn convert_to_domain_medication(record: MedicationRecord) -> Result<Medication, String> {
    Ok(Medication {
        id: record.id,
        user_id: parse_string_to_uuid(&record.user_id)?,
        taken_at: parse_timestamp(&record.taken_at)?,
        medication_name: record.medication_name,
        dose: record.dose,
        time_of_day: record.time_of_day,
    })
}

pub fn convert_to_data_new_medication(
    request: &RecordMedicationRequest,
    taken_at: DateTime<Utc>,
) -> NewMedicationRecord {
    NewMedicationRecord {
        medication_name: request.medication_name.trim().to_string(),
        dose: non_empty(request.dose.clone()),
        time_of_day: non_empty(request.time_of_day.clone()),
        taken_at: format_timestamp(taken_at),
    }
}
