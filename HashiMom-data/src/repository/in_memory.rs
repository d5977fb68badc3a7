use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::{
    LabRecord, MedicationRecord, NewLabRecord, NewMedicationRecord, NewSymptomRecord, ProfileRecord,
    ProfileUpdate, ReferenceRangeRecord, SymptomRecord,
};
use super::errors::RepositoryError;

type RangeKey = (String, String);

/// In-memory storage used when no database pool is available.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    labs: Arc<Mutex<Vec<LabRecord>>>,
    profiles: Arc<Mutex<HashMap<String, ProfileRecord>>>,
    reference_ranges: Arc<Mutex<BTreeMap<RangeKey, ReferenceRangeRecord>>>,
    symptoms: Arc<Mutex<Vec<SymptomRecord>>>,
    medications: Arc<Mutex<Vec<MedicationRecord>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryStorage {
    /// Create a new, empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    // ----- Labs -----

    /// Append a lab result
    pub async fn insert_lab(&self, user_id: &str, new: NewLabRecord) -> Result<LabRecord, RepositoryError> {
        let mut labs = self.labs.lock()?;
        let record = LabRecord {
            id: self.allocate_id(),
            user_id: user_id.to_string(),
            test_name: new.test_name,
            result: new.result,
            units: new.units,
            test_date: new.test_date,
        };
        labs.push(record.clone());
        Ok(record)
    }

    /// All labs of a user ordered by test date, then id
    pub async fn labs_for_user(&self, user_id: &str) -> Result<Vec<LabRecord>, RepositoryError> {
        let labs = self.labs.lock()?;
        let mut records: Vec<LabRecord> = labs.iter().filter(|l| l.user_id == user_id).cloned().collect();
        records.sort_by(|a, b| (&a.test_date, a.id).cmp(&(&b.test_date, b.id)));
        Ok(records)
    }

    /// A single lab owned by the user
    pub async fn get_lab(&self, user_id: &str, id: i64) -> Result<Option<LabRecord>, RepositoryError> {
        let labs = self.labs.lock()?;
        Ok(labs.iter().find(|l| l.id == id && l.user_id == user_id).cloned())
    }

    /// Most recent same-analyte lab strictly before (test_date, id)
    pub async fn previous_lab(
        &self,
        user_id: &str,
        test_name: &str,
        test_date: &str,
        id: i64,
    ) -> Result<Option<LabRecord>, RepositoryError> {
        let labs = self.labs.lock()?;
        let previous = labs
            .iter()
            .filter(|l| l.user_id == user_id && l.test_name == test_name)
            .filter(|l| (l.test_date.as_str(), l.id) < (test_date, id))
            .max_by(|a, b| (&a.test_date, a.id).cmp(&(&b.test_date, b.id)))
            .cloned();
        Ok(previous)
    }

    /// Latest lab whose name matches the analyte ignoring case
    pub async fn latest_lab(&self, user_id: &str, analyte: &str) -> Result<Option<LabRecord>, RepositoryError> {
        let labs = self.labs.lock()?;
        let latest = labs
            .iter()
            .filter(|l| l.user_id == user_id && l.test_name.eq_ignore_ascii_case(analyte))
            .max_by(|a, b| (&a.test_date, a.id).cmp(&(&b.test_date, b.id)))
            .cloned();
        Ok(latest)
    }

    // ----- Profiles -----

    /// Get the profile of a user
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
        let profiles = self.profiles.lock()?;
        Ok(profiles.get(user_id).cloned())
    }

    /// Create or replace the profile of a user
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
        updated_at: String,
    ) -> Result<ProfileRecord, RepositoryError> {
        let mut profiles = self.profiles.lock()?;
        let record = ProfileRecord {
            user_id: user_id.to_string(),
            lmp_date: update.lmp_date,
            due_date: update.due_date,
            high_risk_notes: update.high_risk_notes,
            updated_at,
        };
        profiles.insert(user_id.to_string(), record.clone());
        Ok(record)
    }

    // ----- Reference ranges -----

    /// Look up a range by uppercased analyte and trimester label
    pub async fn get_range(&self, analyte: &str, trimester: &str) -> Result<Option<ReferenceRangeRecord>, RepositoryError> {
        let ranges = self.reference_ranges.lock()?;
        Ok(ranges.get(&(analyte.to_string(), trimester.to_string())).cloned())
    }

    /// All ranges ordered by analyte, then trimester
    pub async fn list_ranges(&self) -> Result<Vec<ReferenceRangeRecord>, RepositoryError> {
        let ranges = self.reference_ranges.lock()?;
        Ok(ranges.values().cloned().collect())
    }

    /// Insert or overwrite a range
    pub async fn upsert_range(&self, record: ReferenceRangeRecord) -> Result<(), RepositoryError> {
        let mut ranges = self.reference_ranges.lock()?;
        ranges.insert((record.analyte.clone(), record.trimester.clone()), record);
        Ok(())
    }

    // ----- Symptoms -----

    /// Append a symptom entry
    pub async fn insert_symptom(&self, user_id: &str, new: NewSymptomRecord) -> Result<SymptomRecord, RepositoryError> {
        let mut symptoms = self.symptoms.lock()?;
        let record = SymptomRecord {
            id: self.allocate_id(),
            user_id: user_id.to_string(),
            symptom: new.symptom,
            severity: new.severity,
            note: new.note,
            logged_at: new.logged_at,
        };
        symptoms.push(record.clone());
        Ok(record)
    }

    /// Symptoms of a user logged at or after `since`, newest first
    pub async fn symptoms_for_user(
        &self,
        user_id: &str,
        since: Option<&str>,
    ) -> Result<Vec<SymptomRecord>, RepositoryError> {
        let symptoms = self.symptoms.lock()?;
        let mut records: Vec<SymptomRecord> = symptoms
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter(|s| since.map_or(true, |since| s.logged_at.as_str() >= since))
            .cloned()
            .collect();
        records.sort_by_key(|s| Reverse((s.logged_at.clone(), s.id)));
        Ok(records)
    }

    // ----- Medications -----

    /// Append a medication intake
    pub async fn insert_medication(
        &self,
        user_id: &str,
        new: NewMedicationRecord,
    ) -> Result<MedicationRecord, RepositoryError> {
        let mut medications = self.medications.lock()?;
        let record = MedicationRecord {
            id: self.allocate_id(),
            user_id: user_id.to_string(),
            medication_name: new.medication_name,
            dose: new.dose,
            time_of_day: new.time_of_day,
            taken_at: new.taken_at,
        };
        medications.push(record.clone());
        Ok(record)
    }

    /// Medication intakes of a user, newest first
    pub async fn medications_for_user(&self, user_id: &str) -> Result<Vec<MedicationRecord>, RepositoryError> {
        let medications = self.medications.lock()?;
        let mut records: Vec<MedicationRecord> =
            medications.iter().filter(|m| m.user_id == user_id).cloned().collect();
        records.sort_by_key(|m| Reverse((m.taken_at.clone(), m.id)));
        Ok(records)
    }
}
