use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{
    LabRecord, MedicationRecord, NewLabRecord, NewMedicationRecord, NewSymptomRecord, ProfileRecord,
    ProfileUpdate, ReferenceRangeRecord, SymptomRecord,
};
use super::errors::RepositoryError;

const LAB_COLUMNS: &str = "id, user_id, test_name, result, units, test_date";
const SYMPTOM_COLUMNS: &str = "id, user_id, symptom, severity, note, logged_at";
const MEDICATION_COLUMNS: &str = "id, user_id, medication_name, dose, time_of_day, taken_at";

fn lab_from_row(row: &Row<'_>) -> rusqlite::Result<LabRecord> {
    Ok(LabRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        test_name: row.get(2)?,
        result: row.get(3)?,
        units: row.get(4)?,
        test_date: row.get(5)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<ProfileRecord> {
    Ok(ProfileRecord {
        user_id: row.get(0)?,
        lmp_date: row.get(1)?,
        due_date: row.get(2)?,
        high_risk_notes: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn range_from_row(row: &Row<'_>) -> rusqlite::Result<ReferenceRangeRecord> {
    Ok(ReferenceRangeRecord {
        analyte: row.get(0)?,
        trimester: row.get(1)?,
        low: row.get(2)?,
        high: row.get(3)?,
        unit: row.get(4)?,
    })
}

fn symptom_from_row(row: &Row<'_>) -> rusqlite::Result<SymptomRecord> {
    Ok(SymptomRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        symptom: row.get(2)?,
        severity: row.get(3)?,
        note: row.get(4)?,
        logged_at: row.get(5)?,
    })
}

fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<MedicationRecord> {
    Ok(MedicationRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        medication_name: row.get(2)?,
        dose: row.get(3)?,
        time_of_day: row.get(4)?,
        taken_at: row.get(5)?,
    })
}

/// SQLite storage operations shared by the repositories
pub struct DatabaseStorage;

impl DatabaseStorage {
    // ----- Labs -----

    /// Append a lab result and return it with its assigned id
    pub async fn insert_lab(pool: &DatabasePool, user_id: &str, new: NewLabRecord) -> Result<LabRecord, RepositoryError> {
        debug!("Storing lab result in database: user={}, test={}", user_id, new.test_name);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO labs (user_id, test_name, result, units, test_date) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, new.test_name, new.result, new.units, new.test_date],
        )?;

        Ok(LabRecord {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            test_name: new.test_name,
            result: new.result,
            units: new.units,
            test_date: new.test_date,
        })
    }

    /// All labs of a user ordered by test date, then id
    pub async fn labs_for_user(pool: &DatabasePool, user_id: &str) -> Result<Vec<LabRecord>, RepositoryError> {
        debug!("Getting labs from database: user={}", user_id);

        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM labs WHERE user_id = ?1 ORDER BY test_date ASC, id ASC",
            LAB_COLUMNS
        ))?;

        let labs = stmt
            .query_map(params![user_id], lab_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(labs)
    }

    /// A single lab owned by the user
    pub async fn get_lab(pool: &DatabasePool, user_id: &str, id: i64) -> Result<Option<LabRecord>, RepositoryError> {
        let conn = pool.get()?;
        let lab = conn
            .query_row(
                &format!("SELECT {} FROM labs WHERE id = ?1 AND user_id = ?2", LAB_COLUMNS),
                params![id, user_id],
                lab_from_row,
            )
            .optional()?;

        Ok(lab)
    }

    /// Most recent same-analyte lab strictly before (test_date, id)
    ///
    /// `test_name` is compared with SQLite's default binary collation, so the
    /// match is exact and case-sensitive.
    pub async fn previous_lab(
        pool: &DatabasePool,
        user_id: &str,
        test_name: &str,
        test_date: &str,
        id: i64,
    ) -> Result<Option<LabRecord>, RepositoryError> {
        let conn = pool.get()?;
        let lab = conn
            .query_row(
                &format!(
                    "SELECT {} FROM labs
                     WHERE user_id = ?1 AND test_name = ?2
                       AND (test_date < ?3 OR (test_date = ?3 AND id < ?4))
                     ORDER BY test_date DESC, id DESC
                     LIMIT 1",
                    LAB_COLUMNS
                ),
                params![user_id, test_name, test_date, id],
                lab_from_row,
            )
            .optional()?;

        Ok(lab)
    }

    /// Latest lab whose name matches the analyte ignoring case
    pub async fn latest_lab(pool: &DatabasePool, user_id: &str, analyte: &str) -> Result<Option<LabRecord>, RepositoryError> {
        let conn = pool.get()?;
        let lab = conn
            .query_row(
                &format!(
                    "SELECT {} FROM labs
                     WHERE user_id = ?1 AND UPPER(test_name) = UPPER(?2)
                     ORDER BY test_date DESC, id DESC
                     LIMIT 1",
                    LAB_COLUMNS
                ),
                params![user_id, analyte],
                lab_from_row,
            )
            .optional()?;

        Ok(lab)
    }

    // ----- Profiles -----

    /// Get the profile of a user
    pub async fn get_profile(pool: &DatabasePool, user_id: &str) -> Result<Option<ProfileRecord>, RepositoryError> {
        let conn = pool.get()?;
        let profile = conn
            .query_row(
                "SELECT user_id, lmp_date, due_date, high_risk_notes, updated_at FROM profiles WHERE user_id = ?1",
                params![user_id],
                profile_from_row,
            )
            .optional()?;

        Ok(profile)
    }

    /// Create or replace the profile of a user
    pub async fn upsert_profile(
        pool: &DatabasePool,
        user_id: &str,
        update: ProfileUpdate,
        updated_at: String,
    ) -> Result<ProfileRecord, RepositoryError> {
        debug!("Upserting profile in database: user={}", user_id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO profiles (user_id, lmp_date, due_date, high_risk_notes, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                lmp_date = excluded.lmp_date,
                due_date = excluded.due_date,
                high_risk_notes = excluded.high_risk_notes,
                updated_at = excluded.updated_at",
            params![user_id, update.lmp_date, update.due_date, update.high_risk_notes, updated_at],
        )?;

        Ok(ProfileRecord {
            user_id: user_id.to_string(),
            lmp_date: update.lmp_date,
            due_date: update.due_date,
            high_risk_notes: update.high_risk_notes,
            updated_at,
        })
    }

    // ----- Reference ranges -----

    /// Look up a range by uppercased analyte and trimester label
    pub async fn get_range(
        pool: &DatabasePool,
        analyte: &str,
        trimester: &str,
    ) -> Result<Option<ReferenceRangeRecord>, RepositoryError> {
        let conn = pool.get()?;
        let range = conn
            .query_row(
                "SELECT analyte, trimester, low, high, unit FROM reference_ranges
                 WHERE analyte = ?1 AND trimester = ?2",
                params![analyte, trimester],
                range_from_row,
            )
            .optional()?;

        Ok(range)
    }

    /// All ranges ordered by analyte, then trimester
    pub async fn list_ranges(pool: &DatabasePool) -> Result<Vec<ReferenceRangeRecord>, RepositoryError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT analyte, trimester, low, high, unit FROM reference_ranges ORDER BY analyte, trimester",
        )?;

        let ranges = stmt.query_map([], range_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(ranges)
    }

    /// Insert or overwrite ranges in a single transaction
    pub async fn upsert_ranges(pool: &DatabasePool, records: &[ReferenceRangeRecord]) -> Result<(), RepositoryError> {
        debug!("Upserting {} reference ranges", records.len());

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO reference_ranges (analyte, trimester, low, high, unit)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(analyte, trimester) DO UPDATE SET
                    low = excluded.low,
                    high = excluded.high,
                    unit = excluded.unit",
            )?;
            for record in records {
                stmt.execute(params![record.analyte, record.trimester, record.low, record.high, record.unit])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    // ----- Symptoms -----

    /// Append a symptom entry
    pub async fn insert_symptom(
        pool: &DatabasePool,
        user_id: &str,
        new: NewSymptomRecord,
    ) -> Result<SymptomRecord, RepositoryError> {
        debug!("Storing symptom in database: user={}", user_id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO symptoms (user_id, symptom, severity, note, logged_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, new.symptom, new.severity, new.note, new.logged_at],
        )?;

        Ok(SymptomRecord {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            symptom: new.symptom,
            severity: new.severity,
            note: new.note,
            logged_at: new.logged_at,
        })
    }

    /// Symptoms of a user logged at or after `since`, newest first
    pub async fn symptoms_for_user(
        pool: &DatabasePool,
        user_id: &str,
        since: Option<&str>,
    ) -> Result<Vec<SymptomRecord>, RepositoryError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM symptoms
             WHERE user_id = ?1 AND (?2 IS NULL OR logged_at >= ?2)
             ORDER BY logged_at DESC, id DESC",
            SYMPTOM_COLUMNS
        ))?;

        let symptoms = stmt
            .query_map(params![user_id, since], symptom_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(symptoms)
    }

    // ----- Medications -----

    /// Append a medication intake
    pub async fn insert_medication(
        pool: &DatabasePool,
        user_id: &str,
        new: NewMedicationRecord,
    ) -> Result<MedicationRecord, RepositoryError> {
        debug!("Storing medication in database: user={}", user_id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO medications (user_id, medication_name, dose, time_of_day, taken_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, new.medication_name, new.dose, new.time_of_day, new.taken_at],
        )?;

        Ok(MedicationRecord {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            medication_name: new.medication_name,
            dose: new.dose,
            time_of_day: new.time_of_day,
            taken_at: new.taken_at,
        })
    }

    /// Medication intakes of a user, newest first
    pub async fn medications_for_user(pool: &DatabasePool, user_id: &str) -> Result<Vec<MedicationRecord>, RepositoryError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM medications WHERE user_id = ?1 ORDER BY taken_at DESC, id DESC",
            MEDICATION_COLUMNS
        ))?;

        let medications = stmt
            .query_map(params![user_id], medication_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(medications)
    }
}
