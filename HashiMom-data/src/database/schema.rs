use rusqlite::Connection;
use tracing::{debug, info};

/// Create every table and index the repositories rely on.
///
/// Statements are idempotent; there is no versioning.
pub fn ensure_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    info!("Ensuring SQLite schema");

    create_labs_table(conn)?;
    create_profiles_table(conn)?;
    create_reference_ranges_table(conn)?;
    create_symptoms_table(conn)?;
    create_medications_table(conn)?;

    Ok(())
}

/// Lab results, looked up per user and analyte in (test_date, id) order
fn create_labs_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    debug!("Creating labs table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS labs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            test_name TEXT NOT NULL,
            result TEXT NOT NULL,
            units TEXT,
            test_date TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_labs_user_test
        ON labs (user_id, test_name, test_date, id);",
    )
}

fn create_profiles_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    debug!("Creating profiles table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            lmp_date TEXT,
            due_date TEXT,
            high_risk_notes TEXT,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

fn create_reference_ranges_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    debug!("Creating reference_ranges table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS reference_ranges (
            analyte TEXT NOT NULL,
            trimester TEXT NOT NULL,
            low REAL NOT NULL,
            high REAL NOT NULL,
            unit TEXT NOT NULL,
            PRIMARY KEY (analyte, trimester)
        )",
        [],
    )?;

    Ok(())
}

fn create_symptoms_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    debug!("Creating symptoms table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS symptoms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            symptom TEXT NOT NULL,
            severity INTEGER NOT NULL,
            note TEXT,
            logged_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_symptoms_user_logged_at
        ON symptoms (user_id, logged_at DESC);",
    )
}

fn create_medications_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    debug!("Creating medications table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS medications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            medication_name TEXT NOT NULL,
            dose TEXT,
            time_of_day TEXT,
            taken_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}
