//! Database connection module for the HashiMom application
//!
//! SQLite is the only supported backend. The pool can be opened explicitly
//! (tests, tools) or installed once as the process-wide pool that
//! repositories pick up through [`get_db_pool`].

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info, warn};

use super::schema;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Default SQLite file used when `DB_SQLITE_PATH` is not set
pub const DEFAULT_SQLITE_PATH: &str = "data/hashimom.db";

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Database pool already initialized
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Database pool not initialized
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Configuration value could not be parsed
    #[error("Database configuration error: {0}")]
    ConfigError(String),
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: DEFAULT_SQLITE_PATH.to_string(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DatabaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_type = lookup("DB_TYPE").unwrap_or_else(|| "sqlite".to_string());
        if !db_type.eq_ignore_ascii_case("sqlite") {
            return Err(DatabaseError::UnsupportedDatabaseType(db_type));
        }

        let defaults = Self::default();

        let sqlite_path = match lookup("DB_SQLITE_PATH") {
            Some(path) => {
                info!("Using SQLite database at: {}", path);
                path
            }
            None => {
                info!("No DB_SQLITE_PATH provided, will use default path: {}", defaults.sqlite_path);
                defaults.sqlite_path
            }
        };

        let max_connections = parse_setting(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let timeout_seconds = parse_setting(&lookup, "DB_TIMEOUT_SECONDS", defaults.timeout_seconds)?;
        if timeout_seconds == 0 {
            return Err(DatabaseError::ConfigError(
                "DB_TIMEOUT_SECONDS must be greater than zero".to_string(),
            ));
        }

        info!(
            "Database configuration: max_connections={}, timeout={}s",
            max_connections, timeout_seconds
        );

        Ok(Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

fn parse_setting<F, T>(lookup: &F, key: &str, default: T) -> Result<T, DatabaseError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| DatabaseError::ConfigError(format!("{} must be a number, got '{}'", key, raw))),
        None => Ok(default),
    }
}

/// SQLite connection pool shared by all repositories
#[derive(Clone)]
pub struct DatabasePool {
    inner: Arc<r2d2::Pool<SqliteConnectionManager>>,
    in_memory: bool,
}

impl fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state();
        f.debug_struct("DatabasePool")
            .field("in_memory", &self.in_memory)
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl DatabasePool {
    /// Open a file-backed pool and make sure the schema exists.
    ///
    /// Falls back to an in-memory database when the file cannot be opened.
    pub fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing SQLite database at: {}", config.sqlite_path);

        if let Some(parent) = Path::new(&config.sqlite_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating parent directory: {:?}", parent);
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("Failed to create directory: {}, falling back to in-memory database", e);
                    return Self::in_memory();
                }
            }
        }

        let manager = SqliteConnectionManager::file(&config.sqlite_path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

        let pool = match r2d2::Pool::builder()
            .max_size(config.max_connections.max(1))
            .connection_timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build(manager)
        {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to create SQLite connection pool: {}", e);
                warn!("Falling back to in-memory SQLite database");
                return Self::in_memory();
            }
        };

        let pool = Self {
            inner: Arc::new(pool),
            in_memory: false,
        };
        pool.bootstrap()?;

        info!("SQLite connection pool created successfully");
        Ok(pool)
    }

    /// Open a private in-memory database.
    ///
    /// Every in-memory SQLite connection is its own database, so the pool is
    /// capped at a single connection that is never reaped or recycled.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        info!("Initializing in-memory SQLite database");

        let pool = r2d2::Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_timeout(Duration::from_secs(5))
            .build(SqliteConnectionManager::memory())?;

        let pool = Self {
            inner: Arc::new(pool),
            in_memory: true,
        };
        pool.bootstrap()?;

        Ok(pool)
    }

    /// Check out a connection
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        self.inner.get()
    }

    /// Whether this pool points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    fn bootstrap(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        schema::ensure_schema(&conn)?;
        Ok(())
    }
}

/// Initialize the process-wide database pool from the environment
pub fn initialize_database_pool() -> Result<DatabasePool, DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;
    let pool = DatabasePool::open(&config)?;

    DB_POOL
        .set(pool.clone())
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;

    Ok(pool)
}

/// Get the database connection pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get().cloned().ok_or(DatabaseError::PoolNotInitialized)
}

/// Get information about the current database connection
pub fn get_connection_info() -> Option<String> {
    let pool = DB_POOL.get()?;
    Some(describe_pool(pool))
}

/// Describe a pool, including whether a connection can be checked out
pub fn describe_pool(pool: &DatabasePool) -> String {
    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to get SQLite connection: {}", e);
            return format!("SQLite connection error: {}", e);
        }
    };

    let location = match conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)) {
        Ok(path) if path.is_empty() || path == ":memory:" => "SQLite in-memory database".to_string(),
        Ok(path) => format!("SQLite database at {}", path),
        Err(_) => "SQLite database (path unknown)".to_string(),
    };
    drop(conn);

    let state = pool.inner.state();
    format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.sqlite_path, DEFAULT_SQLITE_PATH);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_config_from_lookup_uses_overrides() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DB_TYPE", "SQLite"),
            ("DB_SQLITE_PATH", "/tmp/hashimom-test.db"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_TIMEOUT_SECONDS", "12"),
        ]))
        .unwrap();

        assert_eq!(config.sqlite_path, "/tmp/hashimom-test.db");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.timeout_seconds, 12);
    }

    #[test]
    fn test_config_rejects_other_backends() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_TYPE", "postgres")]));
        assert!(matches!(result, Err(DatabaseError::UnsupportedDatabaseType(t)) if t == "postgres"));
    }

    #[test]
    fn test_config_rejects_non_numeric_limits() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_MAX_CONNECTIONS", "many")]));
        assert!(matches!(result, Err(DatabaseError::ConfigError(_))));
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_TIMEOUT_SECONDS", "0")]));
        assert!(matches!(result, Err(DatabaseError::ConfigError(_))));
    }

    #[test]
    fn test_open_with_zero_timeout_does_not_panic() {
        let dir = std::env::temp_dir().join(format!("hashimom_zero_timeout_{}", std::process::id()));
        let config = DatabaseConfig {
            sqlite_path: dir.join("zero.db").to_string_lossy().into_owned(),
            max_connections: 0,
            timeout_seconds: 0,
        };

        let pool = DatabasePool::open(&config).unwrap();
        assert!(!pool.is_in_memory());
        drop(pool);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_in_memory_pool_keeps_one_database() {
        let pool = DatabasePool::in_memory().unwrap();
        let state = pool.inner.state();
        assert_eq!(state.connections, 1);

        pool.get()
            .unwrap()
            .execute("INSERT INTO medications (user_id, medication_name, taken_at) VALUES ('u', 'levothyroxine', 't')", [])
            .unwrap();

        let count: i64 = pool
            .get()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM medications", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(pool.inner.state().connections, 1);
    }

    #[test]
    fn test_in_memory_pool_has_schema() {
        let pool = DatabasePool::in_memory().unwrap();
        assert!(pool.is_in_memory());

        let conn = pool.get().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                 ('labs', 'profiles', 'reference_ranges', 'symptoms', 'medications')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 5);
    }

    #[test]
    fn test_describe_in_memory_pool() {
        let pool = DatabasePool::in_memory().unwrap();
        let info = describe_pool(&pool);
        assert!(info.starts_with("SQLite in-memory database"), "unexpected: {}", info);
    }
}
