// Repository module structure
pub mod errors;
mod in_memory;
mod storage;
mod lab;
mod medication;
mod profile;
mod reference_range;
mod symptom;

use tracing::debug;

use crate::database::{get_db_pool, DatabasePool};

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryStorage;
pub use lab::{LabRepository, LabRepositoryTrait};
pub use medication::{MedicationRepository, MedicationRepositoryTrait};
pub use profile::{ProfileRepository, ProfileRepositoryTrait};
pub use reference_range::{ReferenceRangeRepository, ReferenceRangeRepositoryTrait};
pub use symptom::{SymptomRepository, SymptomRepositoryTrait};

/// Where a repository keeps its records
#[derive(Debug, Clone)]
pub enum Backend {
    /// SQLite connection pool
    Database(DatabasePool),
    /// Process-local storage, used when no pool is initialized
    InMemory(InMemoryStorage),
}

impl Backend {
    /// Use the global pool when it has been initialized, otherwise a fresh
    /// in-memory store.
    pub fn detect() -> Self {
        match get_db_pool() {
            Ok(pool) => Backend::Database(pool),
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                Backend::InMemory(InMemoryStorage::new())
            }
        }
    }

    /// Whether records are persisted in SQLite
    pub fn is_database(&self) -> bool {
        matches!(self, Backend::Database(_))
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::detect()
    }
}
