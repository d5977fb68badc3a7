use async_trait::async_trait;
use tracing::info;

use crate::models::ReferenceRangeRecord;
use crate::seed::seed_records;
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;
use super::Backend;

/// Repository trait for trimester reference ranges
#[async_trait]
pub trait ReferenceRangeRepositoryTrait: Send + Sync {
    /// Look up a range; the analyte is uppercased before matching
    async fn get(&self, analyte: String, trimester: String) -> Result<Option<ReferenceRangeRecord>, RepositoryError>;

    /// All ranges ordered by analyte, then trimester
    async fn list(&self) -> Result<Vec<ReferenceRangeRecord>, RepositoryError>;

    /// Insert or overwrite ranges by (analyte, trimester)
    async fn upsert(&self, records: Vec<ReferenceRangeRecord>) -> Result<(), RepositoryError>;

    /// Number of stored ranges
    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.list().await?.len())
    }

    /// Upsert the built-in seed table. Running it twice changes nothing.
    async fn seed_defaults(&self) -> Result<usize, RepositoryError> {
        let records = seed_records();
        let seeded = records.len();
        self.upsert(records).await?;
        info!("Seeded {} reference ranges", seeded);
        Ok(seeded)
    }
}

/// Repository for trimester reference ranges
#[derive(Debug, Clone, Default)]
pub struct ReferenceRangeRepository {
    backend: Backend,
}

impl ReferenceRangeRepository {
    /// Create a repository over the global pool, or in-memory storage
    pub fn new() -> Self {
        Self::with_backend(Backend::detect())
    }

    /// Create a repository over an explicit backend
    pub fn with_backend(backend: Backend) -> Self {
        Self { backend }
    }
}

fn normalize(mut record: ReferenceRangeRecord) -> Result<ReferenceRangeRecord, RepositoryError> {
    record.analyte = record.analyte.trim().to_uppercase();
    if record.analyte.is_empty() {
        return Err(RepositoryError::Validation("Analyte must not be empty".to_string()));
    }
    if !matches!(record.trimester.as_str(), "T1" | "T2" | "T3") {
        return Err(RepositoryError::Validation(format!(
            "Unknown trimester '{}' for {}",
            record.trimester, record.analyte
        )));
    }
    if record.low > record.high {
        return Err(RepositoryError::Validation(format!(
            "Range for {} {} has low {} above high {}",
            record.analyte, record.trimester, record.low, record.high
        )));
    }
    Ok(record)
}

#[async_trait]
impl ReferenceRangeRepositoryTrait for ReferenceRangeRepository {
    async fn get(&self, analyte: String, trimester: String) -> Result<Option<ReferenceRangeRecord>, RepositoryError> {
        let analyte = analyte.to_uppercase();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::get_range(pool, &analyte, &trimester).await,
            Backend::InMemory(storage) => storage.get_range(&analyte, &trimester).await,
        }
    }

    async fn list(&self) -> Result<Vec<ReferenceRangeRecord>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::list_ranges(pool).await,
            Backend::InMemory(storage) => storage.list_ranges().await,
        }
    }

    async fn upsert(&self, records: Vec<ReferenceRangeRecord>) -> Result<(), RepositoryError> {
        let records = records.into_iter().map(normalize).collect::<Result<Vec<_>, _>>()?;
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::upsert_ranges(pool, &records).await,
            Backend::InMemory(storage) => {
                for record in records {
                    storage.upsert_range(record).await?;
                }
                Ok(())
            }
        }
    }
}
