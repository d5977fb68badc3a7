use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{MedicationRecord, NewMedicationRecord};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;
use super::Backend;

/// Repository trait for medication intakes
#[async_trait]
pub trait MedicationRepositoryTrait: Send + Sync {
    /// Record a medication intake
    async fn create(&self, user_id: Uuid, new: NewMedicationRecord) -> Result<MedicationRecord, RepositoryError>;

    /// All intakes of a user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MedicationRecord>, RepositoryError>;
}

/// Repository for medication intakes
#[derive(Debug, Clone, Default)]
pub struct MedicationRepository {
    backend: Backend,
}

impl MedicationRepository {
    /// Create a repository over the global pool, or in-memory storage
    pub fn new() -> Self {
        Self::with_backend(Backend::detect())
    }

    /// Create a repository over an explicit backend
    pub fn with_backend(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl MedicationRepositoryTrait for MedicationRepository {
    async fn create(&self, user_id: Uuid, new: NewMedicationRecord) -> Result<MedicationRecord, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::insert_medication(pool, &user_id, new).await,
            Backend::InMemory(storage) => storage.insert_medication(&user_id, new).await,
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MedicationRecord>, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::medications_for_user(pool, &user_id).await,
            Backend::InMemory(storage) => storage.medications_for_user(&user_id).await,
        }
    }
}
