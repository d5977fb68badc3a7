use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::models::{LabRecord, NewLabRecord};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;
use super::Backend;

/// Repository trait for lab results
#[async_trait]
pub trait LabRepositoryTrait: Send + Sync {
    /// Append a lab result for a user
    async fn create(&self, user_id: Uuid, new: NewLabRecord) -> Result<LabRecord, RepositoryError>;

    /// All labs of a user, oldest first by (test_date, id)
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LabRecord>, RepositoryError>;

    /// Get a lab by id, scoped to its owner
    async fn get(&self, user_id: Uuid, id: i64) -> Result<Option<LabRecord>, RepositoryError>;

    /// The same-analyte lab immediately preceding (test_date, id)
    async fn find_previous(
        &self,
        user_id: Uuid,
        test_name: String,
        test_date: String,
        id: i64,
    ) -> Result<Option<LabRecord>, RepositoryError>;

    /// Latest lab for an analyte, matched ignoring case
    async fn find_latest(&self, user_id: Uuid, analyte: String) -> Result<Option<LabRecord>, RepositoryError>;
}

/// Repository for lab results
#[derive(Debug, Clone, Default)]
pub struct LabRepository {
    backend: Backend,
}

impl LabRepository {
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
impl LabRepositoryTrait for LabRepository {
    async fn create(&self, user_id: Uuid, new: NewLabRecord) -> Result<LabRecord, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::insert_lab(pool, &user_id, new).await,
            Backend::InMemory(storage) => {
                debug!("Storing lab result in memory: user={}", user_id);
                storage.insert_lab(&user_id, new).await
            }
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LabRecord>, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::labs_for_user(pool, &user_id).await,
            Backend::InMemory(storage) => storage.labs_for_user(&user_id).await,
        }
    }

    async fn get(&self, user_id: Uuid, id: i64) -> Result<Option<LabRecord>, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::get_lab(pool, &user_id, id).await,
            Backend::InMemory(storage) => storage.get_lab(&user_id, id).await,
        }
    }

    async fn find_previous(
        &self,
        user_id: Uuid,
        test_name: String,
        test_date: String,
        id: i64,
    ) -> Result<Option<LabRecord>, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => {
                DatabaseStorage::previous_lab(pool, &user_id, &test_name, &test_date, id).await
            }
            Backend::InMemory(storage) => storage.previous_lab(&user_id, &test_name, &test_date, id).await,
        }
    }

    async fn find_latest(&self, user_id: Uuid, analyte: String) -> Result<Option<LabRecord>, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::latest_lab(pool, &user_id, &analyte).await,
            Backend::InMemory(storage) => storage.latest_lab(&user_id, &analyte).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabasePool;
    use crate::repository::InMemoryStorage;

    fn backends() -> Vec<Backend> {
        vec![
            Backend::InMemory(InMemoryStorage::new()),
            Backend::Database(DatabasePool::in_memory().expect("in-memory pool")),
        ]
    }

    fn lab(test_name: &str, result: &str, test_date: &str) -> NewLabRecord {
        NewLabRecord {
            test_name: test_name.to_string(),
            result: result.to_string(),
            units: Some("mIU/L".to_string()),
            test_date: test_date.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_date_then_id() {
        for backend in backends() {
            let repo = LabRepository::with_backend(backend);
            let user = Uuid::new_v4();

            let late = repo.create(user, lab("TSH", "2.0", "2024-03-01")).await.unwrap();
            let early = repo.create(user, lab("TSH", "1.0", "2024-01-01")).await.unwrap();
            let same_day = repo.create(user, lab("FT4", "1.1", "2024-03-01")).await.unwrap();

            let ids: Vec<i64> = repo.list_for_user(user).await.unwrap().iter().map(|l| l.id).collect();
            assert_eq!(ids, vec![early.id, late.id, same_day.id]);
        }
    }

    #[tokio::test]
    async fn test_labs_are_scoped_to_user() {
        for backend in backends() {
            let repo = LabRepository::with_backend(backend);
            let owner = Uuid::new_v4();
            let other = Uuid::new_v4();

            let created = repo.create(owner, lab("TSH", "2.0", "2024-03-01")).await.unwrap();

            assert!(repo.list_for_user(other).await.unwrap().is_empty());
            assert!(repo.get(other, created.id).await.unwrap().is_none());
            assert_eq!(repo.get(owner, created.id).await.unwrap(), Some(created));
        }
    }

    #[tokio::test]
    async fn test_find_previous_uses_date_then_id() {
        for backend in backends() {
            let repo = LabRepository::with_backend(backend);
            let user = Uuid::new_v4();

            let first = repo.create(user, lab("TSH", "2.0", "2024-02-01")).await.unwrap();
            let second = repo.create(user, lab("TSH", "2.5", "2024-02-01")).await.unwrap();
            let third = repo.create(user, lab("TSH", "3.0", "2024-03-01")).await.unwrap();

            let before_second = repo
                .find_previous(user, "TSH".into(), second.test_date.clone(), second.id)
                .await
                .unwrap();
            assert_eq!(before_second.map(|l| l.id), Some(first.id));

            let before_third = repo
                .find_previous(user, "TSH".into(), third.test_date.clone(), third.id)
                .await
                .unwrap();
            assert_eq!(before_third.map(|l| l.id), Some(second.id));

            let before_first = repo
                .find_previous(user, "TSH".into(), first.test_date.clone(), first.id)
                .await
                .unwrap();
            assert!(before_first.is_none());
        }
    }

    #[tokio::test]
    async fn test_find_previous_matches_name_exactly() {
        for backend in backends() {
            let repo = LabRepository::with_backend(backend);
            let user = Uuid::new_v4();

            repo.create(user, lab("tsh", "2.0", "2024-01-01")).await.unwrap();
            let current = repo.create(user, lab("TSH", "3.0", "2024-02-01")).await.unwrap();

            let previous = repo
                .find_previous(user, "TSH".into(), current.test_date.clone(), current.id)
                .await
                .unwrap();
            assert!(previous.is_none());
        }
    }

    #[tokio::test]
    async fn test_find_latest_ignores_case() {
        for backend in backends() {
            let repo = LabRepository::with_backend(backend);
            let user = Uuid::new_v4();

            repo.create(user, lab("TSH", "2.0", "2024-01-01")).await.unwrap();
            let newest = repo.create(user, lab("tsh", "2.2", "2024-04-01")).await.unwrap();
            repo.create(user, lab("FT4", "1.2", "2024-05-01")).await.unwrap();

            let latest = repo.find_latest(user, "TSH".into()).await.unwrap();
            assert_eq!(latest.map(|l| l.id), Some(newest.id));

            assert!(repo.find_latest(user, "TPOAB".into()).await.unwrap().is_none());
        }
    }
}
