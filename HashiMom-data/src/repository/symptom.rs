use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewSymptomRecord, SymptomRecord};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;
use super::Backend;

/// Repository trait for logged symptoms
#[async_trait]
pub trait SymptomRepositoryTrait: Send + Sync {
    /// Append a symptom entry
    async fn create(&self, user_id: Uuid, new: NewSymptomRecord) -> Result<SymptomRecord, RepositoryError>;

    /// All symptoms of a user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SymptomRecord>, RepositoryError>;

    /// Symptoms logged at or after `since` (RFC 3339), newest first
    async fn list_since(&self, user_id: Uuid, since: String) -> Result<Vec<SymptomRecord>, RepositoryError>;
}

/// Repository for logged symptoms
#[derive(Debug, Clone, Default)]
pub struct SymptomRepository {
    backend: Backend,
}

impl SymptomRepository {
    /// Create a repository over the global pool, or in-memory storage
    pub fn new() -> Self {
        Self::with_backend(Backend::detect())
    }

    /// Create a repository over an explicit backend
    pub fn with_backend(backend: Backend) -> Self {
        Self { backend }
    }

    async fn query(&self, user_id: Uuid, since: Option<&str>) -> Result<Vec<SymptomRecord>, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::symptoms_for_user(pool, &user_id, since).await,
            Backend::InMemory(storage) => storage.symptoms_for_user(&user_id, since).await,
        }
    }
}

#[async_trait]
impl SymptomRepositoryTrait for SymptomRepository {
    async fn create(&self, user_id: Uuid, new: NewSymptomRecord) -> Result<SymptomRecord, RepositoryError> {
        if new.severity > 10 {
            return Err(RepositoryError::Validation(format!(
                "Severity must be between 0 and 10, got {}",
                new.severity
            )));
        }

        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::insert_symptom(pool, &user_id, new).await,
            Backend::InMemory(storage) => storage.insert_symptom(&user_id, new).await,
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SymptomRecord>, RepositoryError> {
        self.query(user_id, None).await
    }

    async fn list_since(&self, user_id: Uuid, since: String) -> Result<Vec<SymptomRecord>, RepositoryError> {
        self.query(user_id, Some(since.as_str())).await
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

    fn symptom(name: &str, severity: u8, logged_at: &str) -> NewSymptomRecord {
        NewSymptomRecord {
            symptom: name.to_string(),
            severity,
            note: None,
            logged_at: logged_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_since_filters_and_orders_newest_first() {
        for backend in backends() {
            let repo = SymptomRepository::with_backend(backend);
            let user = Uuid::new_v4();

            repo.create(user, symptom("fatigue", 4, "2024-05-01T08:00:00.000000Z")).await.unwrap();
            let a = repo.create(user, symptom("nausea", 6, "2024-05-20T08:00:00.000000Z")).await.unwrap();
            let b = repo.create(user, symptom("cold hands", 2, "2024-05-20T08:00:00.000000Z")).await.unwrap();
            let c = repo.create(user, symptom("brain fog", 5, "2024-05-25T21:30:00.000000Z")).await.unwrap();

            let recent = repo
                .list_since(user, "2024-05-10T00:00:00.000000Z".to_string())
                .await
                .unwrap();
            let ids: Vec<i64> = recent.iter().map(|s| s.id).collect();
            assert_eq!(ids, vec![c.id, b.id, a.id]);

            assert_eq!(repo.list_for_user(user).await.unwrap().len(), 4);
            assert!(repo.list_for_user(Uuid::new_v4()).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_severity() {
        let repo = SymptomRepository::with_backend(Backend::InMemory(InMemoryStorage::new()));
        let result = repo
            .create(Uuid::new_v4(), symptom("fatigue", 11, "2024-05-01T08:00:00.000000Z"))
            .await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }
}
