use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::models::{ProfileRecord, ProfileUpdate};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;
use super::Backend;

/// Repository trait for pregnancy profiles
#[async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    /// Get the profile of a user
    async fn get(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, RepositoryError>;

    /// Create the profile on first write, replace its fields afterwards
    async fn upsert(&self, user_id: Uuid, update: ProfileUpdate) -> Result<ProfileRecord, RepositoryError>;
}

/// Repository for pregnancy profiles
#[derive(Debug, Clone, Default)]
pub struct ProfileRepository {
    backend: Backend,
}

impl ProfileRepository {
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
impl ProfileRepositoryTrait for ProfileRepository {
    async fn get(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::get_profile(pool, &user_id).await,
            Backend::InMemory(storage) => storage.get_profile(&user_id).await,
        }
    }

    async fn upsert(&self, user_id: Uuid, update: ProfileUpdate) -> Result<ProfileRecord, RepositoryError> {
        let user_id = user_id.to_string();
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::upsert_profile(pool, &user_id, update, updated_at).await,
            Backend::InMemory(storage) => storage.upsert_profile(&user_id, update, updated_at).await,
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

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        for backend in backends() {
            let repo = ProfileRepository::with_backend(backend);
            assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_replaces() {
        for backend in backends() {
            let repo = ProfileRepository::with_backend(backend);
            let user = Uuid::new_v4();

            let created = repo
                .upsert(
                    user,
                    ProfileUpdate {
                        lmp_date: Some("2024-01-01".to_string()),
                        due_date: None,
                        high_risk_notes: Some("twins".to_string()),
                    },
                )
                .await
                .unwrap();
            assert_eq!(created.lmp_date.as_deref(), Some("2024-01-01"));

            repo.upsert(
                user,
                ProfileUpdate {
                    lmp_date: None,
                    due_date: Some("2024-10-07".to_string()),
                    high_risk_notes: None,
                },
            )
            .await
            .unwrap();

            let stored = repo.get(user).await.unwrap().unwrap();
            assert_eq!(stored.lmp_date, None);
            assert_eq!(stored.due_date.as_deref(), Some("2024-10-07"));
            assert_eq!(stored.high_risk_notes, None);
            assert!(stored.updated_at.ends_with('Z'));
        }
    }
}
