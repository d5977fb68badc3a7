use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use hashimom_data::repository::{Backend, SymptomRepository, SymptomRepositoryTrait};

use crate::entities::conversions;
use crate::entities::symptom::{LogSymptomRequest, Symptom};
use crate::services::errors::{map_repo_error, validation_message, ServiceError};

/// Trait for symptom journal operations
#[async_trait]
pub trait SymptomServiceTrait: Send + Sync {
    /// Validate and log a symptom
    async fn log_symptom(&self, user_id: Uuid, request: LogSymptomRequest) -> Result<Symptom, ServiceError>;

    /// All symptoms, newest first
    async fn list_symptoms(&self, user_id: Uuid) -> Result<Vec<Symptom>, ServiceError>;

    /// Symptoms logged at or after `since`, newest first
    async fn list_symptoms_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<Vec<Symptom>, ServiceError>;
}

/// Symptom service for domain logic
pub struct SymptomService<R: SymptomRepositoryTrait> {
    repository: R,
}

impl<R: SymptomRepositoryTrait> SymptomService<R> {
    /// Create a new symptom service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

fn to_domain(records: Vec<hashimom_data::models::SymptomRecord>) -> Result<Vec<Symptom>, ServiceError> {
    records
        .into_iter()
        .map(conversions::convert_to_domain_symptom)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::InvalidData)
}

#[async_trait]
impl<R: SymptomRepositoryTrait> SymptomServiceTrait for SymptomService<R> {
    #[instrument(skip(self, request))]
    async fn log_symptom(&self, user_id: Uuid, request: LogSymptomRequest) -> Result<Symptom, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(&e)))?;
        if request.symptom.trim().is_empty() {
            return Err(ServiceError::Validation("symptom: Symptom must not be blank".to_string()));
        }

        let logged_at = request.logged_at.unwrap_or_else(Utc::now);
        let new = conversions::convert_to_data_new_symptom(&request, logged_at);
        let record = self.repository.create(user_id, new).await.map_err(map_repo_error)?;
        info!("Logged symptom {} with severity {}", record.id, record.severity);

        conversions::convert_to_domain_symptom(record).map_err(ServiceError::InvalidData)
    }

    async fn list_symptoms(&self, user_id: Uuid) -> Result<Vec<Symptom>, ServiceError> {
        let records = self.repository.list_for_user(user_id).await.map_err(map_repo_error)?;
        to_domain(records)
    }

    async fn list_symptoms_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<Vec<Symptom>, ServiceError> {
        let records = self
            .repository
            .list_since(user_id, conversions::format_timestamp(since))
            .await
            .map_err(map_repo_error)?;
        to_domain(records)
    }
}

/// Create a symptom service over the given backend
pub fn create_default_symptom_service(backend: &Backend) -> SymptomService<SymptomRepository> {
    SymptomService::new(SymptomRepository::with_backend(backend.clone()))
}
