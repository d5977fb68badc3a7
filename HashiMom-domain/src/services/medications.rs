use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use hashimom_data::repository::{Backend, MedicationRepository, MedicationRepositoryTrait};

use crate::entities::conversions;
use crate::entities::medication::{Medication, RecordMedicationRequest};
use crate::services::errors::{map_repo_error, validation_message, ServiceError};

/// Trait for medication log operations
#[async_trait]
pub trait MedicationServiceTrait: Send + Sync {
    /// Validate and record an intake
    async fn record_medication(
        &self,
        user_id: Uuid,
        request: RecordMedicationRequest,
    ) -> Result<Medication, ServiceError>;

    /// All intakes, newest first
    async fn list_medications(&self, user_id: Uuid) -> Result<Vec<Medication>, ServiceError>;
}

/// Medication service for domain logic
pub struct MedicationService<R: MedicationRepositoryTrait> {
    repository: R,
}

impl<R: MedicationRepositoryTrait> MedicationService<R> {
    /// Create a new medication service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: MedicationRepositoryTrait> MedicationServiceTrait for MedicationService<R> {
    #[instrument(skip(self, request))]
    async fn record_medication(
        &self,
        user_id: Uuid,
        request: RecordMedicationRequest,
    ) -> Result<Medication, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(&e)))?;
        if request.medication_name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "medication_name: Medication name must not be blank".to_string(),
            ));
        }

        let taken_at = request.taken_at.unwrap_or_else(Utc::now);
        let new = conversions::convert_to_data_new_medication(&request, taken_at);
        let record = self.repository.create(user_id, new).await.map_err(map_repo_error)?;
        info!("Recorded medication intake {}", record.id);

        conversions::convert_to_domain_medication(record).map_err(ServiceError::InvalidData)
    }

    async fn list_medications(&self, user_id: Uuid) -> Result<Vec<Medication>, ServiceError> {
        self.repository
            .list_for_user(user_id)
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(conversions::convert_to_domain_medication)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::InvalidData)
    }
}

/// Create a medication service over the given backend
pub fn create_default_medication_service(backend: &Backend) -> MedicationService<MedicationRepository> {
    MedicationService::new(MedicationRepository::with_backend(backend.clone()))
}
