use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use hashimom_data::repository::{Backend, ProfileRepository, ProfileRepositoryTrait};

use crate::entities::conversions;
use crate::entities::gestation::{GestationalAge, Trimester};
use crate::entities::profile::{Profile, ProfileSummary, UpsertProfileRequest};
use crate::services::errors::{map_repo_error, validation_message, ServiceError};
use crate::services::gestation::gestational_age_for_profile;

/// Trait for pregnancy profile operations
#[async_trait]
pub trait ProfileServiceTrait: Send + Sync {
    /// Stored profile, if any
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ServiceError>;

    /// Profile with the gestational age on `today`
    async fn get_summary(&self, user_id: Uuid, today: NaiveDate) -> Result<ProfileSummary, ServiceError>;

    /// Validate and store both dates and notes, then summarize
    async fn upsert(
        &self,
        user_id: Uuid,
        request: UpsertProfileRequest,
        today: NaiveDate,
    ) -> Result<ProfileSummary, ServiceError>;

    /// Gestational age on `today`, unknown without a profile
    async fn gestational_age(&self, user_id: Uuid, today: NaiveDate) -> Result<GestationalAge, ServiceError>;

    /// Trimester on `today`
    async fn current_trimester(&self, user_id: Uuid, today: NaiveDate) -> Result<Option<Trimester>, ServiceError> {
        Ok(self.gestational_age(user_id, today).await?.trimester)
    }
}

/// Build the displayed summary of a profile
pub fn summarize_profile(profile: Option<&Profile>, today: NaiveDate) -> ProfileSummary {
    let Some(profile) = profile else {
        return ProfileSummary::empty();
    };

    let age = gestational_age_for_profile(profile, today);
    ProfileSummary {
        lmp_date: profile.lmp_date,
        due_date: profile.due_date,
        high_risk_notes: profile.high_risk_notes.clone().unwrap_or_default(),
        gestational_age_weeks: age.weeks,
        gestational_age_days: age.days,
        trimester: age.trimester,
    }
}

/// Profile service for domain logic
pub struct ProfileService<R: ProfileRepositoryTrait> {
    repository: R,
}

impl<R: ProfileRepositoryTrait> ProfileService<R> {
    /// Create a new profile service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: ProfileRepositoryTrait> ProfileServiceTrait for ProfileService<R> {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ServiceError> {
        self.repository
            .get(user_id)
            .await
            .map_err(map_repo_error)?
            .map(conversions::convert_to_domain_profile)
            .transpose()
            .map_err(ServiceError::InvalidData)
    }

    #[instrument(skip(self))]
    async fn get_summary(&self, user_id: Uuid, today: NaiveDate) -> Result<ProfileSummary, ServiceError> {
        let profile = self.get_profile(user_id).await?;
        Ok(summarize_profile(profile.as_ref(), today))
    }

    #[instrument(skip(self, request))]
    async fn upsert(
        &self,
        user_id: Uuid,
        request: UpsertProfileRequest,
        today: NaiveDate,
    ) -> Result<ProfileSummary, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(&e)))?;

        let update = conversions::convert_to_data_profile_update(&request);
        let record = self.repository.upsert(user_id, update).await.map_err(map_repo_error)?;
        let profile = conversions::convert_to_domain_profile(record).map_err(ServiceError::InvalidData)?;

        info!("Profile updated");
        Ok(summarize_profile(Some(&profile), today))
    }

    async fn gestational_age(&self, user_id: Uuid, today: NaiveDate) -> Result<GestationalAge, ServiceError> {
        let profile = self.get_profile(user_id).await?;
        Ok(profile
            .map(|p| gestational_age_for_profile(&p, today))
            .unwrap_or_default())
    }
}

/// Create a profile service over the given backend
pub fn create_default_profile_service(backend: &Backend) -> ProfileService<ProfileRepository> {
    ProfileService::new(ProfileRepository::with_backend(backend.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hashimom_data::repository::InMemoryStorage;

    fn service() -> ProfileService<ProfileRepository> {
        create_default_profile_service(&Backend::InMemory(InMemoryStorage::new()))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_missing_profile_summary() {
        let summary = service().get_summary(Uuid::new_v4(), date(2024, 6, 1)).await.unwrap();

        assert_eq!(summary, ProfileSummary::empty());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["trimester"], "-");
        assert_eq!(json["high_risk_notes"], "");
    }

    #[tokio::test]
    async fn test_upsert_keeps_both_dates_and_prefers_lmp() {
        let service = service();
        let user = Uuid::new_v4();
        let today = date(2024, 6, 1);

        let summary = service
            .upsert(
                user,
                UpsertProfileRequest {
                    lmp_date: Some(today - Duration::days(91)),
                    due_date: Some(date(2024, 12, 25)),
                    high_risk_notes: Some("Hashimoto's, on levothyroxine".to_string()),
                },
                today,
            )
            .await
            .unwrap();

        assert_eq!(summary.gestational_age_weeks, Some(13));
        assert_eq!(summary.gestational_age_days, Some(0));
        assert_eq!(summary.trimester, Some(Trimester::T2));
        assert_eq!(summary.due_date, Some(date(2024, 12, 25)));

        let stored = service.get_profile(user).await.unwrap().unwrap();
        assert_eq!(stored.due_date, Some(date(2024, 12, 25)));
        assert_eq!(service.current_trimester(user, today).await.unwrap(), Some(Trimester::T2));
    }

    #[tokio::test]
    async fn test_upsert_stores_blank_notes_as_absent() {
        let service = service();
        let user = Uuid::new_v4();

        let summary = service
            .upsert(
                user,
                UpsertProfileRequest {
                    high_risk_notes: Some(String::new()),
                    ..Default::default()
                },
                date(2024, 6, 1),
            )
            .await
            .unwrap();

        assert_eq!(summary.high_risk_notes, "");
        assert_eq!(service.get_profile(user).await.unwrap().unwrap().high_risk_notes, None);
    }

    #[tokio::test]
    async fn test_upsert_rejects_long_notes() {
        let result = service()
            .upsert(
                Uuid::new_v4(),
                UpsertProfileRequest {
                    high_risk_notes: Some("x".repeat(1001)),
                    ..Default::default()
                },
                date(2024, 6, 1),
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
