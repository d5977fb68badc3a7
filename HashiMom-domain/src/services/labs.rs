use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use hashimom_data::repository::{
    Backend, LabRepository, LabRepositoryTrait, ProfileRepository, ProfileRepositoryTrait, ReferenceRangeRepository,
    ReferenceRangeRepositoryTrait,
};

use crate::entities::conversions;
use crate::entities::gestation::{GestationalAge, Trimester};
use crate::entities::lab::{CreateLabRequest, LabEntry, LabResult, ThyroidPanel};
use crate::entities::reference_range::ReferenceRangeTable;
use crate::services::errors::{map_repo_error, validation_message, ServiceError};
use crate::services::gestation::gestational_age_for_profile;
use crate::services::lab_status::{evaluate_lab, find_previous};

/// Analytes shown in the thyroid panel
pub const TSH: &str = "TSH";
pub const FT4: &str = "FT4";

/// Trait for lab result operations
#[async_trait]
pub trait LabServiceTrait: Send + Sync {
    /// Validate and store a lab result
    async fn create_lab(&self, user_id: Uuid, request: CreateLabRequest) -> Result<LabResult, ServiceError>;

    /// All labs of a user, oldest first, each with its evaluation on `today`
    async fn list_labs(&self, user_id: Uuid, today: NaiveDate) -> Result<Vec<LabEntry>, ServiceError>;

    /// Evaluate a single lab
    async fn evaluate_lab(&self, user_id: Uuid, lab_id: i64, today: NaiveDate) -> Result<LabEntry, ServiceError>;

    /// Latest TSH and FT4 results with their evaluations
    async fn latest_thyroid_panel(&self, user_id: Uuid, today: NaiveDate) -> Result<ThyroidPanel, ServiceError>;
}

/// Lab service combining the lab, profile and reference range stores
pub struct LabService<L, P, R>
where
    L: LabRepositoryTrait,
    P: ProfileRepositoryTrait,
    R: ReferenceRangeRepositoryTrait,
{
    labs: L,
    profiles: P,
    ranges: R,
}

impl<L, P, R> LabService<L, P, R>
where
    L: LabRepositoryTrait,
    P: ProfileRepositoryTrait,
    R: ReferenceRangeRepositoryTrait,
{
    /// Create a new lab service
    pub fn new(labs: L, profiles: P, ranges: R) -> Self {
        Self { labs, profiles, ranges }
    }

    fn validate_create_request(&self, request: &CreateLabRequest) -> Result<(), ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(&e)))?;

        if request.test_name.trim().is_empty() {
            return Err(ServiceError::Validation("test_name: Test name must not be blank".to_string()));
        }
        Ok(())
    }

    /// Trimester from the user's profile on `today`
    async fn trimester_at(&self, user_id: Uuid, today: NaiveDate) -> Result<Option<Trimester>, ServiceError> {
        let record = self.profiles.get(user_id).await.map_err(map_repo_error)?;
        let age = match record {
            Some(record) => {
                let profile = conversions::convert_to_domain_profile(record).map_err(ServiceError::InvalidData)?;
                gestational_age_for_profile(&profile, today)
            }
            None => GestationalAge::unknown(),
        };
        Ok(age.trimester)
    }

    /// Evaluate one lab using store queries for its predecessor and range
    async fn entry_for(&self, lab: LabResult, trimester: Option<Trimester>) -> Result<LabEntry, ServiceError> {
        let previous = self
            .labs
            .find_previous(
                lab.user_id,
                lab.test_name.clone(),
                conversions::format_date(lab.test_date),
                lab.id,
            )
            .await
            .map_err(map_repo_error)?
            .map(conversions::convert_to_domain_lab)
            .transpose()
            .map_err(ServiceError::InvalidData)?;

        let mut table = ReferenceRangeTable::new();
        if let Some(trimester) = trimester {
            let range = self
                .ranges
                .get(lab.test_name.clone(), trimester.to_string())
                .await
                .map_err(map_repo_error)?;
            if let Some(range) = range {
                table.insert(conversions::convert_to_domain_range(range).map_err(ServiceError::InvalidData)?);
            }
        }

        let evaluation = evaluate_lab(&lab, previous.as_ref(), trimester, &table);
        Ok(LabEntry { lab, evaluation })
    }

    async fn latest_entry(
        &self,
        user_id: Uuid,
        analyte: &str,
        trimester: Option<Trimester>,
    ) -> Result<Option<LabEntry>, ServiceError> {
        let latest = self
            .labs
            .find_latest(user_id, analyte.to_string())
            .await
            .map_err(map_repo_error)?;

        match latest {
            Some(record) => {
                let lab = conversions::convert_to_domain_lab(record).map_err(ServiceError::InvalidData)?;
                Ok(Some(self.entry_for(lab, trimester).await?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<L, P, R> LabServiceTrait for LabService<L, P, R>
where
    L: LabRepositoryTrait,
    P: ProfileRepositoryTrait,
    R: ReferenceRangeRepositoryTrait,
{
    #[instrument(skip(self, request))]
    async fn create_lab(&self, user_id: Uuid, request: CreateLabRequest) -> Result<LabResult, ServiceError> {
        self.validate_create_request(&request)?;

        let test_date = request.test_date.unwrap_or_else(|| Local::now().date_naive());
        let new = conversions::convert_to_data_new_lab(&request, test_date);

        let record = self.labs.create(user_id, new).await.map_err(map_repo_error)?;
        info!("Stored lab result {} ({})", record.id, record.test_name);

        conversions::convert_to_domain_lab(record).map_err(ServiceError::InvalidData)
    }

    #[instrument(skip(self))]
    async fn list_labs(&self, user_id: Uuid, today: NaiveDate) -> Result<Vec<LabEntry>, ServiceError> {
        let trimester = self.trimester_at(user_id, today).await?;

        let labs = self
            .labs
            .list_for_user(user_id)
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(conversions::convert_to_domain_lab)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::InvalidData)?;

        let table = self
            .ranges
            .list()
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(conversions::convert_to_domain_range)
            .collect::<Result<ReferenceRangeTable, _>>()
            .map_err(ServiceError::InvalidData)?;

        debug!("Evaluating {} labs against {} reference ranges", labs.len(), table.len());

        let entries = labs
            .iter()
            .map(|lab| LabEntry {
                lab: lab.clone(),
                evaluation: evaluate_lab(lab, find_previous(&labs, lab), trimester, &table),
            })
            .collect();

        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn evaluate_lab(&self, user_id: Uuid, lab_id: i64, today: NaiveDate) -> Result<LabEntry, ServiceError> {
        let record = self
            .labs
            .get(user_id, lab_id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Lab result with ID {} not found", lab_id)))?;
        let lab = conversions::convert_to_domain_lab(record).map_err(ServiceError::InvalidData)?;

        let trimester = self.trimester_at(user_id, today).await?;
        self.entry_for(lab, trimester).await
    }

    #[instrument(skip(self))]
    async fn latest_thyroid_panel(&self, user_id: Uuid, today: NaiveDate) -> Result<ThyroidPanel, ServiceError> {
        let trimester = self.trimester_at(user_id, today).await?;

        Ok(ThyroidPanel {
            tsh: self.latest_entry(user_id, TSH, trimester).await?,
            ft4: self.latest_entry(user_id, FT4, trimester).await?,
        })
    }
}

pub type DefaultLabService = LabService<LabRepository, ProfileRepository, ReferenceRangeRepository>;

/// Create a lab service whose stores share the given backend
pub fn create_default_lab_service(backend: &Backend) -> DefaultLabService {
    LabService::new(
        LabRepository::with_backend(backend.clone()),
        ProfileRepository::with_backend(backend.clone()),
        ReferenceRangeRepository::with_backend(backend.clone()),
    )
}
