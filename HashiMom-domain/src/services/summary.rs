use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use hashimom_data::repository::{Backend, ProfileRepository, SymptomRepository};

use crate::entities::summary::{
    HealthSummary, SummaryMeta, SymptomSummaryRow, DEFAULT_LOOKBACK_DAYS, SUMMARY_DISCLAIMER,
};
use crate::services::errors::ServiceError;
use crate::services::labs::{create_default_lab_service, DefaultLabService, LabServiceTrait};
use crate::services::profile::{create_default_profile_service, ProfileService, ProfileServiceTrait};
use crate::services::symptoms::{create_default_symptom_service, SymptomService, SymptomServiceTrait};

/// Trait for building exportable summaries
#[async_trait]
pub trait SummaryServiceTrait: Send + Sync {
    /// Trimester, latest thyroid panel and recent symptoms as of `now`.
    ///
    /// `lookback_days` defaults to 30.
    async fn build_summary(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        lookback_days: Option<u32>,
    ) -> Result<HealthSummary, ServiceError>;
}

/// Summary service composed from the profile, lab and symptom services
pub struct SummaryService<P, L, S>
where
    P: ProfileServiceTrait,
    L: LabServiceTrait,
    S: SymptomServiceTrait,
{
    profiles: P,
    labs: L,
    symptoms: S,
}

impl<P, L, S> SummaryService<P, L, S>
where
    P: ProfileServiceTrait,
    L: LabServiceTrait,
    S: SymptomServiceTrait,
{
    /// Create a new summary service
    pub fn new(profiles: P, labs: L, symptoms: S) -> Self {
        Self { profiles, labs, symptoms }
    }
}

#[async_trait]
impl<P, L, S> SummaryServiceTrait for SummaryService<P, L, S>
where
    P: ProfileServiceTrait,
    L: LabServiceTrait,
    S: SymptomServiceTrait,
{
    #[instrument(skip(self))]
    async fn build_summary(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        lookback_days: Option<u32>,
    ) -> Result<HealthSummary, ServiceError> {
        let lookback_days = lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS);
        let today = now.date_naive();
        let since = now
            .checked_sub_signed(Duration::days(i64::from(lookback_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let trimester = self.profiles.current_trimester(user_id, today).await?;
        let thyroid_panel = self.labs.latest_thyroid_panel(user_id, today).await?;
        let symptoms: Vec<SymptomSummaryRow> = self
            .symptoms
            .list_symptoms_since(user_id, since)
            .await?
            .into_iter()
            .map(|s| SymptomSummaryRow {
                date: s.logged_at.date_naive(),
                symptom_name: s.symptom,
                severity: s.severity,
                note: s.note,
            })
            .collect();

        debug!("Summary covers {} symptoms over {} days", symptoms.len(), lookback_days);

        Ok(HealthSummary {
            trimester,
            thyroid_panel,
            symptoms,
            meta: SummaryMeta {
                lookback_days,
                disclaimer: SUMMARY_DISCLAIMER.to_string(),
                generated_at: now,
            },
        })
    }
}

pub type DefaultSummaryService =
    SummaryService<ProfileService<ProfileRepository>, DefaultLabService, SymptomService<SymptomRepository>>;

/// Create a summary service whose stores share the given backend
pub fn create_default_summary_service(backend: &Backend) -> DefaultSummaryService {
    SummaryService::new(
        create_default_profile_service(backend),
        create_default_lab_service(backend),
        create_default_symptom_service(backend),
    )
}
