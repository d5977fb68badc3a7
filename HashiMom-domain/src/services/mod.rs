// Domain services module
pub mod errors;
pub mod gestation;
pub mod lab_status;
pub mod labs;
pub mod medications;
pub mod profile;
pub mod summary;
pub mod symptoms;

use hashimom_data::repository::{Backend, MedicationRepository, ProfileRepository, SymptomRepository};

// Re-export service traits and factory functions
pub use errors::{map_repo_error, ServiceError};
pub use gestation::{calculate_by_due, calculate_by_lmp, gestational_age_for_profile};
pub use labs::{create_default_lab_service, DefaultLabService, LabService, LabServiceTrait};
pub use medications::{create_default_medication_service, MedicationService, MedicationServiceTrait};
pub use profile::{create_default_profile_service, ProfileService, ProfileServiceTrait};
pub use summary::{create_default_summary_service, DefaultSummaryService, SummaryService, SummaryServiceTrait};
pub use symptoms::{create_default_symptom_service, SymptomService, SymptomServiceTrait};

/// Every service, built over one shared backend
pub struct HashiMomServices {
    pub profiles: ProfileService<ProfileRepository>,
    pub labs: DefaultLabService,
    pub symptoms: SymptomService<SymptomRepository>,
    pub medications: MedicationService<MedicationRepository>,
    pub summaries: DefaultSummaryService,
}

impl HashiMomServices {
    /// Services over the global pool, or one in-memory store shared by all of them
    pub fn new() -> Self {
        Self::with_backend(&Backend::detect())
    }

    pub fn with_backend(backend: &Backend) -> Self {
        Self {
            profiles: create_default_profile_service(backend),
            labs: create_default_lab_service(backend),
            symptoms: create_default_symptom_service(backend),
            medications: create_default_medication_service(backend),
            summaries: create_default_summary_service(backend),
        }
    }
}

impl Default for HashiMomServices {
    fn default() -> Self {
        Self::new()
    }
}
