// Domain entities and value objects
pub mod conversions;
pub mod gestation;
pub mod lab;
pub mod medication;
pub mod profile;
pub mod reference_range;
pub mod summary;
pub mod symptom;

// Re-export common types for easier imports
pub use gestation::{GestationalAge, Trimester};
pub use lab::{CreateLabRequest, LabEntry, LabEvaluation, LabResult, LabStatus, ThyroidPanel};
pub use medication::{Medication, RecordMedicationRequest};
pub use profile::{Profile, ProfileSummary, UpsertProfileRequest};
pub use reference_range::{ReferenceRange, ReferenceRangeLookup, ReferenceRangeTable};
pub use summary::{HealthSummary, SummaryMeta, SymptomSummaryRow};
pub use symptom::{LogSymptomRequest, Symptom};
