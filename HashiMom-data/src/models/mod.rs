// Storage models, one file per table
pub mod lab;
pub mod medication;
pub mod profile;
pub mod reference_range;
pub mod symptom;

pub use lab::{LabRecord, NewLabRecord};
pub use medication::{MedicationRecord, NewMedicationRecord};
pub use profile::{ProfileRecord, ProfileUpdate};
pub use reference_range::ReferenceRangeRecord;
pub use symptom::{NewSymptomRecord, SymptomRecord};
