// HashiMom Domain
// This crate contains the gestational calculator, lab evaluation and the services built on them

// Domain entities
pub mod entities;

// Services that implement business logic
pub mod services;

// Health checks and system status
pub mod health;

// Re-export the database module from hashimom-data for convenience
pub use hashimom_data::database;
