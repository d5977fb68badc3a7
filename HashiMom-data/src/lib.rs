// HashiMom Data
// This crate handles persistence for labs, profiles, reference ranges and journal entries

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;

// Reference range seed table
pub mod seed;
