// HealthRecords Domain
// This crate contains the business logic for the HealthRecords service

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from the data layer for convenience
pub use health_records_data::database;
