// HealthRecords Data
// This crate handles document persistence for the HealthRecords service

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
