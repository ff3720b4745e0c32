// Public entities for the HealthRecords API
// This module contains data structures that are shared across the application boundary

// Common entities for error handling
pub mod common;

// Trend response bodies
pub mod trends;

pub use common::ErrorResponse;
pub use trends::{LabEntryTrendsResponse, RecentTrendsResponse, VitalTrendResponse};
