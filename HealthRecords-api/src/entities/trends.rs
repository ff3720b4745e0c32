use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_records_domain::entities::{LabLineTrend, PairwiseTrend, PeriodSummary};

/// Period-over-period trend of one vital type
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VitalTrendResponse {
    /// Vital type the trend was computed for
    pub vital_type: String,

    /// Length of each comparison window in days
    pub period_days: u32,

    /// Bucket averages and trend; null when either window has no readings
    pub summary: Option<PeriodSummary>,
}

/// Most recent readings of one vital type with their point-to-point trends
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecentTrendsResponse {
    /// Vital type the readings belong to
    pub vital_type: String,

    /// Newest reading first
    pub readings: Vec<PairwiseTrend>,
}

/// Trends of every result line of one lab entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LabEntryTrendsResponse {
    /// Entry the trends were computed for
    pub entry_id: String,

    /// Test name used to find the prior entry
    pub test_name: String,

    /// One trend per result line, in report order
    pub results: Vec<LabLineTrend>,
}
