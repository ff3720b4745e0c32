use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::vitals::Reading;

/// Direction of change between a current and a prior value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Increased beyond the stability threshold
    Up,

    /// Decreased beyond the stability threshold
    Down,

    /// Changed by less than the stability threshold
    Stable,
}

/// Directional change between two values.
///
/// Derived on demand and never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct TrendResult {
    /// Direction of the change
    pub direction: TrendDirection,

    /// Magnitude of the change in percent, rounded to a whole number
    pub percent_change: f64,

    /// True when a decrease is the favourable direction for this value
    pub is_inverse: bool,
}

impl TrendResult {
    /// Return the same trend carrying the caller's inverse-metric flag
    pub fn with_inverse(self, is_inverse: bool) -> Self {
        Self { is_inverse, ..self }
    }
}

/// Period-over-period summary for one vital-sign type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PeriodSummary {
    /// Vital-sign type the summary covers
    pub vital_type: String,

    /// Width of each period in days
    pub period_days: u32,

    /// Mean of the current period, rounded to one decimal
    pub current_average: f64,

    /// Mean of the previous period, rounded to one decimal
    pub previous_average: f64,

    /// Readings in the current period
    pub current_count: usize,

    /// Readings in the previous period
    pub previous_count: usize,

    /// Trend from the previous to the current average
    pub trend: TrendResult,
}

/// A reading paired with its change from the next-older reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PairwiseTrend {
    /// The reading shown on the card
    pub reading: Reading,

    /// Change from the next-older reading, if there is one
    pub trend: Option<TrendResult>,
}

/// Trend for one named line of a lab result entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LabLineTrend {
    /// Result line name, e.g. "LDL"
    pub name: String,

    /// Change from the previous completed result, if comparable
    pub trend: Option<TrendResult>,
}
