use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, warn};
use validator::Validate;

use health_records_data::models::document::DocumentCollection;
use health_records_data::repository::{DocumentRepositoryTrait, RepositoryError};

use crate::entities::conversions;
use crate::entities::trend::{PairwiseTrend, PeriodSummary, TrendResult};
use crate::entities::vitals::{Reading, VitalsDocument};
use crate::services::insights::{
    compute_trend, round_to_tenth, POINT_STABILITY_THRESHOLD_PERCENT, VITAL_STABILITY_THRESHOLD_PERCENT,
};
use crate::services::validation_message;

/// Vital types where a decrease is the favourable direction.
/// Every type not listed here is treated as "higher or stable is better".
pub const INVERSE_VITAL_TYPES: [&str; 4] = [
    "blood_pressure_systolic",
    "blood_pressure_diastolic",
    "glucose",
    "weight",
];

/// Look up whether a vital type is an inverse metric
pub fn is_inverse_vital_type(vital_type: &str) -> bool {
    INVERSE_VITAL_TYPES.contains(&vital_type)
}

/// Newest-first ordering for readings of one series.
///
/// Readings on the same date order by time, a reading without a time being
/// older than any timed reading that day. Remaining ties keep document order
/// because the sort is stable.
fn newest_first(a: &Reading, b: &Reading) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.time.cmp(&a.time))
}

/// Readings of one type, newest first
fn series<'a>(readings: &'a [Reading], vital_type: &str) -> Vec<&'a Reading> {
    let mut series: Vec<&Reading> = readings
        .iter()
        .filter(|reading| reading.vital_type == vital_type)
        .collect();
    series.sort_by(|a, b| newest_first(a, b));
    series
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compare the average of the last `period_days` with the average of the
/// `period_days` before that.
///
/// The current period is `[today - period_days, today]`, the previous one
/// `[today - 2 * period_days, today - period_days)`. Returns `None` with fewer
/// than two readings of the type, when either period is empty, or when the
/// periods reach past the earliest representable date.
pub fn summarize_period(
    readings: &[Reading],
    vital_type: &str,
    period_days: u32,
    today: NaiveDate,
) -> Option<PeriodSummary> {
    let series = series(readings, vital_type);
    if series.len() < 2 {
        return None;
    }

    let period = Days::new(u64::from(period_days));
    let current_start = today.checked_sub_days(period)?;
    let previous_start = current_start.checked_sub_days(period)?;

    let current: Vec<f64> = series
        .iter()
        .filter(|r| r.date >= current_start && r.date <= today)
        .map(|r| r.value)
        .collect();
    let previous: Vec<f64> = series
        .iter()
        .filter(|r| r.date >= previous_start && r.date < current_start)
        .map(|r| r.value)
        .collect();

    if current.is_empty() || previous.is_empty() {
        return None;
    }

    let current_average = round_to_tenth(mean(&current));
    let previous_average = round_to_tenth(mean(&previous));
    let trend = compute_trend(current_average, previous_average, VITAL_STABILITY_THRESHOLD_PERCENT)
        .with_inverse(is_inverse_vital_type(vital_type));

    Some(PeriodSummary {
        vital_type: vital_type.to_string(),
        period_days,
        current_average,
        previous_average,
        current_count: current.len(),
        previous_count: previous.len(),
        trend,
    })
}

/// Period-over-period trend for one vital type; see [`summarize_period`]
pub fn compute_period_trend(
    readings: &[Reading],
    vital_type: &str,
    period_days: u32,
    today: NaiveDate,
) -> Option<TrendResult> {
    summarize_period(readings, vital_type, period_days, today).map(|summary| summary.trend)
}

/// The `limit` most recent readings of a type, newest first, each with its
/// change from the next-older reading in the series.
pub fn compute_pairwise_trends(readings: &[Reading], vital_type: &str, limit: usize) -> Vec<PairwiseTrend> {
    let series = series(readings, vital_type);
    let is_inverse = is_inverse_vital_type(vital_type);

    series
        .iter()
        .enumerate()
        .take(limit)
        .map(|(index, reading)| PairwiseTrend {
            reading: (*reading).clone(),
            trend: series.get(index + 1).map(|older| {
                compute_trend(reading.value, older.value, POINT_STABILITY_THRESHOLD_PERCENT)
                    .with_inverse(is_inverse)
            }),
        })
        .collect()
}

/// Vitals service errors
#[derive(Debug, Error)]
pub enum VitalsServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Stored document could not be decoded
    #[error("Malformed vitals document: {0}")]
    MalformedDocument(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<RepositoryError> for VitalsServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(msg) => VitalsServiceError::ValidationError(msg),
            other => VitalsServiceError::RepositoryError(other.to_string()),
        }
    }
}

/// Trait for vitals service operations
#[async_trait]
pub trait VitalsServiceTrait {
    /// Fetch every reading the owner has recorded
    async fn get_readings(&self, owner_id: &str) -> Result<Vec<Reading>, VitalsServiceError>;

    /// Replace every reading the owner has recorded
    async fn replace_readings(
        &self,
        owner_id: &str,
        readings: Vec<Reading>,
    ) -> Result<Vec<Reading>, VitalsServiceError>;

    /// Period-over-period summary ending today
    async fn period_trend(
        &self,
        owner_id: &str,
        vital_type: &str,
        period_days: u32,
    ) -> Result<Option<PeriodSummary>, VitalsServiceError>;

    /// Most recent readings with their point-to-point trends
    async fn recent_trends(
        &self,
        owner_id: &str,
        vital_type: &str,
        limit: usize,
    ) -> Result<Vec<PairwiseTrend>, VitalsServiceError>;
}

/// Vitals service over a document repository
pub struct VitalsService<R: DocumentRepositoryTrait> {
    repository: R,
}

impl<R: DocumentRepositoryTrait> VitalsService<R> {
    /// Create a new vitals service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn validate_document(document: &VitalsDocument) -> Result<(), VitalsServiceError> {
        document
            .validate()
            .map_err(|errors| VitalsServiceError::ValidationError(validation_message(&errors)))?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = document.readings.iter().find(|r| !seen.insert(r.id.as_str())) {
            return Err(VitalsServiceError::ValidationError(format!(
                "Duplicate reading id: {}",
                duplicate.id
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl<R: DocumentRepositoryTrait + Send + Sync> VitalsServiceTrait for VitalsService<R> {
    async fn get_readings(&self, owner_id: &str) -> Result<Vec<Reading>, VitalsServiceError> {
        let stored = self
            .repository
            .get_document(owner_id, DocumentCollection::Vitals)
            .await?;

        let document = conversions::convert_to_domain_vitals(stored)
            .map_err(|e| VitalsServiceError::MalformedDocument(e.to_string()))?;

        debug!("Loaded {} readings for {}", document.readings.len(), owner_id);
        Ok(document.readings)
    }

    async fn replace_readings(
        &self,
        owner_id: &str,
        readings: Vec<Reading>,
    ) -> Result<Vec<Reading>, VitalsServiceError> {
        let document = VitalsDocument { readings };
        if let Err(e) = Self::validate_document(&document) {
            warn!("Rejected vitals document for {}: {}", owner_id, e);
            return Err(e);
        }

        let body = conversions::convert_to_data_vitals(&document)
            .map_err(|e| VitalsServiceError::MalformedDocument(e.to_string()))?;

        self.repository
            .put_document(owner_id, DocumentCollection::Vitals, body)
            .await?;

        debug!("Stored {} readings for {}", document.readings.len(), owner_id);
        Ok(document.readings)
    }

    async fn period_trend(
        &self,
        owner_id: &str,
        vital_type: &str,
        period_days: u32,
    ) -> Result<Option<PeriodSummary>, VitalsServiceError> {
        let readings = self.get_readings(owner_id).await?;
        let today = Utc::now().date_naive();
        Ok(summarize_period(&readings, vital_type, period_days, today))
    }

    async fn recent_trends(
        &self,
        owner_id: &str,
        vital_type: &str,
        limit: usize,
    ) -> Result<Vec<PairwiseTrend>, VitalsServiceError> {
        let readings = self.get_readings(owner_id).await?;
        Ok(compute_pairwise_trends(&readings, vital_type, limit))
    }
}

/// Create a default vitals service using the repository from the data layer
pub fn create_default_vitals_service() -> impl VitalsServiceTrait + Send + Sync {
    VitalsService::new(health_records_data::repository::DocumentRepository::new())
}
