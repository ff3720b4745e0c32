use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use utoipa::IntoParams;

use health_records_domain::entities::VitalsDocument;
use health_records_domain::services::{create_default_vitals_service, VitalsServiceTrait};

use crate::entities::{ErrorResponse, RecentTrendsResponse, VitalTrendResponse};

/// Default comparison window for period trends
pub const DEFAULT_PERIOD_DAYS: u32 = 7;

/// Longest comparison window accepted for period trends
pub const MAX_PERIOD_DAYS: u32 = 365;

/// Default number of recent readings returned
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Largest number of recent readings returned
pub const MAX_RECENT_LIMIT: usize = 100;

/// Query parameters for the period trend of one vital type
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VitalTrendParams {
    /// Vital type, e.g. "weight"
    #[serde(rename = "type")]
    pub vital_type: Option<String>,

    /// Window length in days (default: 7, max: 365)
    pub period_days: Option<u32>,
}

/// Query parameters for the recent readings of one vital type
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentTrendsParams {
    /// Vital type, e.g. "heart_rate"
    #[serde(rename = "type")]
    pub vital_type: Option<String>,

    /// Number of readings (default: 5, max: 100)
    pub limit: Option<usize>,
}

/// Service type for dependency injection
pub type VitalsService = Arc<dyn VitalsServiceTrait + Send + Sync>;

/// Create a default service for the handlers to use
pub fn create_service() -> VitalsService {
    Arc::new(create_default_vitals_service())
}

fn required_vital_type(raw: Option<String>) -> Result<String, ErrorResponse> {
    match raw.map(|t| t.trim().to_string()) {
        Some(vital_type) if !vital_type.is_empty() => Ok(vital_type),
        _ => Err(ErrorResponse::bad_request("Query parameter 'type' is required")),
    }
}

/// Get every vital reading of an owner
#[utoipa::path(
    get,
    path = "/api/v1/users/{owner_id}/vitals",
    params(
        ("owner_id" = String, Path, description = "Owner of the vitals document")
    ),
    responses(
        (status = 200, description = "Vitals document", body = VitalsDocument),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "vitals"
)]
#[instrument(skip(service))]
pub async fn get_vitals(
    State(service): State<VitalsService>,
    Path(owner_id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    info!("Fetching vitals for {}", owner_id);

    let readings = service.get_readings(&owner_id).await?;
    Ok((StatusCode::OK, Json(VitalsDocument { readings })))
}

/// Replace every vital reading of an owner
#[utoipa::path(
    put,
    path = "/api/v1/users/{owner_id}/vitals",
    params(
        ("owner_id" = String, Path, description = "Owner of the vitals document")
    ),
    request_body = VitalsDocument,
    responses(
        (status = 200, description = "Vitals document stored", body = VitalsDocument),
        (status = 400, description = "Invalid readings", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "vitals"
)]
#[instrument(skip(service, document))]
pub async fn put_vitals(
    State(service): State<VitalsService>,
    Path(owner_id): Path<String>,
    Json(document): Json<VitalsDocument>,
) -> Result<impl IntoResponse, ErrorResponse> {
    info!("Replacing vitals for {} ({} readings)", owner_id, document.readings.len());

    let readings = service.replace_readings(&owner_id, document.readings).await?;
    Ok((StatusCode::OK, Json(VitalsDocument { readings })))
}

/// Compare the average of the latest window with the window before it
#[utoipa::path(
    get,
    path = "/api/v1/users/{owner_id}/vitals/trend",
    params(
        ("owner_id" = String, Path, description = "Owner of the vitals document"),
        VitalTrendParams
    ),
    responses(
        (status = 200, description = "Period trend; summary is null when there is not enough data", body = VitalTrendResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "vitals"
)]
#[instrument(skip(service))]
pub async fn get_vital_trend(
    State(service): State<VitalsService>,
    Path(owner_id): Path<String>,
    Query(params): Query<VitalTrendParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let vital_type = required_vital_type(params.vital_type)?;
    let period_days = params.period_days.unwrap_or(DEFAULT_PERIOD_DAYS);
    if period_days == 0 || period_days > MAX_PERIOD_DAYS {
        warn!("Rejected period of {} days", period_days);
        return Err(ErrorResponse::bad_request(&format!(
            "period_days must be between 1 and {}",
            MAX_PERIOD_DAYS
        )));
    }

    info!("Computing {}-day {} trend for {}", period_days, vital_type, owner_id);
    let summary = service.period_trend(&owner_id, &vital_type, period_days).await?;

    Ok((
        StatusCode::OK,
        Json(VitalTrendResponse {
            vital_type,
            period_days,
            summary,
        }),
    ))
}

/// Most recent readings of a vital type with point-to-point trends
#[utoipa::path(
    get,
    path = "/api/v1/users/{owner_id}/vitals/recent",
    params(
        ("owner_id" = String, Path, description = "Owner of the vitals document"),
        RecentTrendsParams
    ),
    responses(
        (status = 200, description = "Recent readings, newest first", body = RecentTrendsResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "vitals"
)]
#[instrument(skip(service))]
pub async fn get_recent_vitals(
    State(service): State<VitalsService>,
    Path(owner_id): Path<String>,
    Query(params): Query<RecentTrendsParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let vital_type = required_vital_type(params.vital_type)?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT).min(MAX_RECENT_LIMIT);

    info!("Fetching {} recent {} readings for {}", limit, vital_type, owner_id);
    let readings = service.recent_trends(&owner_id, &vital_type, limit).await?;

    Ok((StatusCode::OK, Json(RecentTrendsResponse { vital_type, readings })))
}
