use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument};

use health_records_domain::entities::LabResultsDocument;
use health_records_domain::services::{create_default_lab_results_service, LabResultsServiceTrait};

use crate::entities::{ErrorResponse, LabEntryTrendsResponse};

/// Service type for dependency injection
pub type LabResultsService = Arc<dyn LabResultsServiceTrait + Send + Sync>;

/// Create a default service for the handlers to use
pub fn create_service() -> LabResultsService {
    Arc::new(create_default_lab_results_service())
}

/// Get every lab result entry of an owner
#[utoipa::path(
    get,
    path = "/api/v1/users/{owner_id}/lab-results",
    params(
        ("owner_id" = String, Path, description = "Owner of the lab results document")
    ),
    responses(
        (status = 200, description = "Lab results document", body = LabResultsDocument),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lab_results"
)]
#[instrument(skip(service))]
pub async fn get_lab_results(
    State(service): State<LabResultsService>,
    Path(owner_id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    info!("Fetching lab results for {}", owner_id);

    let entries = service.get_entries(&owner_id).await?;
    Ok((StatusCode::OK, Json(LabResultsDocument { entries })))
}

/// Replace every lab result entry of an owner
#[utoipa::path(
    put,
    path = "/api/v1/users/{owner_id}/lab-results",
    params(
        ("owner_id" = String, Path, description = "Owner of the lab results document")
    ),
    request_body = LabResultsDocument,
    responses(
        (status = 200, description = "Lab results document stored", body = LabResultsDocument),
        (status = 400, description = "Invalid entries", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lab_results"
)]
#[instrument(skip(service, document))]
pub async fn put_lab_results(
    State(service): State<LabResultsService>,
    Path(owner_id): Path<String>,
    Json(document): Json<LabResultsDocument>,
) -> Result<impl IntoResponse, ErrorResponse> {
    info!("Replacing lab results for {} ({} entries)", owner_id, document.entries.len());

    let entries = service.replace_entries(&owner_id, document.entries).await?;
    Ok((StatusCode::OK, Json(LabResultsDocument { entries })))
}

/// Trend of every result line of one entry against the prior completed test
#[utoipa::path(
    get,
    path = "/api/v1/users/{owner_id}/lab-results/{entry_id}/trends",
    params(
        ("owner_id" = String, Path, description = "Owner of the lab results document"),
        ("entry_id" = String, Path, description = "Lab result entry ID")
    ),
    responses(
        (status = 200, description = "Per-line trends; a line without history has a null trend", body = LabEntryTrendsResponse),
        (status = 404, description = "Lab result entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lab_results"
)]
#[instrument(skip(service))]
pub async fn get_lab_result_trends(
    State(service): State<LabResultsService>,
    Path((owner_id, entry_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ErrorResponse> {
    info!("Computing lab trends for entry {} of {}", entry_id, owner_id);

    let (entry, results) = service.entry_trends(&owner_id, &entry_id).await?;
    Ok((
        StatusCode::OK,
        Json(LabEntryTrendsResponse {
            entry_id: entry.id,
            test_name: entry.test_name,
            results,
        }),
    ))
}
