use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use health_records_domain::health::{
    ComponentStatus as DomainComponentStatus, HealthService as DomainHealthService, HealthServiceTrait, SystemStatus,
};

/// Service type for dependency injection
pub type HealthService = Arc<dyn HealthServiceTrait>;

/// Deployment environment reported by the health check
#[derive(Debug, Clone)]
pub struct AppEnvironment(pub String);

/// Health check response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Status of each system component, keyed by name
    pub components: BTreeMap<String, ComponentHealthStatus>,
    /// Environment information
    pub environment: String,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Track the time when the server started using a thread-safe OnceCell
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// Initialize the server start time
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let _ = SERVER_START_TIME.set(unix_now());
    });
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy or running on in-memory storage", body = HealthResponse),
        (status = 503, description = "API is not healthy", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service, environment))]
pub async fn health_check(
    State(health_service): State<HealthService>,
    State(environment): State<AppEnvironment>,
) -> impl IntoResponse {
    info!("Health check requested");

    let now = unix_now();
    let uptime = SERVER_START_TIME.get().map(|&start_time| now.saturating_sub(start_time));

    let system_health = health_service.get_system_health().await;

    let overall_status = match system_health.status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    };

    let components = system_health
        .components
        .into_iter()
        .map(|(name, component)| {
            (
                name,
                ComponentHealthStatus {
                    status: map_component_status(&component.status),
                    message: component.details,
                },
            )
        })
        .collect();

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components,
        environment: environment.0,
    };

    // Degraded still serves every request from in-memory storage
    match system_health.status {
        SystemStatus::Unhealthy => {
            warn!("Health check reports an unhealthy system");
            (StatusCode::SERVICE_UNAVAILABLE, Json(response))
        }
        _ => (StatusCode::OK, Json(response)),
    }
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}

/// Factory function to create a health service
pub fn create_health_service() -> HealthService {
    Arc::new(DomainHealthService::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use health_records_domain::health::{build_system_health, StorageStatus, SystemHealth};

    #[derive(Debug)]
    struct FixedHealthService(StorageStatus);

    #[async_trait]
    impl HealthServiceTrait for FixedHealthService {
        async fn get_system_health(&self) -> SystemHealth {
            build_system_health(self.0.clone())
        }

        async fn check_storage_status(&self) -> StorageStatus {
            self.0.clone()
        }
    }

    async fn call(storage: StorageStatus) -> (StatusCode, HealthResponse) {
        initialize_server_start_time();
        let service: HealthService = Arc::new(FixedHealthService(storage));
        let response = health_check(State(service), State(AppEnvironment("test".to_string())))
            .await
            .into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_healthy_database() {
        let (status, body) = call(StorageStatus::Database("SQLite database at x".into())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.environment, "test");
        assert_eq!(body.components["storage"].status, "ok");
        assert!(body.uptime.is_some());
    }

    #[tokio::test]
    async fn test_in_memory_fallback_is_still_ok() {
        let (status, body) = call(StorageStatus::InMemoryFallback).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.components["storage"].status, "degraded");
    }

    #[tokio::test]
    async fn test_failed_storage_is_unavailable() {
        let (status, body) = call(StorageStatus::Failed("SQLite connection error".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "error");
        assert_eq!(
            body.components["storage"].message.as_deref(),
            Some("SQLite connection error")
        );
    }
}
