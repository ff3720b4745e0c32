//! Domain layer health check functionality
//! This module provides health check services for the application

use async_trait::async_trait;
use health_records_data::database;
use std::collections::HashMap;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced capability
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Outcome of probing the document store
#[derive(Debug, Clone, PartialEq)]
pub enum StorageStatus {
    /// The SQLite pool answered
    Database(String),
    /// No pool is configured; documents live in process memory
    InMemoryFallback,
    /// The pool exists but could not hand out a connection
    Failed(String),
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Probe the document store
    async fn check_storage_status(&self) -> StorageStatus;
}

/// Health service backed by the global database pool
#[derive(Debug, Default, Clone)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        build_system_health(self.check_storage_status().await)
    }

    async fn check_storage_status(&self) -> StorageStatus {
        check_storage_status().await
    }
}

/// Check whether documents are being persisted to the database
pub async fn check_storage_status() -> StorageStatus {
    storage_status_from(database::get_connection_info())
}

/// Map the pool probe onto a storage status; `None` means no pool exists
pub fn storage_status_from(info: Option<Result<String, String>>) -> StorageStatus {
    match info {
        Some(Ok(info)) => StorageStatus::Database(info),
        Some(Err(reason)) => StorageStatus::Failed(reason),
        None => StorageStatus::InMemoryFallback,
    }
}

/// Get overall system health
pub async fn get_system_health() -> SystemHealth {
    build_system_health(check_storage_status().await)
}

/// Map a storage probe onto component and system status.
///
/// The in-memory fallback keeps every endpoint working, so it only degrades
/// the system. A pool that cannot hand out connections makes writes fail.
pub fn build_system_health(storage: StorageStatus) -> SystemHealth {
    let storage_component = match storage {
        StorageStatus::Database(info) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some(info),
        },
        StorageStatus::InMemoryFallback => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("Database pool not initialized, using in-memory storage".to_string()),
        },
        StorageStatus::Failed(reason) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(reason),
        },
    };

    let overall_status = match storage_component.status {
        ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        ComponentStatus::Degraded => SystemStatus::Degraded,
        ComponentStatus::Healthy => SystemStatus::Healthy,
    };

    SystemHealth {
        status: overall_status,
        components: vec![("storage".to_string(), storage_component)].into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_system_health() {
        let health = HealthService::new().get_system_health().await;
        // Status depends on whether another test initialized the pool
        assert!(health.components.contains_key("storage"));
        assert_ne!(health.status, SystemStatus::Unhealthy);
    }

    #[test]
    fn test_storage_status_follows_probe_outcome() {
        assert_eq!(storage_status_from(None), StorageStatus::InMemoryFallback);
        assert_eq!(
            storage_status_from(Some(Ok("SQLite database at data/x.db".to_string()))),
            StorageStatus::Database("SQLite database at data/x.db".to_string())
        );
        // The wording of a failure does not matter, only that it failed
        assert_eq!(
            storage_status_from(Some(Err("pool unhealthy".to_string()))),
            StorageStatus::Failed("pool unhealthy".to_string())
        );
    }

    #[test]
    fn test_in_memory_fallback_is_degraded() {
        let health = build_system_health(StorageStatus::InMemoryFallback);
        assert_eq!(health.status, SystemStatus::Degraded);
        assert_eq!(health.components["storage"].status, ComponentStatus::Degraded);
    }

    #[test]
    fn test_database_is_healthy() {
        let health = build_system_health(StorageStatus::Database("SQLite database at x".to_string()));
        assert_eq!(health.status, SystemStatus::Healthy);
    }

    #[test]
    fn test_failed_pool_is_unhealthy() {
        let health = build_system_health(StorageStatus::Failed("SQLite connection error: busy".to_string()));
        assert_eq!(health.status, SystemStatus::Unhealthy);
        assert_eq!(
            health.components["storage"].details.as_deref(),
            Some("SQLite connection error: busy")
        );
    }
}
