use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Vitals endpoints
        crate::api::handlers::vitals::get_vitals,
        crate::api::handlers::vitals::put_vitals,
        crate::api::handlers::vitals::get_vital_trend,
        crate::api::handlers::vitals::get_recent_vitals,

        // Lab results endpoints
        crate::api::handlers::lab_results::get_lab_results,
        crate::api::handlers::lab_results::put_lab_results,
        crate::api::handlers::lab_results::get_lab_result_trends
    ),
    components(
        schemas(
            // Entities
            crate::entities::common::ErrorResponse,
            crate::entities::trends::VitalTrendResponse,
            crate::entities::trends::RecentTrendsResponse,
            crate::entities::trends::LabEntryTrendsResponse,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,

            // Domain documents
            health_records_domain::entities::Reading,
            health_records_domain::entities::VitalsDocument,
            health_records_domain::entities::LabResultEntry,
            health_records_domain::entities::LabResultLine,
            health_records_domain::entities::LabResultsDocument,
            health_records_domain::entities::LabFlag,
            health_records_domain::entities::LabStatus,

            // Trends
            health_records_domain::entities::TrendDirection,
            health_records_domain::entities::TrendResult,
            health_records_domain::entities::PeriodSummary,
            health_records_domain::entities::PairwiseTrend,
            health_records_domain::entities::LabLineTrend
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "vitals", description = "Vital sign readings and their trends"),
        (name = "lab_results", description = "Lab results and comparison with prior tests")
    ),
    info(
        title = "HealthRecords API",
        version = "0.1.0",
        description = "API for storing health records and classifying their trends",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "HealthRecords API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "vitals"));
        assert!(tags.iter().any(|tag| tag.name == "lab_results"));

        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/v1/users/{owner_id}/vitals"));
        assert!(paths.contains_key("/api/v1/users/{owner_id}/vitals/trend"));
        assert!(paths.contains_key("/api/v1/users/{owner_id}/vitals/recent"));
        assert!(paths.contains_key("/api/v1/users/{owner_id}/lab-results"));
        assert!(paths.contains_key("/api/v1/users/{owner_id}/lab-results/{entry_id}/trends"));
    }

    #[test]
    fn test_schemas_are_registered() {
        let openapi = ApiDoc::openapi();
        let schemas = &openapi.components.as_ref().unwrap().schemas;
        for name in ["ErrorResponse", "TrendResult", "PeriodSummary", "LabResultEntry", "Reading"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }
}
