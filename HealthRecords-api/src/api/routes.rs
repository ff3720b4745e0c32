use axum::{
    extract::FromRef,
    http::HeaderValue,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::api::handlers::health::{self, AppEnvironment, HealthService};
use crate::api::handlers::lab_results::{self, LabResultsService};
use crate::api::handlers::vitals::{self, VitalsService};
use crate::config::AppConfig;
use crate::openapi::configure_swagger_routes;

/// Shared state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub vitals: VitalsService,
    pub lab_results: LabResultsService,
    pub health: HealthService,
    pub environment: AppEnvironment,
}

impl AppState {
    /// State backed by the default domain services
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            vitals: vitals::create_service(),
            lab_results: lab_results::create_service(),
            health: health::create_health_service(),
            environment: AppEnvironment(config.environment.clone()),
        }
    }
}

/// Create the application router
pub fn create_app(config: &AppConfig) -> Router {
    debug!("Creating application router");

    let state = AppState::from_config(config);
    create_app_with_state(state, config.cors_allow_origin.clone())
}

/// Create the application router around an explicit state
pub fn create_app_with_state(state: AppState, cors_allow_origin: Option<HeaderValue>) -> Router {
    let api_routes = Router::new()
        .route(
            "/users/:owner_id/vitals",
            get(vitals::get_vitals).put(vitals::put_vitals),
        )
        .route("/users/:owner_id/vitals/trend", get(vitals::get_vital_trend))
        .route("/users/:owner_id/vitals/recent", get(vitals::get_recent_vitals))
        .route(
            "/users/:owner_id/lab-results",
            get(lab_results::get_lab_results).put(lab_results::put_lab_results),
        )
        .route(
            "/users/:owner_id/lab-results/:entry_id/trends",
            get(lab_results::get_lab_result_trends),
        );

    debug!("API routes configured");

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .with_state(state);

    // Configure the Swagger UI using the helper function
    let app = add_swagger_ui(app);
    debug!("Swagger UI merged");

    // Initialize health check service startup time
    health::initialize_server_start_time();

    app.layer(cors_layer(cors_allow_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(cors_allow_origin: Option<HeaderValue>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match cors_allow_origin {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    // Get Swagger UI routes
    let swagger = configure_swagger_routes();

    // Merge Swagger UI with the app router
    app.merge(swagger)
}
