use crate::handlers::{
    accounts::{get_profile, register, update_profile, update_role},
    export::export_incident,
    health::health_check,
    incidents::{
        confirm_incident, create_incident, delete_incident, edit_incident, get_incident,
        list_incidents, resolve_incident, update_status,
    },
    media::upload_media,
    statistics::get_incident_statistics,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Account and profile routes
        .route("/api/v1/accounts", post(register))
        .route("/api/v1/accounts/:account_id/profile", get(get_profile))
        .route("/api/v1/accounts/:account_id/profile", put(update_profile))
        .route("/api/v1/accounts/:account_id/role", put(update_role))
        // Incident lifecycle routes
        .route("/api/v1/incidents", post(create_incident))
        .route("/api/v1/incidents", get(list_incidents))
        .route("/api/v1/incidents/statistics", get(get_incident_statistics))
        .route("/api/v1/incidents/:incident_id", get(get_incident))
        .route("/api/v1/incidents/:incident_id", put(edit_incident))
        .route("/api/v1/incidents/:incident_id", delete(delete_incident))
        .route("/api/v1/incidents/:incident_id/status", post(update_status))
        .route(
            "/api/v1/incidents/:incident_id/confirm",
            post(confirm_incident),
        )
        .route(
            "/api/v1/incidents/:incident_id/resolve",
            post(resolve_incident),
        )
        .route(
            "/api/v1/incidents/:incident_id/media/:kind",
            post(upload_media),
        )
        .route(
            "/api/v1/incidents/:incident_id/export",
            get(export_incident),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
