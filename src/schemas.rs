use crate::handlers::statistics::IncidentStats;
use crate::storage::MediaStore;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for the statistics projection, invalidated on mutation
    pub cache: Cache<String, CachedData>,
    /// Blob store holding attached incident media
    pub media: Arc<dyn MediaStore>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Stats(IncidentStats),
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::accounts::register,
        crate::handlers::accounts::get_profile,
        crate::handlers::accounts::update_profile,
        crate::handlers::accounts::update_role,
        crate::handlers::incidents::create_incident,
        crate::handlers::incidents::list_incidents,
        crate::handlers::incidents::get_incident,
        crate::handlers::incidents::edit_incident,
        crate::handlers::incidents::update_status,
        crate::handlers::incidents::confirm_incident,
        crate::handlers::incidents::resolve_incident,
        crate::handlers::incidents::delete_incident,
        crate::handlers::statistics::get_incident_statistics,
        crate::handlers::media::upload_media,
        crate::handlers::export::export_incident,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::incidents::IncidentResponse>,
            ApiResponse<Vec<crate::handlers::incidents::IncidentResponse>>,
            ApiResponse<crate::handlers::accounts::ProfileResponse>,
            ApiResponse<IncidentStats>,
            ApiResponse<String>,
            ErrorResponse,
            HealthResponse,
            crate::handlers::accounts::RegisterRequest,
            crate::handlers::accounts::UpdateProfileRequest,
            crate::handlers::accounts::UpdateRoleRequest,
            crate::handlers::accounts::ProfileResponse,
            crate::handlers::incidents::CreateIncidentRequest,
            crate::handlers::incidents::UpdateIncidentRequest,
            crate::handlers::incidents::UpdateStatusRequest,
            crate::handlers::incidents::ConfirmRequest,
            crate::handlers::incidents::IncidentResponse,
            crate::handlers::incidents::MediaRefs,
            IncidentStats,
            crate::handlers::statistics::CategoryStats,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "accounts", description = "Account registration and role profiles"),
        (name = "incidents", description = "Incident reporting and lifecycle endpoints"),
        (name = "statistics", description = "Incident statistics endpoints"),
    ),
    info(
        title = "Ulinzi API",
        description = "Community incident reporting and tracking system",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
