use crate::auth::CurrentActor;
use crate::error::ApiError;
use crate::lifecycle;
use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

/// Per-category incident counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryStats {
    pub category: String,
    pub total: u64,
    pub resolved: u64,
    pub pending: u64,
    pub in_progress: u64,
}

/// Aggregate incident counts for the statistics view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentStats {
    /// All incidents on record, regardless of status
    pub total: u64,
    /// Incidents marked resolved
    pub solved: u64,
    /// Incidents still pending or in progress
    pub unsolved: u64,
    /// Breakdown by category, ordered by category name
    pub by_category: Vec<CategoryStats>,
}

/// Get aggregate incident statistics (chiefs, admins, superusers)
#[utoipa::path(
    get,
    path = "/api/v1/incidents/statistics",
    tag = "statistics",
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<IncidentStats>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_incident_statistics(
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<Json<ApiResponse<IncidentStats>>, ApiError> {
    let stats = lifecycle::stats(&state, &actor).await?;
    let response = ApiResponse {
        data: stats,
        message: "Statistics retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
