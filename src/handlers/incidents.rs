use crate::auth::CurrentActor;
use crate::error::ApiError;
use crate::lifecycle;
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::incident::{self, IncidentStatus};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for filing a new incident report
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateIncidentRequest {
    /// Short title of the incident
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// What happened
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    /// One of: suspicious_activity, emergency, disturbance, other
    pub category: String,
    /// Where it happened
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// Request body for editing an incident's content fields.
///
/// Omitted fields are left unchanged. A location that has been set can be
/// replaced here but not cleared back to null.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateIncidentRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    /// One of: suspicious_activity, emergency, disturbance, other
    pub category: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// Request body for assigning a status directly
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of: pending, in_progress, resolved, confirmed
    pub status: String,
}

/// Request body for officer confirmation
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ConfirmRequest {
    /// Officer's response note, e.g. "dispatched patrol"
    pub response_notes: Option<String>,
}

/// Query parameters for listing incidents
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct IncidentListQuery {
    /// Restrict the listing to one status (pending, in_progress,
    /// resolved, confirmed)
    pub status: Option<String>,
}

/// References to media blobs attached as evidence
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaRefs {
    pub image: Option<String>,
    pub video: Option<String>,
    pub audio: Option<String>,
    pub document: Option<String>,
}

/// Incident response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IncidentResponse {
    pub id: i32,
    pub reporter_id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: Option<String>,
    pub time_reported: DateTime<Utc>,
    pub status: String,
    pub response_time_secs: Option<i64>,
    pub confirmed_by_id: Option<i32>,
    pub response_notes: Option<String>,
    pub media: MediaRefs,
}

impl From<incident::Model> for IncidentResponse {
    fn from(model: incident::Model) -> Self {
        Self {
            id: model.id,
            reporter_id: model.reporter_id,
            title: model.title,
            description: model.description,
            category: model.category.to_string(),
            location: model.location,
            time_reported: model.time_reported,
            status: model.status.to_string(),
            response_time_secs: model.response_time_secs,
            confirmed_by_id: model.confirmed_by_id,
            response_notes: model.response_notes,
            media: MediaRefs {
                image: model.image_ref,
                video: model.video_ref,
                audio: model.audio_ref,
                document: model.document_ref,
            },
        }
    }
}

/// File a new incident report (residents only)
#[utoipa::path(
    post,
    path = "/api/v1/incidents",
    tag = "incidents",
    request_body = CreateIncidentRequest,
    responses(
        (status = 201, description = "Incident reported successfully", body = ApiResponse<IncidentResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_incident(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(request): Json<CreateIncidentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IncidentResponse>>), ApiError> {
    let model = lifecycle::create_incident(&state, &actor, request).await?;
    let response = ApiResponse {
        data: IncidentResponse::from(model),
        message: "Your incident has been registered".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// List incidents visible to the current actor
#[utoipa::path(
    get,
    path = "/api/v1/incidents",
    tag = "incidents",
    params(IncidentListQuery),
    responses(
        (status = 200, description = "Incidents retrieved successfully", body = ApiResponse<Vec<IncidentResponse>>),
        (status = 422, description = "Invalid status filter", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_incidents(
    Query(query): Query<IncidentListQuery>,
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<Json<ApiResponse<Vec<IncidentResponse>>>, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(IncidentStatus::from_str(raw).map_err(ApiError::Validation)?),
        None => None,
    };

    let incidents = lifecycle::list_for(&state, &actor, status).await?;
    let data: Vec<IncidentResponse> = incidents.into_iter().map(IncidentResponse::from).collect();

    let response = ApiResponse {
        data,
        message: "Incidents retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a single incident
#[utoipa::path(
    get,
    path = "/api/v1/incidents/{incident_id}",
    tag = "incidents",
    params(
        ("incident_id" = i32, Path, description = "Incident ID"),
    ),
    responses(
        (status = 200, description = "Incident retrieved successfully", body = ApiResponse<IncidentResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_incident(
    Path(incident_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<Json<ApiResponse<IncidentResponse>>, ApiError> {
    let model = lifecycle::fetch_for(&state, &actor, incident_id).await?;
    let response = ApiResponse {
        data: IncidentResponse::from(model),
        message: "Incident retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Edit an incident's content fields
#[utoipa::path(
    put,
    path = "/api/v1/incidents/{incident_id}",
    tag = "incidents",
    params(
        ("incident_id" = i32, Path, description = "Incident ID"),
    ),
    request_body = UpdateIncidentRequest,
    responses(
        (status = 200, description = "Incident updated successfully", body = ApiResponse<IncidentResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn edit_incident(
    Path(incident_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(request): Json<UpdateIncidentRequest>,
) -> Result<Json<ApiResponse<IncidentResponse>>, ApiError> {
    let model = lifecycle::edit_incident(&state, &actor, incident_id, request).await?;
    let response = ApiResponse {
        data: IncidentResponse::from(model),
        message: "Incident updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Assign an incident status directly (officers, admins, superusers)
#[utoipa::path(
    post,
    path = "/api/v1/incidents/{incident_id}/status",
    tag = "incidents",
    params(
        ("incident_id" = i32, Path, description = "Incident ID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated successfully", body = ApiResponse<IncidentResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Unknown status", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_status(
    Path(incident_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<IncidentResponse>>, ApiError> {
    let model = lifecycle::update_status(&state, &actor, incident_id, &request.status).await?;
    let response = ApiResponse {
        data: IncidentResponse::from(model),
        message: "Status updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Officer confirmation of a pending incident
#[utoipa::path(
    post,
    path = "/api/v1/incidents/{incident_id}/confirm",
    tag = "incidents",
    params(
        ("incident_id" = i32, Path, description = "Incident ID"),
    ),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Incident confirmed", body = ApiResponse<IncidentResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::schemas::ErrorResponse),
        (status = 409, description = "Incident is not pending", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn confirm_incident(
    Path(incident_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ApiResponse<IncidentResponse>>, ApiError> {
    let model =
        lifecycle::confirm_incident(&state, &actor, incident_id, request.response_notes).await?;
    let response = ApiResponse {
        data: IncidentResponse::from(model),
        message: "Incident confirmed".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Mark an incident resolved (idempotent)
#[utoipa::path(
    post,
    path = "/api/v1/incidents/{incident_id}/resolve",
    tag = "incidents",
    params(
        ("incident_id" = i32, Path, description = "Incident ID"),
    ),
    responses(
        (status = 200, description = "Incident resolved", body = ApiResponse<IncidentResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn resolve_incident(
    Path(incident_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<Json<ApiResponse<IncidentResponse>>, ApiError> {
    let model = lifecycle::resolve_incident(&state, &actor, incident_id).await?;
    let response = ApiResponse {
        data: IncidentResponse::from(model),
        message: "Incident resolved".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Delete a pending incident and its attached media
#[utoipa::path(
    delete,
    path = "/api/v1/incidents/{incident_id}",
    tag = "incidents",
    params(
        ("incident_id" = i32, Path, description = "Incident ID"),
    ),
    responses(
        (status = 200, description = "Incident deleted successfully", body = ApiResponse<String>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::schemas::ErrorResponse),
        (status = 409, description = "Incident is not pending", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_incident(
    Path(incident_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    lifecycle::delete_incident(&state, &actor, incident_id).await?;
    let response = ApiResponse {
        data: format!("Incident {incident_id} deleted"),
        message: "Incident deleted successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
