use crate::auth::CurrentActor;
use crate::error::ApiError;
use crate::handlers::incidents::IncidentResponse;
use crate::lifecycle;
use crate::schemas::{ApiResponse, AppState};
use crate::storage::MediaKind;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Json,
};
use tracing::instrument;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Attach a media blob as evidence on an incident.
///
/// The raw request body is the blob; its file extension is derived from
/// the Content-Type header. Uploading a second blob of the same kind
/// replaces the first.
#[utoipa::path(
    post,
    path = "/api/v1/incidents/{incident_id}/media/{kind}",
    tag = "incidents",
    params(
        ("incident_id" = i32, Path, description = "Incident ID"),
        ("kind" = String, Path, description = "Media kind: image, video, audio or document"),
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Media attached successfully", body = ApiResponse<IncidentResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Unknown media kind or empty payload", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, headers, body))]
pub async fn upload_media(
    Path((incident_id, kind)): Path<(i32, String)>,
    State(state): State<AppState>,
    actor: CurrentActor,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<IncidentResponse>>, ApiError> {
    let kind: MediaKind = kind.parse().map_err(ApiError::Validation)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    let model =
        lifecycle::attach_media(&state, &actor, incident_id, kind, content_type, &body).await?;
    let response = ApiResponse {
        data: IncidentResponse::from(model),
        message: "Media attached successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
