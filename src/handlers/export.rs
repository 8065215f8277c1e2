use crate::auth::CurrentActor;
use crate::error::ApiError;
use crate::lifecycle;
use crate::schemas::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use model::entities::{incident, user};
use sea_orm::EntityTrait;
use std::fmt::Write as _;
use tracing::instrument;

fn render_report(model: &incident::Model, reporter_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Incident Report: {}", model.title);
    let _ = writeln!(out);
    let _ = writeln!(out, "Reporter: {reporter_name}");
    let _ = writeln!(out, "Category: {}", model.category);
    let _ = writeln!(out, "Status: {}", model.status);
    let _ = writeln!(
        out,
        "Location: {}",
        model.location.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(
        out,
        "Time Reported: {}",
        model.time_reported.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Description:");
    let _ = writeln!(out, "{}", model.description);
    if let Some(notes) = model.response_notes.as_deref() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Response Notes:");
        let _ = writeln!(out, "{notes}");
    }
    out
}

/// Export an incident as a downloadable plain-text report
#[utoipa::path(
    get,
    path = "/api/v1/incidents/{incident_id}/export",
    tag = "incidents",
    params(
        ("incident_id" = i32, Path, description = "Incident ID"),
    ),
    responses(
        (status = 200, description = "Report rendered", content_type = "text/plain"),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn export_incident(
    Path(incident_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<impl IntoResponse, ApiError> {
    let model = lifecycle::fetch_for(&state, &actor, incident_id).await?;

    let reporter_name = user::Entity::find_by_id(model.reporter_id)
        .one(&state.db)
        .await?
        .map(|account| account.username)
        .unwrap_or_else(|| format!("account {}", model.reporter_id));

    let body = render_report(&model, &reporter_name);
    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=incident_{incident_id}.txt"),
        ),
    ];
    Ok((headers, body))
}
