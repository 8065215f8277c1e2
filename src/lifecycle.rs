//! Incident lifecycle controller.
//!
//! Every operation here follows the same shape: load the current incident
//! state, consult the policy engine, then mutate. No handler writes to the
//! incident store without passing through these functions, so there is no
//! window where a mutation happens before the policy check.
//!
//! Each operation is a single logical unit of work; concurrent status
//! updates on the same record serialize at the store with last-write-wins
//! (no version check; a known, accepted race).

use crate::error::ApiError;
use crate::handlers::incidents::{CreateIncidentRequest, UpdateIncidentRequest};
use crate::handlers::statistics::{CategoryStats, IncidentStats};
use crate::schemas::{AppState, CachedData};
use crate::storage::MediaKind;
use chrono::Utc;
use model::entities::incident::{self, IncidentStatus};
use policy::{Action, Actor, IncidentFacts};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{info, warn};
use validator::Validate;

const STATS_CACHE_KEY: &str = "incident_stats";

fn facts_of(model: &incident::Model) -> IncidentFacts {
    IncidentFacts {
        reporter_id: model.reporter_id,
        status: model.status,
    }
}

async fn find(state: &AppState, incident_id: i32) -> Result<incident::Model, ApiError> {
    incident::Entity::find_by_id(incident_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Incident {incident_id} not found.")))
}

fn invalidate_stats(state: &AppState) {
    state.cache.invalidate_all();
}

/// Seconds elapsed since the incident was reported. Recorded once, on the
/// first transition into confirmed or resolved; analytics only.
fn elapsed_response_secs(model: &incident::Model) -> i64 {
    (Utc::now() - model.time_reported).num_seconds().max(0)
}

/// Create a new incident report. Residents only; the report starts out
/// pending with the server clock as its report time.
pub async fn create_incident(
    state: &AppState,
    actor: &Actor,
    request: CreateIncidentRequest,
) -> Result<incident::Model, ApiError> {
    policy::can(actor, Action::Report, None)?;
    request.validate()?;
    let category = incident::Category::from_str(&request.category).map_err(ApiError::Validation)?;

    let new_incident = incident::ActiveModel {
        reporter_id: Set(actor.account_id),
        title: Set(request.title),
        description: Set(request.description),
        category: Set(category),
        location: Set(request.location),
        time_reported: Set(Utc::now()),
        status: Set(IncidentStatus::Pending),
        ..Default::default()
    };

    let model = new_incident.insert(&state.db).await?;
    invalidate_stats(state);
    info!(
        "Incident {} ({}) reported by account {}",
        model.id, model.category, actor.account_id
    );
    Ok(model)
}

/// List incidents visible to the actor: view-all roles see everything,
/// everyone else sees only their own reports. Ordering is most recent
/// first with id as a tie-break, so pagination stays deterministic.
pub async fn list_for(
    state: &AppState,
    actor: &Actor,
    status: Option<IncidentStatus>,
) -> Result<Vec<incident::Model>, ApiError> {
    let mut query = incident::Entity::find();

    if policy::can(actor, Action::ViewAll, None).is_err() {
        query = query.filter(incident::Column::ReporterId.eq(actor.account_id));
    }
    if let Some(status) = status {
        query = query.filter(incident::Column::Status.eq(status));
    }

    let incidents = query
        .order_by_desc(incident::Column::TimeReported)
        .order_by_desc(incident::Column::Id)
        .all(&state.db)
        .await?;
    Ok(incidents)
}

/// Fetch a single incident the actor is allowed to see.
pub async fn fetch_for(
    state: &AppState,
    actor: &Actor,
    incident_id: i32,
) -> Result<incident::Model, ApiError> {
    let model = find(state, incident_id).await?;
    if policy::can(actor, Action::ViewAll, None).is_ok() {
        return Ok(model);
    }
    policy::can(actor, Action::ViewOwn, Some(&facts_of(&model)))?;
    Ok(model)
}

/// Edit an incident's content fields. The reporter, report time, and
/// status are not reachable through this path.
pub async fn edit_incident(
    state: &AppState,
    actor: &Actor,
    incident_id: i32,
    request: UpdateIncidentRequest,
) -> Result<incident::Model, ApiError> {
    let existing = find(state, incident_id).await?;
    policy::can(actor, Action::Edit, Some(&facts_of(&existing)))?;
    request.validate()?;

    let unchanged = existing.clone();
    let mut active: incident::ActiveModel = existing.into();
    let mut dirty = false;

    if let Some(title) = request.title {
        active.title = Set(title);
        dirty = true;
    }
    if let Some(description) = request.description {
        active.description = Set(description);
        dirty = true;
    }
    if let Some(category) = request.category {
        let category = incident::Category::from_str(&category).map_err(ApiError::Validation)?;
        active.category = Set(category);
        dirty = true;
    }
    if let Some(location) = request.location {
        active.location = Set(Some(location));
        dirty = true;
    }

    if !dirty {
        return Ok(unchanged);
    }

    let updated = active.update(&state.db).await?;
    invalidate_stats(state);
    info!("Incident {} edited by account {}", updated.id, actor.account_id);
    Ok(updated)
}

/// Assign a status directly. Any defined status value is assignable,
/// including backward moves (resolved back to pending); the original
/// system behaves this way and the permissiveness is kept deliberately.
pub async fn update_status(
    state: &AppState,
    actor: &Actor,
    incident_id: i32,
    new_status: &str,
) -> Result<incident::Model, ApiError> {
    let existing = find(state, incident_id).await?;
    policy::can(actor, Action::UpdateStatus, Some(&facts_of(&existing)))?;
    let status = IncidentStatus::from_str(new_status).map_err(ApiError::Validation)?;

    let mut active: incident::ActiveModel = existing.clone().into();
    active.status = Set(status);
    if matches!(status, IncidentStatus::Resolved | IncidentStatus::Confirmed)
        && existing.response_time_secs.is_none()
    {
        active.response_time_secs = Set(Some(elapsed_response_secs(&existing)));
    }

    let updated = active.update(&state.db).await?;
    invalidate_stats(state);
    info!(
        "Incident {} status set to {} by account {}",
        updated.id, updated.status, actor.account_id
    );
    Ok(updated)
}

/// Officer confirmation of a pending report: records the confirming
/// officer and their response note, then parks the incident in the
/// confirmed terminal branch.
pub async fn confirm_incident(
    state: &AppState,
    actor: &Actor,
    incident_id: i32,
    note: Option<String>,
) -> Result<incident::Model, ApiError> {
    let existing = find(state, incident_id).await?;
    policy::can(actor, Action::Confirm, Some(&facts_of(&existing)))?;

    if existing.status != IncidentStatus::Pending {
        return Err(ApiError::InvalidState(format!(
            "Only pending incidents can be confirmed; incident {} is {}.",
            existing.id, existing.status
        )));
    }

    let mut active: incident::ActiveModel = existing.clone().into();
    active.status = Set(IncidentStatus::Confirmed);
    active.confirmed_by_id = Set(Some(actor.account_id));
    active.response_notes = Set(note);
    if existing.response_time_secs.is_none() {
        active.response_time_secs = Set(Some(elapsed_response_secs(&existing)));
    }

    let updated = active.update(&state.db).await?;
    invalidate_stats(state);
    info!(
        "Incident {} confirmed by officer account {}",
        updated.id, actor.account_id
    );
    Ok(updated)
}

/// Mark an incident resolved. Calling this on an already-resolved incident
/// is a no-op success, not an error.
pub async fn resolve_incident(
    state: &AppState,
    actor: &Actor,
    incident_id: i32,
) -> Result<incident::Model, ApiError> {
    let existing = find(state, incident_id).await?;
    policy::can(actor, Action::Resolve, Some(&facts_of(&existing)))?;

    if existing.status == IncidentStatus::Resolved {
        return Ok(existing);
    }

    let mut active: incident::ActiveModel = existing.clone().into();
    active.status = Set(IncidentStatus::Resolved);
    if existing.response_time_secs.is_none() {
        active.response_time_secs = Set(Some(elapsed_response_secs(&existing)));
    }

    let updated = active.update(&state.db).await?;
    invalidate_stats(state);
    info!(
        "Incident {} resolved by officer account {}",
        updated.id, actor.account_id
    );
    Ok(updated)
}

/// Permanently remove an incident and its attached media. Deletion is only
/// valid while the report is still pending, for everyone: privileged
/// actors past that point get an invalid-state error rather than a
/// silent removal of triaged history.
pub async fn delete_incident(
    state: &AppState,
    actor: &Actor,
    incident_id: i32,
) -> Result<(), ApiError> {
    let existing = find(state, incident_id).await?;
    policy::can(actor, Action::Delete, Some(&facts_of(&existing)))?;

    if existing.status != IncidentStatus::Pending {
        return Err(ApiError::InvalidState(format!(
            "Only pending incidents can be deleted; incident {} is {}.",
            existing.id, existing.status
        )));
    }

    // Blob removal is best-effort: an orphaned file is an accepted
    // inconsistency, a dangling row is not.
    for reference in [
        &existing.image_ref,
        &existing.video_ref,
        &existing.audio_ref,
        &existing.document_ref,
    ]
    .into_iter()
    .flatten()
    {
        if let Err(e) = state.media.delete(reference).await {
            warn!("Failed to remove media blob {}: {}", reference, e);
        }
    }

    incident::Entity::delete_by_id(incident_id)
        .exec(&state.db)
        .await?;
    invalidate_stats(state);
    info!("Incident {} deleted by account {}", incident_id, actor.account_id);
    Ok(())
}

/// Attach (or replace) a media blob on an incident. The blob write and the
/// row update are not transactional; a stored blob whose reference never
/// lands on the row is an accepted inconsistency window.
pub async fn attach_media(
    state: &AppState,
    actor: &Actor,
    incident_id: i32,
    kind: MediaKind,
    content_type: &str,
    bytes: &[u8],
) -> Result<incident::Model, ApiError> {
    let existing = find(state, incident_id).await?;
    policy::can(actor, Action::Edit, Some(&facts_of(&existing)))?;

    if bytes.is_empty() {
        return Err(ApiError::Validation("Media payload is empty.".to_string()));
    }

    let reference = state.media.put(kind, content_type, bytes).await?;

    let previous = match kind {
        MediaKind::Image => existing.image_ref.clone(),
        MediaKind::Video => existing.video_ref.clone(),
        MediaKind::Audio => existing.audio_ref.clone(),
        MediaKind::Document => existing.document_ref.clone(),
    };

    let mut active: incident::ActiveModel = existing.into();
    match kind {
        MediaKind::Image => active.image_ref = Set(Some(reference.clone())),
        MediaKind::Video => active.video_ref = Set(Some(reference.clone())),
        MediaKind::Audio => active.audio_ref = Set(Some(reference.clone())),
        MediaKind::Document => active.document_ref = Set(Some(reference.clone())),
    }
    let updated = active.update(&state.db).await?;

    if let Some(old) = previous {
        if old != reference {
            if let Err(e) = state.media.delete(&old).await {
                warn!("Failed to remove replaced media blob {}: {}", old, e);
            }
        }
    }

    info!(
        "Incident {} got {} evidence from account {} ({})",
        updated.id, kind, actor.account_id, reference
    );
    Ok(updated)
}

/// Aggregate counts over all incidents: total/solved/unsolved plus a
/// per-category breakdown, ordered by category name. Read-only; cached
/// until the next mutation.
pub async fn stats(state: &AppState, actor: &Actor) -> Result<IncidentStats, ApiError> {
    policy::can(actor, Action::ViewStats, None)?;

    if let Some(CachedData::Stats(cached)) = state.cache.get(STATS_CACHE_KEY).await {
        return Ok(cached);
    }

    let incidents = incident::Entity::find().all(&state.db).await?;

    let mut by_category: BTreeMap<String, CategoryStats> = BTreeMap::new();
    let mut pending = 0u64;
    let mut in_progress = 0u64;
    let mut resolved = 0u64;

    for model in &incidents {
        let entry = by_category
            .entry(model.category.to_string())
            .or_insert_with(|| CategoryStats {
                category: model.category.to_string(),
                total: 0,
                resolved: 0,
                pending: 0,
                in_progress: 0,
            });
        entry.total += 1;
        match model.status {
            IncidentStatus::Pending => {
                entry.pending += 1;
                pending += 1;
            }
            IncidentStatus::InProgress => {
                entry.in_progress += 1;
                in_progress += 1;
            }
            IncidentStatus::Resolved => {
                entry.resolved += 1;
                resolved += 1;
            }
            IncidentStatus::Confirmed => {}
        }
    }

    let collected = IncidentStats {
        total: incidents.len() as u64,
        solved: resolved,
        unsolved: pending + in_progress,
        by_category: by_category.into_values().collect(),
    };

    state
        .cache
        .insert(STATS_CACHE_KEY.to_string(), CachedData::Stats(collected.clone()))
        .await;
    Ok(collected)
}
