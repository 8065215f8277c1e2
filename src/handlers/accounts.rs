use crate::auth::CurrentActor;
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::profile::{self, Role, CONTACT_NUMBER_LEN};
use model::entities::user;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for registering a new account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    /// Contact number (exactly 10 digits when present)
    pub contact_number: Option<String>,
    /// Free-text location
    #[validate(length(max = 100))]
    pub location: Option<String>,
}

/// Request body for updating the non-role profile fields.
///
/// Omitted fields are left unchanged. A contact number or location that has
/// been set can be replaced here but not cleared back to null.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    /// Contact number (exactly 10 digits when present)
    pub contact_number: Option<String>,
    /// Free-text location
    #[validate(length(max = 100))]
    pub location: Option<String>,
}

/// Request body for assigning a role to an account
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// One of: resident, authority, officer, chief, admin
    pub role: String,
}

/// Account + profile response model
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub account_id: i32,
    pub username: String,
    pub role: String,
    pub is_superuser: bool,
    pub contact_number: Option<String>,
    pub location: Option<String>,
}

impl ProfileResponse {
    fn from_models(account: user::Model, role_profile: profile::Model) -> Self {
        Self {
            account_id: account.id,
            username: account.username,
            role: role_profile.role.to_string(),
            is_superuser: account.is_superuser,
            contact_number: role_profile.contact_number,
            location: role_profile.location,
        }
    }
}

fn validate_contact_number(value: &Option<String>) -> Result<(), ApiError> {
    if let Some(number) = value {
        let valid = number.len() == CONTACT_NUMBER_LEN && number.chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(ApiError::Validation(
                "Phone number must be exactly 10 digits.".to_string(),
            ));
        }
    }
    Ok(())
}

fn map_insert_error(err: DbErr, username: &str) -> ApiError {
    let message = err.to_string().to_lowercase();
    if message.contains("unique") || message.contains("constraint") {
        ApiError::Validation(format!("Username '{username}' already exists."))
    } else {
        ApiError::Database(err)
    }
}

/// Register a new account.
///
/// The account and its resident profile are created in one database
/// transaction; profile creation is an explicit step of registration,
/// not a side effect. Roles other than resident are assigned afterwards
/// through the admin-gated role endpoint (or the CLI bootstrap).
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account registered successfully", body = ApiResponse<ProfileResponse>),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileResponse>>), ApiError> {
    debug!("Registering account with username: {}", request.username);
    request.validate()?;
    validate_contact_number(&request.contact_number)?;

    let txn = state.db.begin().await?;

    let account = user::ActiveModel {
        username: Set(request.username.clone()),
        is_superuser: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| map_insert_error(e, &request.username))?;

    let role_profile = profile::ActiveModel {
        account_id: Set(account.id),
        role: Set(Role::Resident),
        contact_number: Set(request.contact_number),
        location: Set(request.location),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "Account registered: {} (id {}, role {})",
        account.username, account.id, role_profile.role
    );
    let response = ApiResponse {
        data: ProfileResponse::from_models(account, role_profile),
        message: "Account registered successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

async fn load_account(
    state: &AppState,
    account_id: i32,
) -> Result<(user::Model, profile::Model), ApiError> {
    let account = user::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Account {account_id} not found.")))?;
    let role_profile = profile::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile for account {account_id} not found.")))?;
    Ok((account, role_profile))
}

/// Get an account's profile
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/profile",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_profile(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    // Same visibility as editing: the holder, or an admin/superuser.
    policy::can_update_profile(&actor, account_id)?;
    let (account, role_profile) = load_account(&state, account_id).await?;

    let response = ApiResponse {
        data: ProfileResponse::from_models(account, role_profile),
        message: "Profile retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update the non-role profile fields.
///
/// The role is deliberately unreachable here; it has its own
/// admin-gated endpoint.
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{account_id}/profile",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<ProfileResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_profile(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    policy::can_update_profile(&actor, account_id)?;
    request.validate()?;
    validate_contact_number(&request.contact_number)?;

    let (account, role_profile) = load_account(&state, account_id).await?;

    let mut active: profile::ActiveModel = role_profile.into();
    if let Some(contact_number) = request.contact_number {
        active.contact_number = Set(Some(contact_number));
    }
    if let Some(location) = request.location {
        active.location = Set(Some(location));
    }

    let updated = active.update(&state.db).await?;
    info!("Profile for account {} updated by account {}", account_id, actor.account_id);

    let response = ApiResponse {
        data: ProfileResponse::from_models(account, updated),
        message: "Profile updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Assign a role to an account. Admin/superuser only; an admin never
/// changes their own role.
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{account_id}/role",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated successfully", body = ApiResponse<ProfileResponse>),
        (status = 403, description = "Not authorized", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Unknown role", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_role(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    policy::can_assign_role(&actor, account_id)?;
    let role = Role::from_str(&request.role).map_err(ApiError::Validation)?;

    let (account, role_profile) = load_account(&state, account_id).await?;
    if role_profile.role == role {
        warn!(
            "Account {} already has role {}; nothing to do",
            account_id, role
        );
        let response = ApiResponse {
            data: ProfileResponse::from_models(account, role_profile),
            message: "Role unchanged".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    let mut active: profile::ActiveModel = role_profile.into();
    active.role = Set(role);
    let updated = active.update(&state.db).await?;

    info!(
        "Account {} role set to {} by account {}",
        account_id, role, actor.account_id
    );
    let response = ApiResponse {
        data: ProfileResponse::from_models(account, updated),
        message: "Role updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
