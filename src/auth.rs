use crate::error::ApiError;
use crate::schemas::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use model::entities::{profile, user};
use policy::Actor;
use sea_orm::EntityTrait;
use std::ops::Deref;

/// Header carrying the authenticated account id, asserted by the upstream
/// identity proxy. Credential verification and session handling live there,
/// not here.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// The resolved actor for the current request: account identity plus role
/// profile, ready for policy checks.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl Deref for CurrentActor {
    type Target = Actor;

    fn deref(&self) -> &Actor {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACCOUNT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthenticated("Authentication required.".to_string()))?;

        let account_id: i32 = raw
            .trim()
            .parse()
            .map_err(|_| ApiError::Unauthenticated("Invalid account identity.".to_string()))?;

        let account = user::Entity::find_by_id(account_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("Unknown account.".to_string()))?;

        let role_profile = profile::Entity::find_by_id(account_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("Account has no role profile.".to_string()))?;

        Ok(CurrentActor(Actor {
            account_id: account.id,
            role: role_profile.role,
            is_superuser: account.is_superuser,
        }))
    }
}
