//! `/api/user/*` handlers, backed by the profile store.

use crate::auth::AuthUser;
use crate::http::error::ApiError;
use crate::state::AppState;
use aq_db::models::{ProfilePatch, UserProfile};
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn get_profile_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .profiles
        .get_profile(&user.user_id)
        .map_err(|e| ApiError::store("Server error loading profile", e))?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(ProfileResponse {
        message: None,
        user: profile,
    }))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<Value>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let patch = ProfilePatch::from_json(&body).map_err(ApiError::Validation)?;
    let profile = state
        .profiles
        .upsert_profile(&user.user_id, patch)
        .map_err(|e| ApiError::store("Server error updating profile", e))?;
    log::info!("updated profile for {}", user.user_id);
    Ok(Json(ProfileResponse {
        message: Some("Profile updated successfully"),
        user: profile,
    }))
}

pub async fn delete_account_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let existed = state
        .profiles
        .delete_profile(&user.user_id)
        .map_err(|e| ApiError::store("Server error deleting account", e))?;
    log::info!("deleted account {} (existed={})", user.user_id, existed);
    Ok(Json(MessageResponse {
        message: "Account deleted successfully",
    }))
}
