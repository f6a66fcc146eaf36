use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::response::{Data, Message};
use crate::state::AppState;
use crate::users::service;

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// GET /users/me
pub async fn handle_get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Data<UserRow>>, AppError> {
    let user = service::get_by_id(&state.db, auth.id).await?;
    Ok(Json(Data { data: user }))
}

/// PUT /users/me
pub async fn handle_update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Data<UserRow>>, AppError> {
    let user = service::update(&state.db, auth.id, req.full_name, req.avatar_url).await?;
    Ok(Json(Data { data: user }))
}

/// DELETE /users/me
pub async fn handle_delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Message>, AppError> {
    service::delete(&state.db, auth.id).await?;
    Ok(Json(Message {
        message: "Account deleted successfully",
    }))
}

/// GET /users/me/stats
pub async fn handle_get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Data<Value>>, AppError> {
    let user = service::get_by_id(&state.db, auth.id).await?;
    let resume_count = service::live_resume_count(&state.db, auth.id).await?;

    Ok(Json(Data {
        data: json!({
            "resumeCount": resume_count,
            "exportCount": user.export_count,
            "storageUsedBytes": user.storage_used_bytes,
            "subscriptionTier": user.subscription_tier,
            "subscriptionStatus": user.subscription_status,
        }),
    }))
}
