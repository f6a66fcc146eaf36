use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::response::Message;
use crate::state::AppState;
use crate::users;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
}

fn frontend_url(state: &AppState) -> &str {
    state.config.frontend_url.trim_end_matches('/')
}

/// POST /auth/signup
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<Value>, AppError> {
    let redirect = format!("{}/auth/confirm", frontend_url(&state));
    let payload = state
        .identity
        .sign_up(&req.email, &req.password, &req.full_name, &redirect)
        .await?;

    if let Some(user) = &payload.user {
        sqlx::query(
            "INSERT INTO users (id, email, full_name) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(user.id)
        .bind(user.email.as_deref().unwrap_or(&req.email))
        .bind(&req.full_name)
        .execute(&state.db)
        .await?;
        info!("Signed up user {}", user.id);
    }

    let requires_email_verification = payload.session.is_none()
        && payload
            .user
            .as_ref()
            .is_some_and(|u| u.email_confirmed_at.is_none());

    Ok(Json(json!({
        "user": payload.user,
        "session": payload.session,
        "requiresEmailVerification": requires_email_verification,
    })))
}

/// POST /auth/signin
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<Value>, AppError> {
    let payload = state.identity.sign_in(&req.email, &req.password).await?;

    if let Some(user) = &payload.user {
        users::service::touch_last_login(&state.db, user.id).await?;
    }

    Ok(Json(json!({
        "user": payload.user,
        "session": payload.session,
    })))
}

/// POST /auth/signout
pub async fn handle_sign_out(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Message>, AppError> {
    state.identity.sign_out(&auth.token).await?;
    Ok(Json(Message {
        message: "Signed out successfully",
    }))
}

/// POST /auth/reset-password
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Message>, AppError> {
    let redirect = format!("{}/reset-password", frontend_url(&state));
    state.identity.reset_password(&req.email, &redirect).await?;
    Ok(Json(Message {
        message: "Password reset email sent",
    }))
}

/// GET /auth/oauth/:provider
pub async fn handle_oauth_sign_in(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<Value>, AppError> {
    let redirect = format!("{}/auth/callback", frontend_url(&state));
    let url = state.identity.authorize_url(&provider, &redirect);
    Ok(Json(json!({ "url": url })))
}

/// GET /auth/oauth/callback
pub async fn handle_oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Json<Value>, AppError> {
    let payload = state.identity.exchange_code(&query.code).await?;

    if let Some(user) = &payload.user {
        users::service::ensure_exists(&state.db, user).await?;
    }

    Ok(Json(json!({
        "user": payload.user,
        "session": payload.session,
    })))
}

/// GET /auth/session
pub async fn handle_get_session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let user = users::service::ensure_exists(&state.db, &auth.user).await?;
    Ok(Json(json!({ "user": user })))
}

/// POST /auth/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<Value>, AppError> {
    let payload = state.identity.refresh(&req.refresh_token).await?;
    Ok(Json(json!({
        "user": payload.user,
        "session": payload.session,
    })))
}

/// GET /auth/sessions
///
/// The provider does not expose session enumeration, so this is always empty.
pub async fn handle_list_sessions(_auth: AuthUser) -> Json<Value> {
    Json(json!([]))
}

/// DELETE /auth/sessions/:id
pub async fn handle_revoke_session(
    _auth: AuthUser,
    Path(_id): Path<String>,
) -> Result<(), AppError> {
    Err(AppError::NotImplemented)
}
