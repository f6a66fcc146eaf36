use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::response::{Data, Message};
use crate::sharing::service::{self, Analytics, PublicResume, ShareResult};
use crate::state::AppState;

/// POST /resumes/:id/share
pub async fn handle_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Data<ShareResult>>, AppError> {
    let result = service::share(&state.db, &state.config.frontend_url, id, auth.id).await?;
    Ok(Json(Data { data: result }))
}

/// POST /resumes/:id/unshare
pub async fn handle_unshare(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    service::unshare(&state.db, id, auth.id).await?;
    Ok(Json(Message {
        message: "Resume unshared successfully",
    }))
}

/// GET /resumes/:id/analytics
pub async fn handle_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Data<Analytics>>, AppError> {
    let analytics = service::get_analytics(&state.db, id, auth.id).await?;
    Ok(Json(Data { data: analytics }))
}

/// GET /public/:slug — the only unauthenticated resume read.
pub async fn handle_get_public(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Data<PublicResume>>, AppError> {
    let resume = service::get_public_resume(&state.db, &slug).await?;
    Ok(Json(Data { data: resume }))
}
