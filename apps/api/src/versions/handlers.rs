use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeVersionRow};
use crate::response::Data;
use crate::state::AppState;
use crate::versions::service::{self, CreateVersionRequest};

/// GET /resumes/:id/versions
pub async fn handle_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<Data<Vec<ResumeVersionRow>>>, AppError> {
    let versions = service::list(&state.db, resume_id, auth.id).await?;
    Ok(Json(Data { data: versions }))
}

/// POST /resumes/:id/versions
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(resume_id): Path<Uuid>,
    Json(req): Json<CreateVersionRequest>,
) -> Result<Json<Data<ResumeVersionRow>>, AppError> {
    let version = service::create(&state.db, resume_id, auth.id, req).await?;
    Ok(Json(Data { data: version }))
}

/// GET /resumes/:id/versions/:version_id
pub async fn handle_get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((resume_id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Data<ResumeVersionRow>>, AppError> {
    let version = service::get_by_id(&state.db, version_id, resume_id, auth.id).await?;
    Ok(Json(Data { data: version }))
}

/// POST /resumes/:id/versions/:version_id/restore
pub async fn handle_restore(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((resume_id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Data<ResumeRow>>, AppError> {
    let resume = service::restore(&state.db, version_id, resume_id, auth.id).await?;
    Ok(Json(Data { data: resume }))
}
