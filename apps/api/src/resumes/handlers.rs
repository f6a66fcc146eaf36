use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::listing::{ListQuery, SortBy, SortOrder};
use crate::resumes::service::{self, CreateResumeRequest, UpdateResumeRequest};
use crate::resumes::transfer;
use crate::response::{Data, Message, Paginated, Pagination};
use crate::state::AppState;

/// POST /resumes
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateResumeRequest>,
) -> Result<Json<Data<ResumeRow>>, AppError> {
    let resume = service::create(&state.db, auth.id, req).await?;
    Ok(Json(Data { data: resume }))
}

/// GET /resumes
pub async fn handle_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<ResumeRow>>, AppError> {
    let (resumes, total) = service::list(&state.db, auth.id, &query).await?;
    Ok(Json(Paginated {
        data: resumes,
        pagination: Pagination::new(query.page(), query.limit(), total),
    }))
}

// Flattening ListQuery into this struct trips serde_urlencoded over the
// numeric fields, so the options are spelled out and converted by hand.
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub template: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

impl SearchQuery {
    fn options(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            limit: self.limit,
            status: self.status.clone(),
            template: self.template.clone(),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

/// GET /resumes/search
pub async fn handle_search(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Paginated<ResumeRow>>, AppError> {
    let options = query.options();
    let (resumes, total) =
        service::search(&state.db, auth.id, query.q.as_deref().unwrap_or(""), &options).await?;
    Ok(Json(Paginated {
        data: resumes,
        pagination: Pagination::new(options.page(), options.limit(), total),
    }))
}

/// GET /resumes/:id
pub async fn handle_get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Data<ResumeRow>>, AppError> {
    let resume = service::get_by_id(&state.db, id, auth.id).await?;
    Ok(Json(Data { data: resume }))
}

/// PUT /resumes/:id
pub async fn handle_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<Data<ResumeRow>>, AppError> {
    let resume = service::update(&state.db, id, auth.id, req).await?;
    Ok(Json(Data { data: resume }))
}

/// DELETE /resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    service::delete(&state.db, id, auth.id).await?;
    Ok(Json(Message {
        message: "Resume deleted successfully",
    }))
}

/// POST /resumes/:id/duplicate
pub async fn handle_duplicate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Data<ResumeRow>>, AppError> {
    let resume = service::duplicate(&state.db, id, auth.id).await?;
    Ok(Json(Data { data: resume }))
}

/// GET /resumes/:id/export
pub async fn handle_export(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let resume = service::mark_exported(&state.db, id, auth.id).await?;
    let envelope = serde_json::to_value(transfer::export_envelope(&resume))
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(serde_json::json!({ "data": envelope })))
}

/// POST /resumes/import
pub async fn handle_import(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<transfer::ImportPayload>,
) -> Result<Json<Data<ResumeRow>>, AppError> {
    let import = transfer::validate_import(payload)?;
    let resume = service::import(&state.db, auth.id, import).await?;
    Ok(Json(Data { data: resume }))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BulkExportRequest {
    pub resume_ids: Option<Vec<Uuid>>,
}

/// POST /resumes/bulk-export
pub async fn handle_bulk_export(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkExportRequest>,
) -> Result<Json<Value>, AppError> {
    let resumes =
        service::bulk_export_rows(&state.db, auth.id, req.resume_ids.as_deref()).await?;
    let envelope = serde_json::to_value(transfer::bulk_export_envelope(&resumes))
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(serde_json::json!({ "data": envelope })))
}
