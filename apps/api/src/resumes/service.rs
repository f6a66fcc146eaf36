use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::listing::{order_clause, ListQuery, SortBy, SortOrder};
use crate::resumes::transfer::{self, NewImport};
use crate::subscription;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub template_id: Option<String>,
    pub content: Option<Value>,
    pub status: Option<String>,
    pub is_public: Option<bool>,
}

/// The one owned-lookup used by every ownership gate: the row must exist,
/// belong to the caller and not be soft-deleted.
pub async fn find_owned(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, AppError> {
    let resume: Option<ResumeRow> = sqlx::query_as(
        "SELECT * FROM resumes WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
    )
    .bind(resume_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(resume)
}

pub async fn get_by_id(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRow, AppError> {
    find_owned(pool, resume_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".into()))
}

/// Subscription gate consulted before create/duplicate/import.
async fn ensure_can_create(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let user: Option<(String, i32)> =
        sqlx::query_as("SELECT subscription_tier, resume_count FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    match user {
        Some((tier, count)) if subscription::can_create_resume(&tier, count) => Ok(()),
        _ => Err(AppError::LimitExceeded),
    }
}

/// Recomputes the owner's denormalized resume count from the source of truth.
async fn refresh_resume_count(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET resume_count = (
                SELECT count(*) FROM resumes WHERE user_id = $1 AND deleted_at IS NULL
            ),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn insert_resume(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    description: Option<&str>,
    template_id: &str,
    content: &Value,
) -> Result<ResumeRow, AppError> {
    let resume: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (user_id, title, description, template_id, content, status)
        VALUES ($1, $2, $3, $4, $5, 'draft')
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .bind(template_id)
    .bind(content)
    .fetch_one(pool)
    .await?;
    Ok(resume)
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    req: CreateResumeRequest,
) -> Result<ResumeRow, AppError> {
    ensure_can_create(pool, user_id).await?;

    let resume = insert_resume(
        pool,
        user_id,
        &req.title,
        req.description.as_deref(),
        req.template_id.as_deref().unwrap_or("modern"),
        req.content.as_ref().unwrap_or(&json!({})),
    )
    .await?;

    refresh_resume_count(pool, user_id).await?;
    info!("Created resume {} for user {}", resume.id, user_id);
    Ok(resume)
}

pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    query: &ListQuery,
) -> Result<(Vec<ResumeRow>, i64), AppError> {
    let sort_by = query.sort_by.unwrap_or(SortBy::UpdatedAt);
    let order = order_clause(sort_by, query.sort_order.unwrap_or(SortOrder::Desc));

    let sql = format!(
        r#"
        SELECT * FROM resumes
        WHERE user_id = $1 AND deleted_at IS NULL
          AND ($2::text IS NULL OR status = $2)
          AND ($3::text IS NULL OR template_id = $3)
        ORDER BY {order}
        LIMIT $4 OFFSET $5
        "#
    );
    let resumes: Vec<ResumeRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .bind(&query.status)
        .bind(&query.template)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT count(*) FROM resumes
        WHERE user_id = $1 AND deleted_at IS NULL
          AND ($2::text IS NULL OR status = $2)
          AND ($3::text IS NULL OR template_id = $3)
        "#,
    )
    .bind(user_id)
    .bind(&query.status)
    .bind(&query.template)
    .fetch_one(pool)
    .await?;

    Ok((resumes, total))
}

/// Case-insensitive substring match over title and description. An empty or
/// whitespace query degrades to `list`; "relevance" degrades to updatedAt
/// (there is no scored ranking).
pub async fn search(
    pool: &PgPool,
    user_id: Uuid,
    query_text: &str,
    query: &ListQuery,
) -> Result<(Vec<ResumeRow>, i64), AppError> {
    let sort_by = query.sort_by.unwrap_or(SortBy::Relevance);
    let needle = query_text.trim().to_lowercase();

    if needle.is_empty() {
        let fallback = ListQuery {
            sort_by: Some(match sort_by {
                SortBy::Relevance => SortBy::UpdatedAt,
                other => other,
            }),
            ..query.clone()
        };
        return list(pool, user_id, &fallback).await;
    }

    let order = match sort_by {
        SortBy::Relevance => "updated_at DESC",
        other => order_clause(other, query.sort_order.unwrap_or(SortOrder::Desc)),
    };
    let pattern = format!("%{needle}%");

    let sql = format!(
        r#"
        SELECT * FROM resumes
        WHERE user_id = $1 AND deleted_at IS NULL
          AND ($2::text IS NULL OR status = $2)
          AND ($3::text IS NULL OR template_id = $3)
          AND (title ILIKE $4 OR description ILIKE $4)
        ORDER BY {order}
        LIMIT $5 OFFSET $6
        "#
    );
    let resumes: Vec<ResumeRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .bind(&query.status)
        .bind(&query.template)
        .bind(&pattern)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT count(*) FROM resumes
        WHERE user_id = $1 AND deleted_at IS NULL
          AND ($2::text IS NULL OR status = $2)
          AND ($3::text IS NULL OR template_id = $3)
          AND (title ILIKE $4 OR description ILIKE $4)
        "#,
    )
    .bind(user_id)
    .bind(&query.status)
    .bind(&query.template)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((resumes, total))
}

/// Partial update; only the supplied fields change. Version history is never
/// touched here.
pub async fn update(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
    updates: UpdateResumeRequest,
) -> Result<ResumeRow, AppError> {
    get_by_id(pool, resume_id, user_id).await?;

    let resume: ResumeRow = sqlx::query_as(
        r#"
        UPDATE resumes
        SET title = COALESCE($1, title),
            description = COALESCE($2, description),
            template_id = COALESCE($3, template_id),
            content = COALESCE($4, content),
            status = COALESCE($5, status),
            is_public = COALESCE($6, is_public),
            updated_at = now()
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(updates.title)
    .bind(updates.description)
    .bind(updates.template_id)
    .bind(updates.content)
    .bind(updates.status)
    .bind(updates.is_public)
    .bind(resume_id)
    .fetch_one(pool)
    .await?;

    Ok(resume)
}

/// Soft delete: sets `deleted_at`, leaving versions and the slug in place.
pub async fn delete(pool: &PgPool, resume_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    get_by_id(pool, resume_id, user_id).await?;

    sqlx::query("UPDATE resumes SET deleted_at = now(), updated_at = now() WHERE id = $1")
        .bind(resume_id)
        .execute(pool)
        .await?;

    refresh_resume_count(pool, user_id).await?;
    info!("Soft-deleted resume {resume_id}");
    Ok(())
}

/// New draft copy with a fresh id and zeroed counters; counts against the
/// creation limit like any other create.
pub async fn duplicate(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRow, AppError> {
    let original = get_by_id(pool, resume_id, user_id).await?;
    ensure_can_create(pool, user_id).await?;

    let copy = insert_resume(
        pool,
        user_id,
        &transfer::copy_title(&original.title),
        original.description.as_deref(),
        &original.template_id,
        &original.content,
    )
    .await?;

    refresh_resume_count(pool, user_id).await?;
    Ok(copy)
}

/// Marks a single export: atomic counter increment plus export timestamp.
/// Returns the row for envelope building; the exported fields (title,
/// template, content, status) are unaffected by the counter update.
pub async fn mark_exported(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRow, AppError> {
    let resume = get_by_id(pool, resume_id, user_id).await?;

    sqlx::query(
        "UPDATE resumes SET export_count = export_count + 1, last_exported_at = now() WHERE id = $1",
    )
    .bind(resume.id)
    .execute(pool)
    .await?;

    Ok(resume)
}

pub async fn import(
    pool: &PgPool,
    user_id: Uuid,
    import: NewImport,
) -> Result<ResumeRow, AppError> {
    ensure_can_create(pool, user_id).await?;

    let resume = insert_resume(
        pool,
        user_id,
        &import.title,
        None,
        &import.template_id,
        &import.content,
    )
    .await?;

    refresh_resume_count(pool, user_id).await?;
    Ok(resume)
}

/// All non-deleted resumes for the caller, optionally restricted to an id
/// subset, newest update first. Read-only: export counters are untouched,
/// unlike the single-resume export.
pub async fn bulk_export_rows(
    pool: &PgPool,
    user_id: Uuid,
    resume_ids: Option<&[Uuid]>,
) -> Result<Vec<ResumeRow>, AppError> {
    let ids_filter = resume_ids.filter(|ids| !ids.is_empty());
    let resumes: Vec<ResumeRow> = sqlx::query_as(
        r#"
        SELECT * FROM resumes
        WHERE user_id = $1 AND deleted_at IS NULL
          AND ($2::uuid[] IS NULL OR id = ANY($2))
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .bind(ids_filter)
    .fetch_all(pool)
    .await?;
    Ok(resumes)
}
