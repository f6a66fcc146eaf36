use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes;
use crate::sharing::slug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResult {
    pub slug: String,
    pub url: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicResume {
    pub id: Uuid,
    pub title: String,
    pub template_id: String,
    pub content: Value,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub resume_id: Uuid,
    pub view_count: i32,
    pub export_count: i32,
    /// Always absent: per-view timestamps are not tracked.
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub last_exported_at: Option<DateTime<Utc>>,
}

pub fn public_url(frontend_url: &str, slug: &str) -> String {
    format!("{}/public/{}", frontend_url.trim_end_matches('/'), slug)
}

/// Sharing's ownership gate rejects with Forbidden, matching the version
/// manager rather than the resume lookup's NotFound.
async fn verify_ownership(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRow, AppError> {
    resumes::service::find_owned(pool, resume_id, user_id)
        .await?
        .ok_or(AppError::Forbidden)
}

/// Idempotent: an already-public resume keeps its existing slug.
pub async fn share(
    pool: &PgPool,
    frontend_url: &str,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ShareResult, AppError> {
    let resume = verify_ownership(pool, resume_id, user_id).await?;

    if resume.is_public {
        if let Some(existing) = resume.public_slug {
            return Ok(ShareResult {
                url: public_url(frontend_url, &existing),
                slug: existing,
                is_public: true,
            });
        }
    }

    let new_slug = slug::generate();
    sqlx::query("UPDATE resumes SET is_public = TRUE, public_slug = $1, updated_at = now() WHERE id = $2")
        .bind(&new_slug)
        .bind(resume_id)
        .execute(pool)
        .await?;

    info!("Shared resume {resume_id} as /public/{new_slug}");
    Ok(ShareResult {
        url: public_url(frontend_url, &new_slug),
        slug: new_slug,
        is_public: true,
    })
}

/// Discards the slug entirely; a later share mints a fresh one.
pub async fn unshare(pool: &PgPool, resume_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    verify_ownership(pool, resume_id, user_id).await?;

    sqlx::query(
        "UPDATE resumes SET is_public = FALSE, public_slug = NULL, updated_at = now() WHERE id = $1",
    )
    .bind(resume_id)
    .execute(pool)
    .await?;

    info!("Unshared resume {resume_id}");
    Ok(())
}

/// Unauthenticated lookup by slug. The view counter is incremented atomically
/// in the same statement, so the returned count is the post-increment value
/// even under concurrent views.
pub async fn get_public_resume(pool: &PgPool, slug: &str) -> Result<PublicResume, AppError> {
    let resume: Option<ResumeRow> = sqlx::query_as(
        r#"
        UPDATE resumes
        SET view_count = view_count + 1
        WHERE public_slug = $1 AND is_public = TRUE AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    let resume = resume.ok_or_else(|| AppError::NotFound("Public resume not found".into()))?;

    Ok(PublicResume {
        id: resume.id,
        title: resume.title,
        template_id: resume.template_id,
        content: resume.content,
        view_count: resume.view_count,
        created_at: resume.created_at,
        updated_at: resume.updated_at,
    })
}

pub async fn get_analytics(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<Analytics, AppError> {
    let resume = verify_ownership(pool, resume_id, user_id).await?;

    Ok(Analytics {
        resume_id: resume.id,
        view_count: resume.view_count,
        export_count: resume.export_count,
        last_viewed_at: None,
        last_exported_at: resume.last_exported_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_joins_slug() {
        assert_eq!(
            public_url("https://app.example.com", "Ab3_x9Kq-12Z"),
            "https://app.example.com/public/Ab3_x9Kq-12Z"
        );
    }

    #[test]
    fn public_url_tolerates_trailing_slash() {
        assert_eq!(
            public_url("https://app.example.com/", "abc"),
            "https://app.example.com/public/abc"
        );
    }

    #[test]
    fn analytics_never_reports_last_viewed() {
        let analytics = Analytics {
            resume_id: Uuid::new_v4(),
            view_count: 3,
            export_count: 1,
            last_viewed_at: None,
            last_exported_at: None,
        };
        let value = serde_json::to_value(&analytics).unwrap();
        assert!(value["lastViewedAt"].is_null());
    }
}
