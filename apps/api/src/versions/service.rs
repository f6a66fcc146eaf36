use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeVersionRow};
use crate::resumes;

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub version_name: Option<String>,
    pub changes_summary: Option<String>,
}

/// Ownership gate for version operations. Unlike the resume lookup this
/// rejects with Forbidden, never revealing whether the resume exists.
async fn verify_resume_ownership(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    resumes::service::find_owned(pool, resume_id, user_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Forbidden)
}

pub async fn list(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<ResumeVersionRow>, AppError> {
    verify_resume_ownership(pool, resume_id, user_id).await?;

    let versions: Vec<ResumeVersionRow> = sqlx::query_as(
        "SELECT * FROM resume_versions WHERE resume_id = $1 ORDER BY version_number DESC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;
    Ok(versions)
}

/// Assigns max(existing) + 1, or 1 for the first snapshot. Two concurrent
/// creates can race on the max lookup; last writer wins on the number.
fn next_version_number(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

/// Snapshots the resume's *current* content and template — never
/// caller-supplied data.
pub async fn create(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
    req: CreateVersionRequest,
) -> Result<ResumeVersionRow, AppError> {
    verify_resume_ownership(pool, resume_id, user_id).await?;

    // Re-fetch by id; the resume can vanish between gate and snapshot.
    let resume: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(resume_id)
        .fetch_optional(pool)
        .await?;
    let resume = resume.ok_or_else(|| AppError::NotFound("Resume not found".into()))?;

    let current_max: Option<i32> =
        sqlx::query_scalar("SELECT MAX(version_number) FROM resume_versions WHERE resume_id = $1")
            .bind(resume_id)
            .fetch_one(pool)
            .await?;
    let version_number = next_version_number(current_max);

    let version: ResumeVersionRow = sqlx::query_as(
        r#"
        INSERT INTO resume_versions
            (resume_id, user_id, version_number, version_name, content,
             template_id, changes_summary, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(user_id)
    .bind(version_number)
    .bind(req.version_name)
    .bind(&resume.content)
    .bind(&resume.template_id)
    .bind(req.changes_summary)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    info!("Created version {version_number} of resume {resume_id}");
    Ok(version)
}

pub async fn get_by_id(
    pool: &PgPool,
    version_id: Uuid,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ResumeVersionRow, AppError> {
    verify_resume_ownership(pool, resume_id, user_id).await?;

    let version: Option<ResumeVersionRow> =
        sqlx::query_as("SELECT * FROM resume_versions WHERE id = $1 AND resume_id = $2")
            .bind(version_id)
            .bind(resume_id)
            .fetch_optional(pool)
            .await?;

    version.ok_or_else(|| AppError::NotFound("Version not found".into()))
}

/// Copies the snapshot's content and template forward into the resume. The
/// version itself is immutable, and no snapshot of the pre-restore state is
/// taken — callers wanting that history must create a version first.
pub async fn restore(
    pool: &PgPool,
    version_id: Uuid,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRow, AppError> {
    let version = get_by_id(pool, version_id, resume_id, user_id).await?;

    let resume: ResumeRow = sqlx::query_as(
        r#"
        UPDATE resumes
        SET content = $1, template_id = $2, updated_at = now()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(&version.content)
    .bind(&version.template_id)
    .bind(resume_id)
    .fetch_one(pool)
    .await?;

    info!(
        "Restored resume {resume_id} to version {}",
        version.version_number
    );
    Ok(resume)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_version_is_one() {
        assert_eq!(next_version_number(None), 1);
    }

    #[test]
    fn version_numbers_strictly_increase() {
        let mut current = None;
        for expected in 1..=5 {
            let next = next_version_number(current);
            assert_eq!(next, expected);
            current = Some(next);
        }
    }
}
