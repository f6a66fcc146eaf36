use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::IdentityUser;
use crate::models::user::UserRow;

/// Returns the caller's non-deleted user row.
pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<UserRow, AppError> {
    let user: Option<UserRow> =
        sqlx::query_as("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    user.ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Upserts the local row for a provider subject, refreshing login time and
/// avatar from the provider's claims.
pub async fn ensure_exists(pool: &PgPool, user: &IdentityUser) -> Result<UserRow, AppError> {
    let email = user.email.clone().unwrap_or_default();
    let full_name = user
        .full_name()
        .map(str::to_owned)
        .unwrap_or_else(|| email.clone());

    let row: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, full_name, avatar_url, last_login_at)
        VALUES ($1, $2, $3, $4, now())
        ON CONFLICT (id) DO UPDATE
        SET last_login_at = now(),
            avatar_url = COALESCE($4, users.avatar_url),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(email)
    .bind(full_name)
    .bind(user.avatar_url())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn touch_last_login(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET last_login_at = now(), updated_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    full_name: Option<String>,
    avatar_url: Option<String>,
) -> Result<UserRow, AppError> {
    let row: UserRow = sqlx::query_as(
        r#"
        UPDATE users
        SET full_name = COALESCE($1, full_name),
            avatar_url = COALESCE($2, avatar_url),
            updated_at = now()
        WHERE id = $3 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(full_name)
    .bind(avatar_url)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(row)
}

/// Soft delete; the identity provider's subject is untouched.
pub async fn delete(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE users SET deleted_at = now(), is_active = FALSE, updated_at = now() WHERE id = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Live count of the user's non-deleted resumes (not the denormalized column).
pub async fn live_resume_count(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM resumes WHERE user_id = $1 AND deleted_at IS NULL",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
