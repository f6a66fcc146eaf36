use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A resume document. `content` is an opaque JSON object whose schema is owned
/// by the client. Invariant: `is_public` is true iff `public_slug` is set.
/// Soft-deleted rows (`deleted_at` set) are filtered from every read path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub template_id: String,
    pub content: Value,
    pub status: String,
    pub is_public: bool,
    pub public_slug: Option<String>,
    pub ats_score: Option<i32>,
    pub view_count: i32,
    pub export_count: i32,
    pub last_exported_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Immutable snapshot of a resume's content and template at a point in time.
/// Version numbers are per resume, strictly increasing from 1.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeVersionRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub user_id: Uuid,
    pub version_number: i32,
    pub version_name: Option<String>,
    pub content: Value,
    pub template_id: String,
    pub changes_summary: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
