//! Export/import envelopes. Envelope building and import validation are pure
//! so the format contract is testable without a database.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedResume<'a> {
    pub title: &'a str,
    pub template_id: &'a str,
    pub content: &'a Value,
    pub status: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope<'a> {
    pub version: &'static str,
    pub exported_at: String,
    pub resume: ExportedResume<'a>,
}

pub fn export_envelope(resume: &ResumeRow) -> ExportEnvelope<'_> {
    ExportEnvelope {
        version: EXPORT_FORMAT_VERSION,
        exported_at: Utc::now().to_rfc3339(),
        resume: ExportedResume {
            title: &resume.title,
            template_id: &resume.template_id,
            content: &resume.content,
            status: &resume.status,
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkExportItem<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub template_id: &'a str,
    pub content: &'a Value,
    pub status: &'a str,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkExportEnvelope<'a> {
    pub version: &'static str,
    pub exported_at: String,
    pub resumes: Vec<BulkExportItem<'a>>,
}

pub fn bulk_export_envelope(resumes: &[ResumeRow]) -> BulkExportEnvelope<'_> {
    BulkExportEnvelope {
        version: EXPORT_FORMAT_VERSION,
        exported_at: Utc::now().to_rfc3339(),
        resumes: resumes
            .iter()
            .map(|resume| BulkExportItem {
                id: resume.id,
                title: &resume.title,
                template_id: &resume.template_id,
                content: &resume.content,
                status: &resume.status,
                created_at: resume.created_at.to_rfc3339(),
                updated_at: resume.updated_at.to_rfc3339(),
            })
            .collect(),
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ImportPayload {
    pub version: Option<String>,
    pub resume: Option<ImportedResume>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportedResume {
    pub title: Option<String>,
    pub template_id: Option<String>,
    pub content: Option<Value>,
}

/// A validated import, defaults applied.
#[derive(Debug)]
pub struct NewImport {
    pub title: String,
    pub template_id: String,
    pub content: Value,
}

pub fn validate_import(payload: ImportPayload) -> Result<NewImport, AppError> {
    let resume = payload.resume.unwrap_or_default();
    let content = resume.content.ok_or_else(|| {
        AppError::Validation("Invalid import data: resume content is required".into())
    })?;

    if let Some(version) = &payload.version {
        if version != EXPORT_FORMAT_VERSION {
            return Err(AppError::UnsupportedVersion(format!(
                "Unsupported import version: {version}"
            )));
        }
    }

    Ok(NewImport {
        title: resume.title.unwrap_or_else(|| "Imported Resume".into()),
        template_id: resume.template_id.unwrap_or_else(|| "modern".into()),
        content,
    })
}

pub fn copy_title(title: &str) -> String {
    format!("{title} (Copy)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn resume() -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Draft".into(),
            description: None,
            template_id: "modern".into(),
            content: json!({ "sections": [] }),
            status: "draft".into(),
            is_public: false,
            public_slug: None,
            ats_score: None,
            view_count: 7,
            export_count: 2,
            last_exported_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn import_without_content_is_invalid() {
        let payload: ImportPayload = serde_json::from_value(json!({ "resume": {} })).unwrap();
        assert!(matches!(
            validate_import(payload),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn import_without_resume_is_invalid() {
        assert!(matches!(
            validate_import(ImportPayload::default()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn import_with_wrong_version_is_rejected() {
        let payload: ImportPayload =
            serde_json::from_value(json!({ "version": "2.0", "resume": { "content": {} } }))
                .unwrap();
        assert!(matches!(
            validate_import(payload),
            Err(AppError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn import_applies_defaults() {
        let payload: ImportPayload =
            serde_json::from_value(json!({ "resume": { "content": { "a": 1 } } })).unwrap();
        let import = validate_import(payload).unwrap();
        assert_eq!(import.title, "Imported Resume");
        assert_eq!(import.template_id, "modern");
        assert_eq!(import.content, json!({ "a": 1 }));
    }

    #[test]
    fn import_keeps_supplied_fields() {
        let payload: ImportPayload = serde_json::from_value(json!({
            "version": "1.0",
            "resume": { "title": "Mine", "templateId": "classic", "content": {} }
        }))
        .unwrap();
        let import = validate_import(payload).unwrap();
        assert_eq!(import.title, "Mine");
        assert_eq!(import.template_id, "classic");
    }

    #[test]
    fn export_envelope_shape() {
        let row = resume();
        let value = serde_json::to_value(export_envelope(&row)).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["resume"]["title"], "Draft");
        assert_eq!(value["resume"]["templateId"], "modern");
        assert_eq!(value["resume"]["status"], "draft");
        assert!(value["exportedAt"].is_string());
    }

    #[test]
    fn bulk_envelope_carries_ids_and_timestamps() {
        let rows = vec![resume(), resume()];
        let value = serde_json::to_value(bulk_export_envelope(&rows)).unwrap();
        assert_eq!(value["resumes"].as_array().unwrap().len(), 2);
        assert_eq!(value["resumes"][0]["id"], json!(rows[0].id));
        assert!(value["resumes"][0]["createdAt"].is_string());
    }

    #[test]
    fn copy_title_appends_suffix() {
        assert_eq!(copy_title("Draft"), "Draft (Copy)");
    }
}
