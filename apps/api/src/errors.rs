use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::identity::IdentityError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied")]
    Forbidden,

    #[error("Resume limit reached for your subscription tier")]
    LimitExceeded,

    #[error("Render timed out")]
    RenderTimeout,

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Not implemented")]
    NotImplemented,
}

/// Status, machine-readable code and public message carried on the response so
/// the outer middleware can rebuild the body with the request path attached.
#[derive(Debug, Clone)]
pub struct ErrorMeta {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedVersion(msg) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_VERSION",
                msg.clone(),
            ),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::LimitExceeded => (
                StatusCode::FORBIDDEN,
                "LIMIT_EXCEEDED",
                "Resume limit reached for your subscription tier".to_string(),
            ),
            AppError::RenderTimeout => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "RENDER_TIMEOUT",
                "PDF rendering timed out".to_string(),
            ),
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    format!("Failed to generate PDF: {msg}"),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            // Provider rejections surface as 401; transport failures are our problem.
            AppError::Identity(IdentityError::Api { status, message }) if *status < 500 => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message.clone())
            }
            AppError::Identity(e) => {
                tracing::error!("Identity provider error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IDENTITY_ERROR",
                    "Authentication service unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
            AppError::NotImplemented => (
                StatusCode::NOT_IMPLEMENTED,
                "NOT_IMPLEMENTED",
                "This endpoint is not yet implemented".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": &message,
                "timestamp": Utc::now().to_rfc3339(),
            }
        }));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(ErrorMeta { code, message });
        response
    }
}

/// Rewrites error bodies to include the request path. `IntoResponse` has no
/// view of the request, so the path has to be attached here.
pub async fn attach_error_path(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let mut response = next.run(req).await;

    if let Some(meta) = response.extensions_mut().remove::<ErrorMeta>() {
        let status = response.status();
        let body = Json(json!({
            "error": {
                "code": meta.code,
                "message": meta.message,
                "timestamp": Utc::now().to_rfc3339(),
                "path": path,
            }
        }));
        return (status, body).into_response();
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let (status, code, _) = AppError::NotFound("Resume not found".into()).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn limit_exceeded_maps_to_403() {
        let (status, code, _) = AppError::LimitExceeded.parts();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "LIMIT_EXCEEDED");
    }

    #[test]
    fn unsupported_version_maps_to_400() {
        let (status, code, _) =
            AppError::UnsupportedVersion("Unsupported import version: 2.0".into()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "UNSUPPORTED_VERSION");
    }

    #[test]
    fn provider_rejection_maps_to_401() {
        let err = AppError::Identity(IdentityError::Api {
            status: 400,
            message: "Invalid login credentials".into(),
        });
        let (status, _, message) = err.parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Invalid login credentials");
    }

    #[test]
    fn provider_outage_maps_to_500_with_generic_message() {
        let err = AppError::Identity(IdentityError::Api {
            status: 502,
            message: "upstream exploded".into(),
        });
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "IDENTITY_ERROR");
        assert!(!message.contains("exploded"));
    }

    #[test]
    fn render_timeout_maps_to_500() {
        let (status, code, _) = AppError::RenderTimeout.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "RENDER_TIMEOUT");
    }
}
