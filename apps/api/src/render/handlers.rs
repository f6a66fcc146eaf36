use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::render;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub html: String,
    #[serde(default)]
    pub css: String,
}

/// POST /resumes/export — renders caller-supplied HTML/CSS to a PDF download.
/// Independent of resume storage: no resume id, no counters touched.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<(HeaderMap, Bytes), AppError> {
    if req.html.trim().is_empty() {
        return Err(AppError::Validation("HTML content is required".into()));
    }

    info!("Generating PDF ({} bytes of HTML)", req.html.len());
    let pdf = render::render_pdf(req.html, req.css, state.config.chrome_path.clone()).await?;
    info!("PDF generated successfully ({} bytes)", pdf.len());

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"resume.pdf\""),
    );
    Ok((headers, Bytes::from(pdf)))
}
