//! HTML + CSS to PDF rendering through a headless browser.
//!
//! Each invocation launches its own browser process and tears it down when the
//! closure returns, trading latency for isolation: no render can observe
//! another's state. The whole render is bounded by [`RENDER_TIMEOUT`].

pub mod handlers;

use std::ffi::OsStr;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use tracing::debug;

use crate::errors::AppError;

pub const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Wraps a caller-supplied HTML fragment and CSS into a printable document:
/// UTF-8, box-sizing reset, exact print colors, caller CSS injected inline.
pub fn build_document(html: &str, css: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <style>
      *, ::before, ::after {{
        box-sizing: border-box;
        border-width: 0;
        border-style: solid;
        border-color: #e5e7eb;
      }}
      html, body {{
        margin: 0;
        padding: 0;
        -webkit-print-color-adjust: exact;
        print-color-adjust: exact;
        -webkit-font-smoothing: antialiased;
        -moz-osx-font-smoothing: grayscale;
      }}
      {css}
    </style>
  </head>
  <body>
    {html}
  </body>
</html>
"#
    )
}

/// Renders the document to a US Letter PDF with zero margins, backgrounds
/// printed, page size overridable from CSS. Fails with `RenderTimeout` if the
/// browser does not produce a PDF within [`RENDER_TIMEOUT`].
pub async fn render_pdf(
    html: String,
    css: String,
    chrome_path: Option<String>,
) -> Result<Vec<u8>, AppError> {
    let document = build_document(&html, &css);

    let task = tokio::task::spawn_blocking(move || print_pdf(&document, chrome_path));

    match tokio::time::timeout(RENDER_TIMEOUT, task).await {
        Err(_) => Err(AppError::RenderTimeout),
        Ok(joined) => joined
            .context("render task panicked")
            .map_err(AppError::Internal)?
            .map_err(|e| AppError::Render(format!("{e:#}"))),
    }
}

fn print_pdf(document: &str, chrome_path: Option<String>) -> Result<Vec<u8>> {
    // Staged on disk so the tab can load it as a plain navigation, which is
    // what makes wait_until_navigated meaningful.
    let mut file = tempfile::Builder::new()
        .prefix("resume-render-")
        .suffix(".html")
        .tempfile()
        .context("failed to create render scratch file")?;
    file.write_all(document.as_bytes())
        .context("failed to write render scratch file")?;

    let options = LaunchOptions::default_builder()
        .path(chrome_path.map(PathBuf::from))
        .sandbox(false)
        .idle_browser_timeout(RENDER_TIMEOUT)
        .args(vec![
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--no-first-run"),
            OsStr::new("--no-zygote"),
        ])
        .build()
        .map_err(|e| anyhow!("invalid browser launch options: {e}"))?;

    // Dropped at the end of this function on every path, killing the process.
    let browser = Browser::new(options).context("failed to launch browser")?;
    let tab = browser.new_tab().context("failed to open tab")?;
    tab.set_default_timeout(RENDER_TIMEOUT);

    let url = format!("file://{}", file.path().display());
    tab.navigate_to(&url)
        .context("navigation failed")?
        .wait_until_navigated()
        .context("page never finished loading")?;

    // Webfonts load asynchronously after navigation completes.
    tab.evaluate("document.fonts.ready.then(() => 'loaded')", true)
        .context("font loading never settled")?;

    let pdf = tab
        .print_to_pdf(Some(PrintToPdfOptions {
            print_background: Some(true),
            display_header_footer: Some(false),
            paper_width: Some(8.5),
            paper_height: Some(11.0),
            margin_top: Some(0.0),
            margin_bottom: Some(0.0),
            margin_left: Some(0.0),
            margin_right: Some(0.0),
            prefer_css_page_size: Some(true),
            ..Default::default()
        }))
        .context("print to PDF failed")?;

    debug!("Rendered {} byte PDF", pdf.len());
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_declares_utf8() {
        let doc = build_document("<p>hi</p>", "");
        assert!(doc.contains(r#"<meta charset="UTF-8">"#));
    }

    #[test]
    fn document_contains_fragment_and_css() {
        let doc = build_document("<h1>Name</h1>", "h1 { color: red; }");
        assert!(doc.contains("<h1>Name</h1>"));
        assert!(doc.contains("h1 { color: red; }"));
        // The caller's CSS must land inside the style element.
        let style_end = doc.find("</style>").unwrap();
        assert!(doc.find("h1 { color: red; }").unwrap() < style_end);
    }

    #[test]
    fn document_forces_print_colors() {
        let doc = build_document("", "");
        assert!(doc.contains("print-color-adjust: exact"));
        assert!(doc.contains("box-sizing: border-box"));
    }
}
