mod auth;
mod config;
mod db;
mod errors;
mod identity;
mod models;
mod render;
mod response;
mod resumes;
mod routes;
mod sharing;
mod state;
mod subscription;
mod users;
mod versions;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::identity::IdentityClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Builder API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize identity provider client
    let identity = IdentityClient::new(
        config.identity_url.clone(),
        config.identity_api_key.clone(),
    )?;
    info!("Identity client initialized");

    // Build app state
    let state = AppState {
        db,
        identity,
        config: config.clone(),
    };

    // Build router. Body limit is raised for the PDF endpoint's HTML/CSS
    // payloads, which can be large.
    let app = build_router(state)
        .layer(axum::middleware::from_fn(errors::attach_error_path))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
