use sqlx::PgPool;

use crate::config::Config;
use crate::identity::IdentityClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub identity: IdentityClient,
    pub config: Config,
}
