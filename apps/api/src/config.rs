use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub identity_url: String,
    pub identity_api_key: String,
    pub frontend_url: String,
    /// Browser executable override for environments where Chrome is not on the
    /// default path (serverless images ship it under a fixed location).
    pub chrome_path: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            identity_url: require_env("IDENTITY_URL")?,
            identity_api_key: require_env("IDENTITY_API_KEY")?,
            frontend_url: require_env("FRONTEND_URL")?,
            chrome_path: std::env::var("CHROME_PATH").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
