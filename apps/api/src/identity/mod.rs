/// Identity client — the single point of entry for all identity-provider calls.
///
/// The provider (a GoTrue-style REST API) owns credentials, token issuance and
/// OAuth flows. This module only speaks its HTTP surface; local user rows are
/// managed by the `auth` and `users` modules.
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

const AUTH_PATH: &str = "/auth/v1";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// The provider's view of an authenticated subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: uuid::Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl IdentityUser {
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata.get("full_name").and_then(Value::as_str)
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.user_metadata.get("avatar_url").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: String,
}

/// User + session pair returned by signup/signin/refresh/code-exchange.
/// Either half can be absent (e.g. signup pending email confirmation).
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
    pub user: Option<IdentityUser>,
    pub session: Option<SessionTokens>,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<i64>,
    refresh_token: String,
    user: Option<IdentityUser>,
}

impl From<TokenGrant> for AuthPayload {
    fn from(grant: TokenGrant) -> Self {
        AuthPayload {
            user: grant.user,
            session: Some(SessionTokens {
                access_token: grant.access_token,
                token_type: grant.token_type,
                expires_in: grant.expires_in,
                refresh_token: grant.refresh_token,
            }),
        }
    }
}

// The provider is not consistent about its error body shape.
#[derive(Debug, Deserialize, Default)]
struct ApiErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| "Authentication failed".to_string())
    }
}

#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(base_url: String, api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, AUTH_PATH, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: ApiErrorBody = response.json().await.unwrap_or_default();
        Err(IdentityError::Api {
            status: status.as_u16(),
            message: body.into_message(),
        })
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        redirect_to: &str,
    ) -> Result<AuthPayload, IdentityError> {
        let response = self
            .client
            .post(self.endpoint("/signup"))
            .header("apikey", &self.api_key)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;
        debug!("signup response received");

        // Auto-confirm deployments return a token grant; confirmation-required
        // deployments return the bare user object.
        if body.get("access_token").is_some() {
            let grant: TokenGrant =
                serde_json::from_value(body).map_err(|e| IdentityError::Api {
                    status: 500,
                    message: format!("unexpected signup response: {e}"),
                })?;
            Ok(grant.into())
        } else {
            let user: Option<IdentityUser> = serde_json::from_value(body).ok();
            Ok(AuthPayload {
                user,
                session: None,
            })
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthPayload, IdentityError> {
        self.token_grant(
            "password",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthPayload, IdentityError> {
        self.token_grant(
            "refresh_token",
            json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    pub async fn exchange_code(&self, code: &str) -> Result<AuthPayload, IdentityError> {
        self.token_grant("pkce", json!({ "auth_code": code })).await
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: Value,
    ) -> Result<AuthPayload, IdentityError> {
        let response = self
            .client
            .post(self.endpoint("/token"))
            .header("apikey", &self.api_key)
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;
        let grant: TokenGrant = Self::check(response).await?.json().await?;
        Ok(grant.into())
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.endpoint("/logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn reset_password(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.endpoint("/recover"))
            .header("apikey", &self.api_key)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Validates a bearer token and returns the subject it belongs to.
    pub async fn get_user(&self, access_token: &str) -> Result<IdentityUser, IdentityError> {
        let response = self
            .client
            .get(self.endpoint("/user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Builds the provider-hosted OAuth entry URL; no network call involved.
    pub fn authorize_url(&self, provider: &str, redirect_to: &str) -> String {
        format!(
            "{}/authorize?provider={}&redirect_to={}",
            self.endpoint(""),
            provider,
            redirect_to,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_description() {
        let body = ApiErrorBody {
            error_description: Some("Invalid login credentials".into()),
            msg: Some("other".into()),
            message: None,
            error: None,
        };
        assert_eq!(body.into_message(), "Invalid login credentials");
    }

    #[test]
    fn error_body_falls_back_to_generic() {
        assert_eq!(
            ApiErrorBody::default().into_message(),
            "Authentication failed"
        );
    }

    #[test]
    fn metadata_accessors_read_claims() {
        let user = IdentityUser {
            id: uuid::Uuid::new_v4(),
            email: Some("a@b.c".into()),
            email_confirmed_at: None,
            user_metadata: json!({ "full_name": "Ada Lovelace", "avatar_url": "http://x/y.png" }),
        };
        assert_eq!(user.full_name(), Some("Ada Lovelace"));
        assert_eq!(user.avatar_url(), Some("http://x/y.png"));
    }

    #[test]
    fn authorize_url_includes_provider() {
        let client = IdentityClient::new("http://id.local/".into(), "key".into()).unwrap();
        let url = client.authorize_url("github", "http://app/callback");
        assert!(url.starts_with("http://id.local/auth/v1/authorize?provider=github"));
    }
}
