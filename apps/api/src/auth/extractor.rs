use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::IdentityUser;
use crate::state::AppState;

/// Extractor for authenticated routes. Reads `Authorization: Bearer <token>`,
/// validates the token against the identity provider and yields the caller's
/// id plus profile claims. Rejects with 401 on any failure.
pub struct AuthUser {
    pub id: Uuid,
    pub user: IdentityUser,
    /// The raw bearer token, needed to sign the caller out at the provider.
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid authorization header".into())
        })?;

        let user = state
            .identity
            .get_user(&token)
            .await
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        Ok(AuthUser {
            id: user.id,
            user,
            token,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/resumes");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn extracts_bearer_token() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(bearer_token(&parts_with_auth(None)).is_none());
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert!(bearer_token(&parts_with_auth(Some("Basic dXNlcg=="))).is_none());
    }
}
