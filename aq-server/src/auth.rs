//! Bearer-token identity.
//!
//! Token issuance is not handled here. An [`IdentityService`] only maps a
//! presented token to a user id; the profile is then looked up separately.

use crate::http::error::ApiError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

pub trait IdentityService: Send + Sync {
    /// The user id a token belongs to, or `None` when the token is not valid.
    fn resolve(&self, token: &str) -> Option<String>;
}

/// Accepts tokens of the form `<prefix><user-id>`.
pub struct PrefixTokenIdentity {
    prefix: String,
}

impl PrefixTokenIdentity {
    pub fn new(prefix: impl Into<String>) -> Self {
        PrefixTokenIdentity {
            prefix: prefix.into(),
        }
    }
}

impl IdentityService for PrefixTokenIdentity {
    fn resolve(&self, token: &str) -> Option<String> {
        token
            .strip_prefix(self.prefix.as_str())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingToken)?;

        match state.identity.resolve(token) {
            Some(user_id) => Ok(AuthUser { user_id }),
            None => Err(ApiError::InvalidToken),
        }
    }
}
