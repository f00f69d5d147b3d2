//! Caller identity for action/reaction/join/chat endpoints.
//!
//! JWT verification, OAuth, and user registration are explicitly out of
//! scope here — some upstream gateway is assumed to have already
//! authenticated the caller and forwards their stable identity in
//! `X-User-Id`. This extractor only trusts that header; it does no
//! verification of its own.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use coup_domain::UserId;

use super::error_mapping::ApiError;

pub const CALLER_HEADER: &str = "x-user-id";

pub struct CallerId(pub UserId);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| coup_domain::DomainError::unauthenticated("missing X-User-Id header"))?;
        Ok(CallerId(UserId::from(value)))
    }
}
