//! Authentication extractors
//!
//! `Authorization: Bearer <token>` is resolved through the configured
//! identity provider. Any failure is a 401; role checks happen later in the
//! lifecycle service.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::handlers::AppState;
use crate::models::User;
use crate::utils::errors::EgateError;

/// Raw token from the `Authorization` header
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = EgateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                EgateError::Authentication("Authentication credentials were not provided.".to_string())
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                EgateError::Authentication("Expected 'Bearer <token>' authorization.".to_string())
            })?;

        Ok(Self(token.to_string()))
    }
}

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = EgateError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        match state.services.identity.authenticate(&token).await {
            Ok(user) => Ok(Self(user)),
            Err(err) => {
                warn!(path = %parts.uri.path(), error = %err, "Rejected bearer token");
                Err(err)
            }
        }
    }
}
