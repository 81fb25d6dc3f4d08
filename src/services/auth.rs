//! Authentication and role checks
//!
//! Bearer tokens are resolved to a [`User`] by an [`IdentityProvider`];
//! an [`AccessPolicy`] decides whether that user may run an operation.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::models::{Role, User};
use crate::utils::errors::{EgateError, Result};

/// Resolves an opaque bearer token to the authenticated user
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<User>;
}

/// Capability predicate evaluated before every lifecycle operation
pub trait AccessPolicy: Send + Sync {
    fn has_role(&self, user: &User, role: Role) -> bool;
}

/// Exact role match: admins do not act as residents
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn has_role(&self, user: &User, role: Role) -> bool {
        user.role == role
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// HS256 tokens signed with `auth.jwt_secret`
#[derive(Clone)]
pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
    ttl: Duration,
}

impl JwtIdentityProvider {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            ttl: Duration::seconds(config.token_ttl_seconds),
        }
    }

    /// Sign a token for `user`; used by development tooling and tests
    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| EgateError::Authentication(format!("Failed to sign token: {}", e)))
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| EgateError::Authentication(format!("Invalid token: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.decode_claims(token)?;
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| EgateError::Authentication("Invalid subject claim".to_string()))?;

        debug!(user_id = id, role = %claims.role, "Authenticated bearer token");
        Ok(User::new(id, claims.username, claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "an-adequately-long-test-signing-secret".to_string(),
            issuer: issuer.map(str::to_string),
            token_ttl_seconds: 3600,
        }
    }

    #[tokio::test]
    async fn test_token_authenticates() {
        let provider = JwtIdentityProvider::new(&config(Some("egate")));
        let user = User::new(12, "juan", Role::Resident);

        let token = provider.issue_token(&user).unwrap();
        assert_eq!(provider.authenticate(&token).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_rejects_foreign_and_expired_tokens() {
        let provider = JwtIdentityProvider::new(&config(None));
        let other = JwtIdentityProvider::new(&AuthConfig {
            jwt_secret: "a-completely-different-signing-secret".to_string(),
            ..config(None)
        });
        let expired = JwtIdentityProvider::new(&AuthConfig {
            token_ttl_seconds: -3600,
            ..config(None)
        });
        let user = User::new(1, "admin", Role::Admin);

        let foreign = other.issue_token(&user).unwrap();
        assert_matches!(provider.authenticate(&foreign).await, Err(EgateError::Authentication(_)));

        let stale = expired.issue_token(&user).unwrap();
        assert_matches!(provider.authenticate(&stale).await, Err(EgateError::Authentication(_)));

        assert_matches!(provider.authenticate("not-a-token").await, Err(EgateError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_issuer_is_enforced() {
        let strict = JwtIdentityProvider::new(&config(Some("egate")));
        let other_issuer = JwtIdentityProvider::new(&config(Some("someone-else")));
        let token = other_issuer.issue_token(&User::new(1, "admin", Role::Admin)).unwrap();

        assert_matches!(strict.authenticate(&token).await, Err(EgateError::Authentication(_)));
    }

    #[test]
    fn test_role_policy() {
        let policy = RolePolicy;
        let admin = User::new(1, "admin", Role::Admin);

        assert!(policy.has_role(&admin, Role::Admin));
        assert!(!policy.has_role(&admin, Role::Resident));
    }
}
