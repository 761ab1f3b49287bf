//! Signed access token issuance and verification.
//!
//! Tokens are HS256 JWTs keyed by the secret of the application they
//! were issued for. Verification needs only that secret; nothing is
//! persisted and there is no revocation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sso_core::models::{app::App, user::User};
use thiserror::Error;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID.
    pub uid: i64,
    pub email: String,
    /// Application the token was issued for.
    pub app_id: i64,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp), always `iat + ttl`.
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("JWT encode: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Produces a signed token binding a user to an application.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User, app: &App, ttl: Duration) -> Result<String, TokenError>;
}

/// Default issuer: HS256 JWT signed with the application's secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtIssuer;

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user: &User, app: &App, ttl: Duration) -> Result<String, TokenError> {
        issue_at(user, app, ttl, Utc::now())
    }
}

/// Issue a token as if it were `issued_at`.
pub fn issue_at(
    user: &User,
    app: &App,
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    if app.secret.is_empty() {
        return Err(TokenError::InvalidKey(format!(
            "app {} has an empty secret",
            app.id
        )));
    }
    let ttl_secs = i64::try_from(ttl.as_secs())
        .map_err(|_| TokenError::InvalidKey(format!("ttl out of range: {ttl:?}")))?;

    let iat = issued_at.timestamp();
    let exp = iat
        .checked_add(ttl_secs)
        .ok_or_else(|| TokenError::InvalidKey(format!("ttl overflows expiry: {ttl:?}")))?;
    let claims = TokenClaims {
        uid: user.id,
        email: user.email.clone(),
        app_id: app.id,
        iat,
        exp,
    };

    let key = EncodingKey::from_secret(app.secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(TokenError::Encode)
}

/// Verify signature and expiry (no leeway) and return the claims.
pub fn decode_token(token: &str, secret: &str) -> Result<TokenClaims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iat"]);

    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}
