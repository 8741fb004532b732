//! Bearer token issuance and validation.
//!
//! Tokens are HS256-signed JWTs carrying the user id and role. The role is
//! informational only; request guards reload the user on every request.

use crate::config::AuthConfig;
use crate::error::app_error::AppError;
use crate::models::user::{Role, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

pub fn issue_token(user: &User, config: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::minutes(config.token_expiry_minutes)).timestamp(),
        jti: Uuid::new_v4(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(config.jwt_secret.as_bytes()))
        .map_err(|e| AppError::token("Failed to sign access token", e))
}

/// Any signature, format or expiry problem is reported as `Unauthorized`.
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(config.jwt_secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AppError::Unauthorized
        })
}
