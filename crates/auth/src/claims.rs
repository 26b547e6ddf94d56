use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session token claims.
///
/// `sub` is the GitHub login of the signed-in user. Times are Unix seconds,
/// as JWT registered claims require.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: subject.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token has no subject")]
    MissingSubject,
}

/// Deterministically validate decoded claims against `now`.
///
/// Signature checks happen before this, in [`crate::TokenService`].
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.sub.trim().is_empty() {
        return Err(TokenValidationError::MissingSubject);
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
