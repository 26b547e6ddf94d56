//! Signed session tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{Claims, TokenValidationError, validate_claims};

/// Sessions last one day.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::days(1);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed or badly signed token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Issues and checks bearer tokens.
///
/// `now` is explicit so callers (and tests) control the clock.
pub trait TokenService: Send + Sync {
    fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError>;

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError>;
}

/// HMAC-SHA256 JWTs signed with a shared secret.
pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenService {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenService for Hs256TokenService {
    fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(subject, now, now + self.ttl);
        validate_claims(&claims, now)?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Self::validation())?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for Hs256TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hs256TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
