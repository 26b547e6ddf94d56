//! `binventory-auth` — session tokens and the OAuth login boundary.
//!
//! Decoupled from HTTP routing and storage: the API crate wires these
//! services into its middleware and auth routes.

pub mod claims;
pub mod oauth;
pub mod token;

pub use claims::{Claims, TokenValidationError, validate_claims};
pub use oauth::{GitHubOAuth, OAuthError, OAuthProvider};
pub use token::{Hs256TokenService, TokenError, TokenService, DEFAULT_TOKEN_TTL};
