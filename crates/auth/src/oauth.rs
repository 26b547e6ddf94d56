//! Third-party login (GitHub OAuth web flow).

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_SCOPE: &str = "user:email";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("oauth provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("oauth provider rejected the request: {0}")]
    Rejected(String),

    #[error("invalid oauth endpoint: {0}")]
    Endpoint(String),
}

/// An OAuth identity provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Where to send the browser to start the login.
    fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, OAuthError>;

    /// Trade an authorization code for the provider's access token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, OAuthError>;

    /// Look up the login name the access token belongs to.
    async fn fetch_login(&self, access_token: &str) -> Result<String, OAuthError>;

    /// Complete the callback: code in, login out.
    async fn authenticate(&self, code: &str, redirect_uri: &str) -> Result<String, OAuthError> {
        let access_token = self.exchange_code(code, redirect_uri).await?;
        self.fetch_login(&access_token).await
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Debug, Clone)]
pub struct GitHubOAuth {
    client_id: String,
    client_secret: String,
    authorize_url: String,
    token_url: String,
    api_url: String,
    http: reqwest::Client,
}

impl GitHubOAuth {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: GITHUB_AUTHORIZE_URL.to_string(),
            token_url: GITHUB_TOKEN_URL.to_string(),
            api_url: GITHUB_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at other endpoints (GitHub Enterprise, test doubles).
    pub fn with_endpoints(
        mut self,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        self.authorize_url = authorize_url.into();
        self.token_url = token_url.into();
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl OAuthProvider for GitHubOAuth {
    fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, OAuthError> {
        let url = Url::parse_with_params(
            &self.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", GITHUB_SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::Endpoint(e.to_string()))?;
        Ok(url.into())
    }

    #[tracing::instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, OAuthError> {
        let res: TokenResponse = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match res {
            TokenResponse {
                access_token: Some(token),
                ..
            } if !token.is_empty() => Ok(token),
            TokenResponse {
                error,
                error_description,
                ..
            } => Err(OAuthError::Rejected(
                error_description
                    .or(error)
                    .unwrap_or_else(|| "no access token in response".to_string()),
            )),
        }
    }

    #[tracing::instrument(skip(self, access_token))]
    async fn fetch_login(&self, access_token: &str) -> Result<String, OAuthError> {
        let user: GitHubUser = self
            .http
            .get(format!("{}/user", self.api_url))
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "binventory")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if user.login.is_empty() {
            return Err(OAuthError::Rejected("user has no login".to_string()));
        }
        Ok(user.login)
    }
}
