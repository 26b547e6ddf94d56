//! Process configuration from environment variables.

use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::Context;
use tracing::{info, warn};

const PLACEHOLDER_CLIENT_ID: &str = "your-github-client-id";
const PLACEHOLDER_CLIENT_SECRET: &str = "your-github-client-secret";

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Externally visible base URL of this server (OAuth redirect target).
    pub public_url: String,
    pub frontend_url: String,
    pub secret_key: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub static_files_dir: PathBuf,
    /// GitHub logins allowed to sign in; `None` admits everyone.
    pub allowed_users: Option<Vec<String>>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |key: &str, default: &str| {
            get(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let secret_key = get("SECRET_KEY").unwrap_or_else(|| {
            warn!("SECRET_KEY not set; generating a per-process key (sessions end on restart)");
            random_secret()
        });

        let github_client_id = or_default("GITHUB_CLIENT_ID", PLACEHOLDER_CLIENT_ID);
        let github_client_secret = or_default("GITHUB_CLIENT_SECRET", PLACEHOLDER_CLIENT_SECRET);
        if github_client_id == PLACEHOLDER_CLIENT_ID || github_client_secret == PLACEHOLDER_CLIENT_SECRET {
            warn!("GitHub OAuth credentials are placeholders; login will fail");
        }

        Ok(Self {
            database_url: or_default("DATABASE_URL", "sqlite://binventory.db"),
            bind_addr: parse("BIND_ADDR", &or_default("BIND_ADDR", "0.0.0.0:8000"))?,
            public_url: trim_slash(or_default("PUBLIC_URL", "http://localhost:8000")),
            frontend_url: trim_slash(or_default("FRONTEND_URL", "http://localhost:3000")),
            secret_key,
            github_client_id,
            github_client_secret,
            static_files_dir: PathBuf::from(or_default("STATIC_FILES_DIR", "../static")),
            allowed_users: get("ALLOWED_USERS").map(|v| parse_list(&v)),
        })
    }

    /// OAuth callback URL handed to the provider.
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/api/auth/callback", self.public_url)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("bind_addr", &self.bind_addr)
            .field("public_url", &self.public_url)
            .field("frontend_url", &self.frontend_url)
            .field("github_client_id", &self.github_client_id)
            .field("static_files_dir", &self.static_files_dir)
            .field("allowed_users", &self.allowed_users)
            .finish_non_exhaustive()
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().with_context(|| format!("invalid {key} value: {raw}"))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn random_secret() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.database_url, "sqlite://binventory.db");
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(cfg.frontend_url, "http://localhost:3000");
        assert_eq!(cfg.oauth_redirect_uri(), "http://localhost:8000/api/auth/callback");
        assert_eq!(cfg.static_files_dir, PathBuf::from("../static"));
        assert!(cfg.allowed_users.is_none());
        assert_eq!(cfg.secret_key.len(), 64);
    }

    #[test]
    fn overrides_and_lists() {
        let cfg = config(&[
            ("PUBLIC_URL", "https://inv.example.com/"),
            ("ALLOWED_USERS", " alice, ,bob "),
            ("SECRET_KEY", "s3cret"),
        ])
        .unwrap();
        assert_eq!(cfg.public_url, "https://inv.example.com");
        assert_eq!(cfg.allowed_users, Some(vec!["alice".to_string(), "bob".to_string()]));
        assert_eq!(cfg.secret_key, "s3cret");
        assert!(!format!("{cfg:?}").contains("s3cret"));
    }

    #[test]
    fn bad_bind_addr_is_an_error() {
        assert!(config(&[("BIND_ADDR", "nope")]).is_err());
    }
}
