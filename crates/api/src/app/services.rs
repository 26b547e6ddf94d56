//! Shared services handed to every handler.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;

use binventory_auth::{GitHubOAuth, Hs256TokenService, OAuthProvider, TokenService};
use binventory_infra::{AppConfig, InventoryStore, SqliteInventoryStore, db};

use crate::app::oauth_state::OAuthStateStore;

/// Deployment settings the handlers consult.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub frontend_url: String,
    /// Where the OAuth provider sends the browser back to.
    pub oauth_redirect_uri: String,
    pub allowed_users: Option<Vec<String>>,
    pub static_files_dir: Option<PathBuf>,
}

impl ApiSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            frontend_url: config.frontend_url.clone(),
            oauth_redirect_uri: config.oauth_redirect_uri(),
            allowed_users: config.allowed_users.clone(),
            static_files_dir: Some(config.static_files_dir.clone()),
        }
    }

    pub fn is_allowed(&self, login: &str) -> bool {
        match &self.allowed_users {
            Some(users) => users.iter().any(|u| u.eq_ignore_ascii_case(login)),
            None => true,
        }
    }
}

#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn InventoryStore>,
    pub tokens: Arc<dyn TokenService>,
    pub oauth: Arc<dyn OAuthProvider>,
    pub oauth_states: OAuthStateStore,
    pub settings: ApiSettings,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        tokens: Arc<dyn TokenService>,
        oauth: Arc<dyn OAuthProvider>,
        settings: ApiSettings,
    ) -> Self {
        Self {
            store,
            tokens,
            oauth,
            oauth_states: OAuthStateStore::default(),
            settings,
        }
    }
}

/// Open the database and wire the production services.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let pool = db::connect(&config.database_url)
        .await
        .context("failed to initialise the inventory database")?;

    Ok(AppServices::new(
        Arc::new(SqliteInventoryStore::new(pool)),
        Arc::new(Hs256TokenService::new(config.secret_key.as_bytes())),
        Arc::new(GitHubOAuth::new(
            config.github_client_id.clone(),
            config.github_client_secret.clone(),
        )),
        ApiSettings::from_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list() {
        let mut settings = ApiSettings {
            frontend_url: "http://localhost:3000".into(),
            oauth_redirect_uri: "http://localhost:8000/api/auth/callback".into(),
            allowed_users: None,
            static_files_dir: None,
        };
        assert!(settings.is_allowed("anyone"));

        settings.allowed_users = Some(vec!["Octocat".into()]);
        assert!(settings.is_allowed("octocat"));
        assert!(!settings.is_allowed("mallory"));
    }
}
