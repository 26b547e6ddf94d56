//! GitHub login: redirect out, then trade the callback code for our own token.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Query, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::get,
};
use chrono::Utc;

use crate::app::dto::OAuthCallbackParams;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
}

pub async fn login(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let state = services.oauth_states.issue();
    match services
        .oauth
        .authorize_url(&services.settings.oauth_redirect_uri, &state)
    {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => errors::oauth_error_to_response(e),
    }
}

pub async fn callback(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<OAuthCallbackParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    if let Some(error) = params.error {
        let message = params.error_description.unwrap_or(error);
        return errors::json_error(StatusCode::BAD_REQUEST, "oauth_denied", message);
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_code",
            "authorization code is missing",
        );
    };

    let state_ok = params
        .state
        .as_deref()
        .is_some_and(|s| services.oauth_states.consume(s));
    if !state_ok {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_state",
            "login state is missing, expired or already used",
        );
    }

    let login = match services
        .oauth
        .authenticate(&code, &services.settings.oauth_redirect_uri)
        .await
    {
        Ok(login) => login,
        Err(e) => return errors::oauth_error_to_response(e),
    };

    if !services.settings.is_allowed(&login) {
        tracing::warn!(login = %login, "login refused: user not in ALLOWED_USERS");
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "this account is not allowed to sign in",
        );
    }

    let token = match services.tokens.issue(&login, Utc::now()) {
        Ok(t) => t,
        Err(e) => return errors::token_error_to_response(e),
    };

    tracing::info!(login = %login, "user signed in");
    let frontend = services.settings.frontend_url.trim_end_matches('/');
    Redirect::to(&format!("{frontend}/login?access_token={token}")).into_response()
}
