use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use binventory_auth::{OAuthError, TokenError};
use binventory_core::DomainError;
use binventory_infra::StoreError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Database { .. } => {
            tracing::error!(error = %err, "database failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "internal database error",
            )
        }
    }
}

pub fn oauth_error_to_response(err: OAuthError) -> axum::response::Response {
    tracing::warn!(error = %err, "oauth login failed");
    match err {
        OAuthError::Endpoint(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "oauth_misconfigured",
            "login provider is misconfigured",
        ),
        OAuthError::Rejected(msg) => json_error(StatusCode::BAD_GATEWAY, "oauth_rejected", msg),
        OAuthError::Transport(_) => json_error(
            StatusCode::BAD_GATEWAY,
            "oauth_unavailable",
            "login provider could not be reached",
        ),
    }
}

pub fn token_error_to_response(err: TokenError) -> axum::response::Response {
    tracing::error!(error = %err, "failed to issue session token");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "token_error",
        "could not issue a session token",
    )
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let res = domain_error_to_response(DomainError::validation("name cannot be empty"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = domain_error_to_response(DomainError::invalid_id("x"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = store_error_to_response(DomainError::not_found("Item").into());
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_are_opaque() {
        let res = store_error_to_response(StoreError::Database {
            operation: "list_items",
            source: sqlx_error(),
        });
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn provider_failures_are_bad_gateway() {
        let res = oauth_error_to_response(OAuthError::Rejected("bad_verification_code".into()));
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    fn sqlx_error() -> binventory_infra::store::SqlxError {
        binventory_infra::store::SqlxError::PoolClosed
    }
}
