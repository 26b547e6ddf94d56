use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::dto::{HealthResponse, WhoAmIResponse};
use crate::context::UserContext;

pub async fn healthcheck() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

pub async fn whoami(Extension(user): Extension<UserContext>) -> impl IntoResponse {
    Json(WhoAmIResponse {
        username: user.username().to_string(),
    })
}
