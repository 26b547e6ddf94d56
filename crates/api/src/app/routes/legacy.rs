//! Endpoints kept for the older page scripts.

use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};

use crate::app::dto::SuggestionsResponse;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/search-suggestions", get(search_suggestions))
        .route("/locations", get(locations))
}

pub async fn search_suggestions(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store.search_vocabulary().await {
        Ok(suggestions) => Json(SuggestionsResponse { suggestions }).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn locations(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.location_names().await {
        Ok(names) => Json(names).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
