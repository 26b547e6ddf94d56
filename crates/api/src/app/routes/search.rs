use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query, rejection::QueryRejection},
    response::IntoResponse,
    routing::get,
};

use crate::app::dto::AutocompleteParams;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/autocomplete", get(autocomplete))
}

/// Grouped suggestions for the global search box.
pub async fn autocomplete(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<AutocompleteParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services.store.autocomplete(&params.q, params.limit()).await {
        Ok(groups) => Json(groups).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
