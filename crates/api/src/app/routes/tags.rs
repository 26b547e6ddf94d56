use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tags))
        .route("/:tag", get(get_tag))
}

pub async fn list_tags(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.list_tags().await {
        Ok(tags) => Json(tags).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_tag(
    Extension(services): Extension<Arc<AppServices>>,
    Path(tag): Path<String>,
) -> axum::response::Response {
    match services.store.tag_detail(&tag).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
