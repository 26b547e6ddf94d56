use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use binventory_core::{ItemId, ItemPatch, NewItem};

use crate::app::dto::{ItemListParams, MessageResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

fn parse_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    raw.parse::<ItemId>().map_err(errors::domain_error_to_response)
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<ItemListParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services.store.list_items(params.into()).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<NewItem>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.store.create_item(body).await {
        Ok(item) => {
            tracing::info!(item_id = %item.id, user = user.username(), "item created");
            (StatusCode::CREATED, Json(item)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.store.get_item(id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    body: Result<Json<ItemPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.store.update_item(id, patch).await {
        Ok(item) => {
            tracing::info!(item_id = %id, user = user.username(), "item updated");
            Json(item).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.store.delete_item(id).await {
        Ok(()) => {
            tracing::info!(item_id = %id, user = user.username(), "item deleted");
            Json(MessageResponse {
                message: "Item deleted successfully",
            })
            .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
