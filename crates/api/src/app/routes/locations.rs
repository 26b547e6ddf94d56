//! Area → container → bin browsing.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    response::IntoResponse,
    routing::get,
};

use crate::app::dto::{AreaFilter, BinFilter};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/areas", get(list_areas))
        .route("/areas/:area", get(get_area))
        .route("/containers", get(list_containers))
        .route("/containers/:name", get(get_container))
        .route("/bins", get(list_bins))
        .route("/bins/:name", get(get_bin))
}

pub async fn list_areas(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.list_areas().await {
        Ok(areas) => Json(areas).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_area(
    Extension(services): Extension<Arc<AppServices>>,
    Path(area): Path<String>,
) -> axum::response::Response {
    match services.store.area_detail(&area).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_containers(
    Extension(services): Extension<Arc<AppServices>>,
    filter: Result<Query<AreaFilter>, QueryRejection>,
) -> axum::response::Response {
    let Query(filter) = match filter {
        Ok(f) => f,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services.store.list_containers(filter.area.as_deref()).await {
        Ok(containers) => Json(containers).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_container(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    filter: Result<Query<AreaFilter>, QueryRejection>,
) -> axum::response::Response {
    let Query(filter) = match filter {
        Ok(f) => f,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services
        .store
        .container_detail(&name, filter.area.as_deref())
        .await
    {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_bins(
    Extension(services): Extension<Arc<AppServices>>,
    filter: Result<Query<BinFilter>, QueryRejection>,
) -> axum::response::Response {
    let Query(filter) = match filter {
        Ok(f) => f,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services
        .store
        .list_bins(filter.area.as_deref(), filter.container.as_deref())
        .await
    {
        Ok(bins) => Json(bins).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_bin(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    filter: Result<Query<BinFilter>, QueryRejection>,
) -> axum::response::Response {
    let Query(filter) = match filter {
        Ok(f) => f,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services
        .store
        .bin_detail(&name, filter.area.as_deref(), filter.container.as_deref())
        .await
    {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
