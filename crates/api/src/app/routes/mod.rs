use axum::{Router, routing::get};

pub mod auth;
pub mod items;
pub mod legacy;
pub mod locations;
pub mod search;
pub mod system;
pub mod tags;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/items", items::router())
        .nest("/search", search::router())
        .nest("/tags", tags::router())
        .merge(locations::router())
}
