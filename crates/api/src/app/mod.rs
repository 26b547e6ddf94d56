//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, token and OAuth wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: query strings and small response bodies
//! - `errors.rs`: consistent error responses

use std::{path::Path, sync::Arc};

use axum::{
    http::{HeaderValue, Method, header},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod oauth_state;
pub mod routes;
pub mod services;

pub use services::{ApiSettings, AppServices, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
    };
    let cors = cors_layer(&services.settings.frontend_url);
    let static_dir = services.settings.static_files_dir.clone();
    let services = Arc::new(services);

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let api = Router::new()
        .route("/healthcheck", get(routes::system::healthcheck))
        .nest("/auth", routes::auth::router())
        // The legacy page scripts fetch these without a token.
        .merge(routes::legacy::router())
        .merge(protected)
        .layer(Extension(services));

    let app = Router::new().nest("/api", api);
    let app = match static_dir {
        Some(dir) if dir.is_dir() => with_static_files(app, &dir),
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "static files directory not found; serving API only");
            app
        }
        None => app,
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

/// Serve the built client, falling back to `index.html` for client-side routes.
fn with_static_files(app: Router, dir: &Path) -> Router {
    let index = ServeFile::new(dir.join("index.html"));
    app.fallback_service(ServeDir::new(dir).fallback(index))
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, frontend_url, "FRONTEND_URL is not a valid origin; cross-origin requests disabled");
            cors
        }
    }
}
