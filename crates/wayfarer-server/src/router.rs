//! Axum router construction for the catalog API.
//!
//! Assembles the REST routes and the static asset service into a single
//! [`Router`] with CORS enabled for browser clients.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use wayfarer_catalog::enrich::STATIC_PREFIX;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` and `GET /health`
/// - `/api/attractions` and `/api/attractions/{id}` (read, write)
/// - `POST /api/attractions/{id}/images` -- multipart asset upload
/// - `/api/routes` and `/api/routes/{id}` (read, write)
/// - `POST /api/routes/custom` -- nearest-neighbor plan
/// - `POST /api/auth/login`
/// - `GET /static/attractions/...` -- files from the attractions directory
///
/// Request bodies are capped at the configured upload size.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(&state.attractions_dir);
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Attractions
        .route(
            "/api/attractions",
            get(handlers::list_attractions).post(handlers::create_attraction),
        )
        .route(
            "/api/attractions/{id}",
            get(handlers::get_attraction)
                .put(handlers::update_attraction)
                .delete(handlers::delete_attraction),
        )
        .route(
            "/api/attractions/{id}/images",
            post(handlers::upload_attraction_image),
        )
        // Routes
        .route(
            "/api/routes",
            get(handlers::list_routes).post(handlers::create_route),
        )
        .route("/api/routes/custom", post(handlers::plan_custom_route))
        .route(
            "/api/routes/{id}",
            get(handlers::get_route)
                .put(handlers::update_route)
                .delete(handlers::delete_route),
        )
        // Auth
        .route("/api/auth/login", post(handlers::login))
        // Assets
        .nest_service(STATIC_PREFIX, assets)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
