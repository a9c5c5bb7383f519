//! REST API endpoint handlers.
//!
//! Every attraction leaving through these handlers is enriched: asset
//! references become absolute URLs rooted at the request's base URL.
//! Write handlers sanitize rich text and geocode addresses before the
//! payload reaches the catalog. Catalog calls run on the blocking pool
//! via [`AppState::with_catalog`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Plain-text banner |
//! | `GET` | `/health` | Liveness check |
//! | `GET` | `/api/attractions` | Filtered list (`keyword`, `area`, `theme`) |
//! | `GET` | `/api/attractions/{id}` | Single attraction |
//! | `POST` | `/api/attractions` | Create (admin) |
//! | `PUT` | `/api/attractions/{id}` | Partial update (admin) |
//! | `DELETE` | `/api/attractions/{id}` | Delete with assets (admin) |
//! | `POST` | `/api/attractions/{id}/images` | Upload an asset (admin) |
//! | `GET` | `/api/routes` | Stored routes |
//! | `GET` | `/api/routes/{id}` | Route with resolved attractions |
//! | `POST` | `/api/routes` | Create (admin) |
//! | `PUT` | `/api/routes/{id}` | Partial update (admin) |
//! | `DELETE` | `/api/routes/{id}` | Delete (admin) |
//! | `POST` | `/api/routes/custom` | Nearest-neighbor plan |
//! | `POST` | `/api/auth/login` | Exchange credentials for a token |

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use wayfarer_catalog::{AttractionFilter, asset_base, enrich_attraction};
use wayfarer_types::{
    AttractionDraft, AttractionId, AttractionPatch, PlanRequest, RouteDraft, RouteId, RoutePatch,
};

use crate::auth::Admin;
use crate::error::ApiError;
use crate::state::{AppState, FileCatalog};
use crate::upload::read_upload;

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin user name.
    #[serde(default)]
    pub username: String,
    /// Admin password.
    #[serde(default)]
    pub password: String,
}

fn parse_id<T>(raw: &str, kind: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| ApiError::InvalidInput(format!("invalid {kind} id {raw:?}: {e}")))
}

// ---------------------------------------------------------------------------
// Service endpoints
// ---------------------------------------------------------------------------

/// Plain-text banner.
pub async fn index() -> &'static str {
    "Wayfarer catalog API is running.\n"
}

/// Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Attractions
// ---------------------------------------------------------------------------

/// List attractions, optionally filtered.
///
/// # Query Parameters
///
/// - `keyword`: case-insensitive substring of the name or description
/// - `area`: exact area
/// - `theme`: tag the attraction must carry
pub async fn list_attractions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<AttractionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let base_url = state.base_url(&headers);
    let attractions = state
        .with_catalog(move |catalog| catalog.list_attractions(&filter, &base_url))
        .await?;
    Ok(Json(attractions))
}

/// Return one attraction.
pub async fn get_attraction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: AttractionId = parse_id(&id_str, "attraction")?;
    let base_url = state.base_url(&headers);
    let attraction = state
        .with_catalog(move |catalog| catalog.get_attraction(id, &base_url))
        .await?;
    Ok(Json(attraction))
}

/// Create an attraction.
pub async fn create_attraction(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    headers: HeaderMap,
    payload: Result<Json<AttractionDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut draft) = payload?;
    state.prepare_draft(&mut draft).await;

    let created = state
        .with_catalog(move |catalog| catalog.create_attraction(draft))
        .await?;
    let base_url = state.base_url(&headers);
    Ok((StatusCode::CREATED, Json(enrich_attraction(created, &base_url))))
}

/// Shallow-merge an update into an attraction.
pub async fn update_attraction(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    headers: HeaderMap,
    Path(id_str): Path<String>,
    payload: Result<Json<AttractionPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: AttractionId = parse_id(&id_str, "attraction")?;
    let Json(mut patch) = payload?;
    state.prepare_patch(&mut patch).await;

    let updated = state
        .with_catalog(move |catalog| catalog.update_attraction(id, patch))
        .await?;
    let base_url = state.base_url(&headers);
    Ok(Json(enrich_attraction(updated, &base_url)))
}

/// Delete an attraction and its assets.
pub async fn delete_attraction(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: AttractionId = parse_id(&id_str, "attraction")?;
    state
        .with_catalog(move |catalog| catalog.delete_attraction(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Store an uploaded file next to an attraction.
///
/// Responds with the relative `file_name` to put into `image_url` or a
/// markdown image, and the absolute `url` it is served from.
pub async fn upload_attraction_image(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    headers: HeaderMap,
    Path(id_str): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let id: AttractionId = parse_id(&id_str, "attraction")?;
    let upload = read_upload(multipart).await?;

    let (attraction, file_name) = state
        .with_catalog(move |catalog| {
            catalog.store_attraction_asset(id, &upload.file_name, &upload.bytes)
        })
        .await?;
    let url = format!(
        "{}{file_name}",
        asset_base(&state.base_url(&headers), &attraction.dir_name)
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "file_name": file_name,
            "url": url,
        })),
    ))
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// List stored routes without resolving their attractions.
pub async fn list_routes(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let routes = state.with_catalog(FileCatalog::list_routes).await?;
    Ok(Json(routes))
}

/// Return a route with its attractions resolved in order.
pub async fn get_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: RouteId = parse_id(&id_str, "route")?;
    let base_url = state.base_url(&headers);
    let view = state
        .with_catalog(move |catalog| catalog.get_route(id, &base_url))
        .await?;
    Ok(Json(view))
}

/// Create a route.
pub async fn create_route(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    payload: Result<Json<RouteDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = payload?;
    let created = state
        .with_catalog(move |catalog| catalog.create_route(draft))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Shallow-merge an update into a route.
pub async fn update_route(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id_str): Path<String>,
    payload: Result<Json<RoutePatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: RouteId = parse_id(&id_str, "route")?;
    let Json(patch) = payload?;
    let updated = state
        .with_catalog(move |catalog| catalog.update_route(id, patch))
        .await?;
    Ok(Json(updated))
}

/// Delete a route.
pub async fn delete_route(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: RouteId = parse_id(&id_str, "route")?;
    state
        .with_catalog(move |catalog| catalog.delete_route(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Order a set of attractions into a proposed route. Nothing is stored.
pub async fn plan_custom_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let base_url = state.base_url(&headers);
    let plan = state
        .with_catalog(move |catalog| catalog.plan_route(&request.attraction_ids, &base_url))
        .await?;
    Ok(Json(plan))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Exchange admin credentials for the bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let token = state.auth.login(&request.username, &request.password)?;
    tracing::info!(username = %request.username, "admin logged in");
    Ok(Json(serde_json::json!({
        "message": "Login successful",
        "token": token.to_string(),
    })))
}
