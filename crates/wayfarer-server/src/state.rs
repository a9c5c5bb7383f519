//! Shared application state for the catalog API.
//!
//! [`AppState`] owns the catalog (over the file-backed stores) and the
//! collaborators the write path consults before a payload reaches it:
//! the sanitizer, the geocoder and the authenticator. Nothing here caches
//! catalog data; every request reads storage afresh.
//!
//! Catalog operations touch the filesystem synchronously, so handlers reach
//! the catalog through [`AppState::with_catalog`], which runs them on
//! tokio's blocking pool.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::HOST;
use tracing::{debug, info};
use wayfarer_catalog::{Catalog, CatalogError};
use wayfarer_store::{ArrayFileStore, DirectoryStore};
use wayfarer_types::{Attraction, AttractionDraft, AttractionPatch, Patch, Route};

use crate::auth::Authenticator;
use crate::config::WayfarerConfig;
use crate::error::ApiError;
use crate::geocode::{GeocodeError, Geocoder};
use crate::sanitize::Sanitizer;

/// The catalog as the server runs it: one directory per attraction plus a
/// routes array file.
pub type FileCatalog = Catalog<DirectoryStore<Attraction>, ArrayFileStore<Route>>;

/// Shared state for all request handlers.
#[derive(Debug)]
pub struct AppState {
    /// Catalog operations over the data directory.
    pub catalog: FileCatalog,
    /// Directory served under `/static/attractions`.
    pub attractions_dir: PathBuf,
    /// Configured public base URL, without a trailing slash.
    pub public_url: Option<String>,
    /// Fallback authority when a request has no `Host` header.
    pub listen_authority: String,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
    /// Rich-text cleaner.
    pub sanitizer: Sanitizer,
    /// Address lookup.
    pub geocoder: Geocoder,
    /// Write-endpoint guard.
    pub auth: Authenticator,
}

impl AppState {
    /// Build the state described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the geocoding client cannot be built.
    pub fn from_config(config: &WayfarerConfig) -> Result<Self, GeocodeError> {
        let attractions_dir = config.storage.attractions_dir();
        let catalog = Catalog::new(
            DirectoryStore::new(&attractions_dir),
            ArrayFileStore::new(config.storage.routes_file()),
        );
        let geocoder = Geocoder::from_config(&config.geocoding)?;
        let auth = Authenticator::new(&config.auth);

        info!(
            data_dir = %config.storage.data_dir.display(),
            geocoder = geocoder.name(),
            auth_enabled = auth.is_enabled(),
            "Application state initialized"
        );

        Ok(Self {
            catalog,
            attractions_dir,
            public_url: config
                .server
                .public_url
                .as_deref()
                .map(|u| u.trim_end_matches('/').to_owned()),
            listen_authority: format!("{}:{}", config.server.host, config.server.port),
            max_upload_bytes: config.server.max_upload_bytes,
            sanitizer: Sanitizer::new(&config.sanitizer),
            geocoder,
            auth,
        })
    }

    /// Run a catalog operation on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns the operation's error converted to [`ApiError`], or
    /// [`ApiError::Internal`] if the blocking task panicked or was
    /// cancelled.
    pub async fn with_catalog<F, T>(self: &Arc<Self>, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&FileCatalog) -> Result<T, CatalogError> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        let result = tokio::task::spawn_blocking(move || op(&state.catalog))
            .await
            .map_err(|e| ApiError::Internal(format!("catalog task failed: {e}")))?;
        result.map_err(ApiError::from)
    }

    /// Base URL for asset links in responses to a request with `headers`.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(public_url) = &self.public_url {
            return public_url.clone();
        }
        let host = headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .filter(|h| !h.is_empty())
            .unwrap_or(&self.listen_authority);
        format!("http://{}", host.trim_end_matches('/'))
    }

    /// Sanitize and geocode a creation payload.
    pub async fn prepare_draft(&self, draft: &mut AttractionDraft) {
        draft.map_rich_text(|text| self.sanitizer.clean(text));
        if draft.location.is_none() {
            if let Some(address) = draft.address.as_deref() {
                draft.location = self.geocoder.geocode(address).await;
                debug!(address, resolved = draft.location.is_some(), "draft geocoded");
            }
        }
    }

    /// Sanitize and geocode an update payload. A new address is geocoded
    /// only when the payload does not also say what the location is.
    pub async fn prepare_patch(&self, patch: &mut AttractionPatch) {
        patch.map_rich_text(|text| self.sanitizer.clean(text));
        if patch.location.is_keep() {
            if let Some(address) = patch.address.as_set() {
                if let Some(point) = self.geocoder.geocode(address).await {
                    patch.location = Patch::Set(point);
                }
            }
        }
    }
}
