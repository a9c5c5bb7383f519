//! HTTP API for the Wayfarer attraction catalog.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Attraction endpoints** for listing, filtering, reading and (as an
//!   admin) creating, updating, deleting and attaching images
//! - **Route endpoints** for curated routes and nearest-neighbor plans
//! - **Static assets** under `/static/attractions/{dir}/{file}`
//! - **Login** exchanging admin credentials for a bearer token
//!
//! # Architecture
//!
//! Handlers are thin: they parse the request, let [`AppState`] sanitize
//! and geocode write payloads, then call into
//! [`wayfarer_catalog::Catalog`]. Every read goes to storage, so edits
//! made on disk are visible on the next request.

pub mod auth;
pub mod config;
pub mod error;
pub mod geocode;
pub mod handlers;
pub mod router;
pub mod sanitize;
pub mod server;
pub mod state;
pub mod upload;

// Re-export primary types for convenience.
pub use config::{ConfigError, DEFAULT_CONFIG_FILE, WayfarerConfig};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
