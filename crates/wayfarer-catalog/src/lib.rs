//! The Wayfarer attraction catalog.
//!
//! Everything between storage and the HTTP layer lives here:
//!
//! - [`enrich`] -- rewrites relative asset references into absolute URLs
//! - [`filter`] -- keyword, area and theme filters
//! - [`compose`] -- resolves a route's attraction ids
//! - [`nearest`] -- Haversine distance and the nearest-neighbor tour
//! - [`slug`] -- storage keys derived from names
//! - [`merge`] -- applies create and update payloads to documents
//! - [`service`] -- the [`Catalog`] operations on top of the stores
//!
//! The catalog does no network I/O. Geocoding and sanitizing of payloads
//! happen before a payload reaches it.

pub mod compose;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod merge;
pub mod nearest;
pub mod service;
pub mod slug;

pub use enrich::{asset_base, enrich_attraction, is_absolute_url};
pub use error::CatalogError;
pub use filter::AttractionFilter;
pub use nearest::{EARTH_RADIUS_KM, haversine_km};
pub use service::Catalog;
pub use slug::slugify;
