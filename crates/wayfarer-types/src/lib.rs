//! Shared type definitions for the Wayfarer attraction catalog.
//!
//! This crate is the single source of truth for the documents the catalog
//! stores and serves. Read-side types flow downstream to `TypeScript` via
//! `ts-rs` for the web frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Integer id newtypes for attractions and routes
//! - [`structs`] -- Stored documents and read-side projections
//! - [`payloads`] -- Create/update payloads with tri-state patch fields

pub mod ids;
pub mod payloads;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::{AttractionId, RouteId};
pub use payloads::{AttractionDraft, AttractionPatch, Patch, PlanRequest, RouteDraft, RoutePatch};
pub use structs::{Attraction, ExtraFields, GeoPoint, ProposedRoute, Route, RouteView};
