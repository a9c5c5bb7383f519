//! Catalog entity structs and read-side projections.
//!
//! [`Attraction`] and [`Route`] mirror the JSON documents kept on disk.
//! Both are open-ended: keys the catalog does not model are kept in an
//! `extra` map and written back untouched.
//!
//! [`RouteView`] and [`ProposedRoute`] only exist on the way out of the
//! system. They are separate types so a derived attraction list can never
//! end up in a stored route document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{AttractionId, RouteId};

/// Additional document keys preserved verbatim.
pub type ExtraFields = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// GeoPoint
// ---------------------------------------------------------------------------

/// A position on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

// ---------------------------------------------------------------------------
// Attraction
// ---------------------------------------------------------------------------

/// A tourist attraction as stored in its `data.json` document.
///
/// `image_url` and any markdown images inside the descriptions are stored
/// relative to the attraction's storage directory. They become absolute URLs
/// only when the attraction is enriched on its way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Attraction {
    /// Server-assigned identifier.
    pub id: AttractionId,
    /// Display name (primary language).
    pub name: String,
    /// Display name in English.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    /// Freeform description, may embed markdown images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Freeform English description, may embed markdown images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    /// Administrative area the attraction belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Theme tags.
    #[serde(default)]
    pub theme: Vec<String>,
    /// Geographic position, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Street address used for geocoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Main image, relative on disk and absolute after enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Storage key: the directory holding this attraction's document and
    /// assets. Assigned once at creation.
    #[serde(default)]
    pub dir_name: String,
    /// Document keys not modelled above.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: ExtraFields,
}

impl Attraction {
    /// Whether `tag` is one of this attraction's themes.
    pub fn has_theme(&self, tag: &str) -> bool {
        self.theme.iter().any(|t| t == tag)
    }
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// A curated route as stored in the routes array file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Route {
    /// Server-assigned identifier.
    pub id: RouteId,
    /// Display name.
    pub name: String,
    /// Freeform description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attractions in visiting order. Ids that no longer resolve are
    /// skipped when the route is read.
    #[serde(default)]
    pub attraction_ids: Vec<AttractionId>,
    /// Document keys not modelled above (duration tags and the like).
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: ExtraFields,
}

/// A route together with its resolved attractions.
///
/// Produced at read time only.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RouteView {
    /// The stored route.
    #[serde(flatten)]
    pub route: Route,
    /// Enriched attractions in the order of `route.attraction_ids`.
    pub attractions: Vec<Attraction>,
}

/// An unpersisted route ordered by the nearest-neighbor heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProposedRoute {
    /// Generated display name.
    pub name: String,
    /// Generated description.
    pub description: String,
    /// Ids of the visited attractions, in visiting order.
    pub attraction_ids: Vec<AttractionId>,
    /// Enriched attractions, in visiting order.
    pub attractions: Vec<Attraction>,
    /// Great-circle distance of each hop in kilometres. One entry fewer
    /// than `attractions`.
    pub legs_km: Vec<f64>,
    /// Sum of `legs_km`.
    pub total_distance_km: f64,
}
