//! Write payloads for creating and updating catalog entities.
//!
//! Updates are partial: every optional field is a [`Patch`] so a payload can
//! tell apart "leave this alone" (key omitted), "clear it" (`null`) and
//! "replace it" (any other value). `{"theme": []}` replaces the tags with an
//! empty list; `{"theme": null}` clears them; omitting `theme` keeps them.
//!
//! Keys the payload structs do not model are collected into `extra` and
//! shallow-merged into the stored document.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::AttractionId;
use crate::structs::{ExtraFields, GeoPoint};

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A single field of a partial update.
///
/// Use with `#[serde(default)]` so that a missing key becomes [`Patch::Keep`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was omitted. Leave the stored value alone.
    #[default]
    Keep,
    /// The key was present with `null`. Remove the stored value.
    Clear,
    /// The key was present with a value. Replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    /// Whether the field was omitted.
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Apply this patch to an optional stored value.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *target = None,
            Self::Set(value) => *target = Some(value),
        }
    }

    /// Borrow the carried value, if any.
    pub const fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Keep | Self::Clear => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Self::Clear, Self::Set))
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Keep | Self::Clear => serializer.serialize_none(),
            Self::Set(value) => serializer.serialize_some(value),
        }
    }
}

// ---------------------------------------------------------------------------
// Attraction payloads
// ---------------------------------------------------------------------------

/// Payload for creating an attraction.
///
/// `name` is optional at the type level so a missing name is reported as
/// invalid input by the catalog rather than as a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttractionDraft {
    /// Display name. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display name in English.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    /// Freeform description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Freeform English description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    /// Administrative area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Theme tags.
    #[serde(default)]
    pub theme: Vec<String>,
    /// Geographic position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Street address, geocoded when `location` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Main image, relative to the attraction's storage directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Any other document keys.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl AttractionDraft {
    /// Apply `f` to the rich-text fields (`description`, `description_en`).
    pub fn map_rich_text(&mut self, mut f: impl FnMut(&str) -> String) {
        for field in [&mut self.description, &mut self.description_en] {
            if let Some(text) = field.as_mut() {
                *text = f(text);
            }
        }
    }
}

/// Payload for a partial attraction update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttractionPatch {
    /// New display name. `null` is rejected by the catalog.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub name: Patch<String>,
    /// New English display name.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub name_en: Patch<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub description: Patch<String>,
    /// New English description.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub description_en: Patch<String>,
    /// New area.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub area: Patch<String>,
    /// New theme tags. `null` and `[]` both leave the attraction untagged.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub theme: Patch<Vec<String>>,
    /// New position.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub location: Patch<GeoPoint>,
    /// New street address.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub address: Patch<String>,
    /// New main image.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub image_url: Patch<String>,
    /// Other keys to merge. A `null` value removes the key.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl AttractionPatch {
    /// Whether the payload changes nothing at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_keep()
            && self.name_en.is_keep()
            && self.description.is_keep()
            && self.description_en.is_keep()
            && self.area.is_keep()
            && self.theme.is_keep()
            && self.location.is_keep()
            && self.address.is_keep()
            && self.image_url.is_keep()
            && self.extra.is_empty()
    }

    /// Apply `f` to the rich-text fields (`description`, `description_en`)
    /// when they are being set.
    pub fn map_rich_text(&mut self, mut f: impl FnMut(&str) -> String) {
        for field in [&mut self.description, &mut self.description_en] {
            if let Patch::Set(text) = field {
                *text = f(text);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Route payloads
// ---------------------------------------------------------------------------

/// Payload for creating a curated route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteDraft {
    /// Display name. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Freeform description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attractions in visiting order.
    #[serde(default)]
    pub attraction_ids: Vec<AttractionId>,
    /// Any other document keys.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Payload for a partial route update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePatch {
    /// New display name. `null` is rejected by the catalog.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub name: Patch<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub description: Patch<String>,
    /// New attraction order. `null` empties the route.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub attraction_ids: Patch<Vec<AttractionId>>,
    /// Other keys to merge. A `null` value removes the key.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl RoutePatch {
    /// Whether the payload changes nothing at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_keep()
            && self.description.is_keep()
            && self.attraction_ids.is_keep()
            && self.extra.is_empty()
    }
}

/// Request body for composing a custom route from a set of attractions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Attractions to visit, in any order. The first one starts the tour.
    #[serde(default)]
    pub attraction_ids: Vec<AttractionId>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn omitted_null_and_value_are_distinct() {
        let patch: AttractionPatch =
            serde_json::from_str(r#"{"area": null, "theme": [], "name_en": "Bund"}"#).unwrap();

        assert_eq!(patch.name, Patch::Keep);
        assert_eq!(patch.area, Patch::Clear);
        assert_eq!(patch.theme, Patch::Set(Vec::new()));
        assert_eq!(patch.name_en, Patch::Set(String::from("Bund")));
        assert!(patch.extra.is_empty());
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let patch: AttractionPatch =
            serde_json::from_str(r#"{"opening_hours": "9-17", "ticket": null}"#).unwrap();

        assert_eq!(patch.extra.len(), 2);
        assert_eq!(patch.extra["opening_hours"], "9-17");
        assert!(patch.extra["ticket"].is_null());
        assert!(!patch.is_empty());
    }

    #[test]
    fn empty_body_is_empty_patch() {
        let patch: AttractionPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());

        let route_patch: RoutePatch = serde_json::from_str("{}").unwrap();
        assert!(route_patch.is_empty());
    }

    #[test]
    fn apply_to_option() {
        let mut value = Some(String::from("old"));
        Patch::Keep.apply_to(&mut value);
        assert_eq!(value.as_deref(), Some("old"));

        Patch::Set(String::from("new")).apply_to(&mut value);
        assert_eq!(value.as_deref(), Some("new"));

        Patch::Clear.apply_to(&mut value);
        assert!(value.is_none());
    }

    #[test]
    fn keep_fields_are_not_serialized() {
        let patch = RoutePatch {
            name: Patch::Set(String::from("Riverside")),
            description: Patch::Clear,
            ..RoutePatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json["name"], "Riverside");
        assert!(json["description"].is_null());
        assert!(json.get("attraction_ids").is_none());
    }

    #[test]
    fn rich_text_mapping_only_touches_descriptions() {
        let mut patch = AttractionPatch {
            name: Patch::Set(String::from("<b>x</b>")),
            description: Patch::Set(String::from("<b>y</b>")),
            ..AttractionPatch::default()
        };
        patch.map_rich_text(|s| s.to_uppercase());

        assert_eq!(patch.name, Patch::Set(String::from("<b>x</b>")));
        assert_eq!(patch.description, Patch::Set(String::from("<B>Y</B>")));
    }
}
