//! Turning write payloads into stored documents.
//!
//! Server-assigned keys are never taken from a payload: `id` and `dir_name`
//! for attractions, `id` and the derived `attractions` list for routes.
//! They are dropped from the payload's extra keys before anything else
//! looks at it, so a body that only tries to set them is an empty update.
//! Routes read back from storage get the same treatment, since a
//! hand-edited file can carry them too.

use std::collections::HashSet;

use wayfarer_types::{
    Attraction, AttractionDraft, AttractionId, AttractionPatch, ExtraFields, Patch, Route,
    RouteDraft, RouteId, RoutePatch,
};

use crate::error::CatalogError;

/// Keys a client may not write on an attraction.
pub const ATTRACTION_RESERVED_KEYS: &[&str] = &["id", "dir_name"];

/// Keys a client may not write on a route.
pub const ROUTE_RESERVED_KEYS: &[&str] = &["id", "attractions"];

fn strip_reserved(extra: &mut ExtraFields, reserved: &[&str]) {
    extra.retain(|key, _| !reserved.contains(&key.as_str()));
}

/// Drop reserved keys that a stored route carries among its extra fields.
pub fn scrub_stored_route(route: &mut Route) {
    strip_reserved(&mut route.extra, ROUTE_RESERVED_KEYS);
}

/// Shallow-merge `incoming` into `target`. A `null` value removes the key.
fn merge_extra(target: &mut ExtraFields, incoming: ExtraFields) {
    for (key, value) in incoming {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

/// Theme tags with blanks and repeats removed, first occurrence kept.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tags.len());
    tags.into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

fn required_name(name: Option<String>) -> Result<String, CatalogError> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(CatalogError::InvalidInput(String::from("name is required"))),
    }
}

fn patched_name(name: Patch<String>, current: &mut String) -> Result<(), CatalogError> {
    match name {
        Patch::Keep => Ok(()),
        Patch::Clear => Err(CatalogError::InvalidInput(String::from(
            "name cannot be removed",
        ))),
        Patch::Set(name) => {
            *current = required_name(Some(name))?;
            Ok(())
        }
    }
}

/// Build a new attraction from a creation payload.
pub fn attraction_from_draft(
    id: AttractionId,
    dir_name: String,
    draft: AttractionDraft,
) -> Result<Attraction, CatalogError> {
    let AttractionDraft {
        name,
        name_en,
        description,
        description_en,
        area,
        theme,
        location,
        address,
        image_url,
        mut extra,
    } = draft;
    strip_reserved(&mut extra, ATTRACTION_RESERVED_KEYS);
    // Unknown keys that are null carry nothing worth storing.
    extra.retain(|_, value| !value.is_null());

    Ok(Attraction {
        id,
        name: required_name(name)?,
        name_en,
        description,
        description_en,
        area,
        theme: normalize_tags(theme),
        location,
        address,
        image_url,
        dir_name,
        extra,
    })
}

/// Apply a partial update to `target`.
///
/// Leaves `target` untouched when the patch is rejected.
pub fn apply_attraction_patch(
    target: &mut Attraction,
    mut patch: AttractionPatch,
) -> Result<(), CatalogError> {
    strip_reserved(&mut patch.extra, ATTRACTION_RESERVED_KEYS);
    if patch.is_empty() {
        return Err(CatalogError::InvalidInput(String::from("empty update body")));
    }

    let mut next = target.clone();
    patched_name(patch.name, &mut next.name)?;
    patch.name_en.apply_to(&mut next.name_en);
    patch.description.apply_to(&mut next.description);
    patch.description_en.apply_to(&mut next.description_en);
    patch.area.apply_to(&mut next.area);
    patch.location.apply_to(&mut next.location);
    patch.address.apply_to(&mut next.address);
    patch.image_url.apply_to(&mut next.image_url);
    match patch.theme {
        Patch::Keep => {}
        Patch::Clear => next.theme.clear(),
        Patch::Set(tags) => next.theme = normalize_tags(tags),
    }
    merge_extra(&mut next.extra, patch.extra);

    *target = next;
    Ok(())
}

/// Build a new route from a creation payload.
pub fn route_from_draft(id: RouteId, draft: RouteDraft) -> Result<Route, CatalogError> {
    let RouteDraft {
        name,
        description,
        attraction_ids,
        mut extra,
    } = draft;
    strip_reserved(&mut extra, ROUTE_RESERVED_KEYS);
    extra.retain(|_, value| !value.is_null());

    Ok(Route {
        id,
        name: required_name(name)?,
        description,
        attraction_ids,
        extra,
    })
}

/// Apply a partial update to `target`.
///
/// Leaves `target` untouched when the patch is rejected.
pub fn apply_route_patch(target: &mut Route, mut patch: RoutePatch) -> Result<(), CatalogError> {
    strip_reserved(&mut patch.extra, ROUTE_RESERVED_KEYS);
    if patch.is_empty() {
        return Err(CatalogError::InvalidInput(String::from("empty update body")));
    }

    let mut next = target.clone();
    patched_name(patch.name, &mut next.name)?;
    patch.description.apply_to(&mut next.description);
    match patch.attraction_ids {
        Patch::Keep => {}
        Patch::Clear => next.attraction_ids.clear(),
        Patch::Set(ids) => next.attraction_ids = ids,
    }
    merge_extra(&mut next.extra, patch.extra);

    *target = next;
    Ok(())
}
