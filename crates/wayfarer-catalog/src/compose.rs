//! Resolves a route's attraction references.

use std::collections::HashMap;

use wayfarer_types::{Attraction, AttractionId, Route, RouteView};

/// Attach the attractions `route` refers to, in the order of its
/// `attraction_ids`. Ids that match nothing in `attractions` are skipped.
pub fn compose_route(route: Route, attractions: &[Attraction]) -> RouteView {
    let mut by_id: HashMap<AttractionId, &Attraction> = HashMap::with_capacity(attractions.len());
    for attraction in attractions {
        by_id.entry(attraction.id).or_insert(attraction);
    }

    let resolved = route
        .attraction_ids
        .iter()
        .filter_map(|id| by_id.get(id).map(|a| (*a).clone()))
        .collect();

    RouteView {
        route,
        attractions: resolved,
    }
}
