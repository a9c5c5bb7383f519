//! The catalog service: every read and write the HTTP layer exposes.
//!
//! Reads re-scan storage on every call; nothing is cached between calls.
//! Attractions leave the service enriched (absolute asset URLs) from the
//! read operations, while create and update return the stored form so the
//! caller decides how to present it.

use std::collections::HashSet;

use tracing::{debug, info, warn};
use wayfarer_store::{AssetStore, DocumentStore, StoreError, StoredDocument};
use wayfarer_types::{
    Attraction, AttractionDraft, AttractionId, AttractionPatch, ProposedRoute, Route, RouteDraft,
    RouteId, RoutePatch, RouteView,
};

use crate::compose::compose_route;
use crate::enrich::enrich_attraction;
use crate::error::CatalogError;
use crate::filter::AttractionFilter;
use crate::merge::{
    apply_attraction_patch, apply_route_patch, attraction_from_draft, route_from_draft,
    scrub_stored_route,
};
use crate::nearest::nearest_neighbor_tour;
use crate::slug::slugify;

/// Minimum number of distinct attractions a planned route needs.
pub const MIN_PLAN_STOPS: usize = 2;

/// Attraction and route storage behind one set of operations.
#[derive(Debug, Clone)]
pub struct Catalog<A, R> {
    attractions: A,
    routes: R,
}

impl<A, R> Catalog<A, R>
where
    A: DocumentStore<Attraction> + AssetStore,
    R: DocumentStore<Route>,
{
    /// Create a catalog over the given stores.
    pub const fn new(attractions: A, routes: R) -> Self {
        Self {
            attractions,
            routes,
        }
    }

    // -----------------------------------------------------------------------
    // Attractions
    // -----------------------------------------------------------------------

    /// Every readable attraction in storage form, ordered by id.
    fn raw_attractions(&self) -> Result<Vec<Attraction>, CatalogError> {
        let mut all = self.attractions.list()?;
        all.sort_by_key(|a| a.id);
        Ok(all)
    }

    fn enriched_attractions(&self, base_url: &str) -> Result<Vec<Attraction>, CatalogError> {
        Ok(self
            .raw_attractions()?
            .into_iter()
            .map(|a| enrich_attraction(a, base_url))
            .collect())
    }

    /// Find the stored attraction with `id` and re-read its document.
    fn locate_attraction(&self, id: AttractionId) -> Result<Attraction, CatalogError> {
        let not_found = || CatalogError::NotFound(format!("attraction {id}"));
        let key = self
            .attractions
            .list()?
            .into_iter()
            .find(|a| a.id == id)
            .map(|a| a.storage_key())
            .ok_or_else(not_found)?;
        self.attractions.get(&key)?.ok_or_else(not_found)
    }

    /// Filtered, enriched attractions ordered by id.
    pub fn list_attractions(
        &self,
        filter: &AttractionFilter,
        base_url: &str,
    ) -> Result<Vec<Attraction>, CatalogError> {
        Ok(filter.apply(self.enriched_attractions(base_url)?))
    }

    /// One enriched attraction.
    pub fn get_attraction(
        &self,
        id: AttractionId,
        base_url: &str,
    ) -> Result<Attraction, CatalogError> {
        Ok(enrich_attraction(self.locate_attraction(id)?, base_url))
    }

    /// Store a new attraction and return it in storage form.
    ///
    /// The id is one past the highest id ever issued, so the id of a
    /// deleted attraction is never handed out again. The storage key is
    /// the slugified name, suffixed with `-{id}` when the slug is taken.
    pub fn create_attraction(&self, draft: AttractionDraft) -> Result<Attraction, CatalogError> {
        let existing = self.raw_attractions()?;
        let id = next_id(
            existing.iter().map(|a| a.id.into_inner()),
            self.attractions.last_issued_id()?,
        )
        .map(AttractionId::new)
        .ok_or_else(|| CatalogError::InvalidInput(String::from("attraction ids exhausted")))?;

        let slug = slugify(draft.name.as_deref().unwrap_or_default());
        let suffixed = format!("{slug}-{id}");
        let taken: HashSet<&str> = existing.iter().map(|a| a.dir_name.as_str()).collect();
        let first_choice = if taken.contains(slug.as_str()) {
            suffixed.clone()
        } else {
            slug
        };

        let mut doc = attraction_from_draft(id, first_choice, draft)?;
        // Recorded before the insert; a failed insert leaves a gap.
        self.attractions.record_issued_id(id.into_inner())?;
        match self.attractions.insert(&doc) {
            Ok(()) => {}
            // A directory the scan skipped (no document yet) can still hold
            // the slug.
            Err(StoreError::Conflict(key)) if key != suffixed => {
                debug!(key = %key, retry = %suffixed, "storage key taken, retrying with id suffix");
                doc.dir_name = suffixed;
                self.attractions.insert(&doc)?;
            }
            Err(e) => return Err(e.into()),
        }

        info!(id = %doc.id, dir_name = %doc.dir_name, "attraction created");
        Ok(doc)
    }

    /// Shallow-merge `patch` into a stored attraction and return the result
    /// in storage form.
    pub fn update_attraction(
        &self,
        id: AttractionId,
        patch: AttractionPatch,
    ) -> Result<Attraction, CatalogError> {
        let mut doc = self.locate_attraction(id)?;
        apply_attraction_patch(&mut doc, patch)?;
        self.attractions.put(&doc)?;
        info!(id = %id, dir_name = %doc.dir_name, "attraction updated");
        Ok(doc)
    }

    /// Remove an attraction with all of its assets.
    ///
    /// Routes referring to it keep the id; it is skipped when they are read.
    pub fn delete_attraction(&self, id: AttractionId) -> Result<(), CatalogError> {
        let doc = self.locate_attraction(id)?;
        if !self.attractions.delete(&doc.dir_name)? {
            return Err(CatalogError::NotFound(format!("attraction {id}")));
        }
        info!(id = %id, dir_name = %doc.dir_name, "attraction deleted");
        Ok(())
    }

    /// Store an asset file next to an attraction's document.
    ///
    /// Returns the attraction in storage form together with the relative
    /// name to reference from `image_url` or from markdown in the
    /// descriptions.
    pub fn store_attraction_asset(
        &self,
        id: AttractionId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(Attraction, String), CatalogError> {
        let doc = self.locate_attraction(id)?;
        self.attractions
            .write_asset(&doc.dir_name, file_name, bytes)?;
        info!(id = %id, file_name, size = bytes.len(), "asset stored");
        Ok((doc, file_name.to_owned()))
    }

    // -----------------------------------------------------------------------
    // Routes
    // -----------------------------------------------------------------------

    /// Every readable route in storage form, in the order they are stored.
    pub fn list_routes(&self) -> Result<Vec<Route>, CatalogError> {
        let mut all = self.routes.list()?;
        all.iter_mut().for_each(scrub_stored_route);
        Ok(all)
    }

    fn locate_route(&self, id: RouteId) -> Result<Route, CatalogError> {
        let mut route = self
            .routes
            .get(&id.to_string())?
            .ok_or_else(|| CatalogError::NotFound(format!("route {id}")))?;
        scrub_stored_route(&mut route);
        Ok(route)
    }

    /// A route with its attractions resolved and enriched.
    pub fn get_route(&self, id: RouteId, base_url: &str) -> Result<RouteView, CatalogError> {
        let route = self.locate_route(id)?;
        let attractions = self.enriched_attractions(base_url)?;
        Ok(compose_route(route, &attractions))
    }

    /// Store a new route and return it. Ids follow the same never-reused
    /// rule as attractions.
    pub fn create_route(&self, draft: RouteDraft) -> Result<Route, CatalogError> {
        let existing = self.list_routes()?;
        let id = next_id(
            existing.iter().map(|r| r.id.into_inner()),
            self.routes.last_issued_id()?,
        )
        .map(RouteId::new)
        .ok_or_else(|| CatalogError::InvalidInput(String::from("route ids exhausted")))?;

        let route = route_from_draft(id, draft)?;
        self.routes.record_issued_id(id.into_inner())?;
        self.routes.insert(&route)?;
        info!(id = %route.id, stops = route.attraction_ids.len(), "route created");
        Ok(route)
    }

    /// Shallow-merge `patch` into a stored route.
    pub fn update_route(&self, id: RouteId, patch: RoutePatch) -> Result<Route, CatalogError> {
        let mut route = self.locate_route(id)?;
        apply_route_patch(&mut route, patch)?;
        self.routes.put(&route)?;
        info!(id = %id, "route updated");
        Ok(route)
    }

    /// Remove a route.
    pub fn delete_route(&self, id: RouteId) -> Result<(), CatalogError> {
        if !self.routes.delete(&id.to_string())? {
            return Err(CatalogError::NotFound(format!("route {id}")));
        }
        info!(id = %id, "route deleted");
        Ok(())
    }

    /// Order the given attractions with the nearest-neighbor heuristic.
    ///
    /// Repeated ids count once. Ids that do not resolve and attractions
    /// without a location are left out before any distance is computed.
    /// The first remaining attraction in `ids` order starts the tour.
    pub fn plan_route(
        &self,
        ids: &[AttractionId],
        base_url: &str,
    ) -> Result<ProposedRoute, CatalogError> {
        let mut seen = HashSet::with_capacity(ids.len());
        let distinct: Vec<AttractionId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if distinct.len() < MIN_PLAN_STOPS {
            return Err(CatalogError::InvalidInput(format!(
                "at least {MIN_PLAN_STOPS} distinct attractions are required"
            )));
        }

        let mut pool = self.enriched_attractions(base_url)?;
        let mut stops = Vec::with_capacity(distinct.len());
        for id in &distinct {
            let Some(index) = pool.iter().position(|a| a.id == *id) else {
                debug!(id = %id, "excluding unknown attraction from plan");
                continue;
            };
            let attraction = pool.swap_remove(index);
            match attraction.location {
                Some(point) => stops.push((attraction, point)),
                None => debug!(id = %id, "excluding attraction without location from plan"),
            }
        }
        if stops.is_empty() {
            return Err(CatalogError::NotFound(String::from(
                "none of the requested attractions can be placed on a map",
            )));
        }
        if stops.len() < distinct.len() {
            warn!(
                requested = distinct.len(),
                usable = stops.len(),
                "planning with a subset of the requested attractions"
            );
        }

        let tour = nearest_neighbor_tour(stops);
        let total_distance_km = tour.total_km();
        let attraction_ids = tour.stops.iter().map(|a| a.id).collect();
        let description = format!(
            "{} stops, about {total_distance_km:.1} km",
            tour.stops.len()
        );

        Ok(ProposedRoute {
            name: String::from("Custom route"),
            description,
            attraction_ids,
            attractions: tour.stops,
            legs_km: tour.legs_km,
            total_distance_km,
        })
    }
}

/// One past the larger of the highest stored id and the recorded mark.
/// Stored ids count too, so hand-added documents are never shadowed.
fn next_id(ids: impl Iterator<Item = u64>, last_issued: u64) -> Option<u64> {
    ids.max().unwrap_or(0).max(last_issued).checked_add(1)
}
