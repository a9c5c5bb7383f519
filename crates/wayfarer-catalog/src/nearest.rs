//! Great-circle distance and the greedy nearest-neighbor tour.
//!
//! The tour starts at the first stop in input order and repeatedly steps to
//! the closest unvisited stop. Among equally close candidates the one that
//! came first in the input wins. The path is open: it does not return to
//! the start. This is a local heuristic, not a shortest-tour solver, and
//! its output depends on input order only through the seed and tie-breaks.

use wayfarer_types::GeoPoint;

/// Mean Earth radius used for Haversine distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometres.
#[allow(clippy::suboptimal_flops)]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A visiting order produced by [`nearest_neighbor_tour`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tour<T> {
    /// Stops in visiting order.
    pub stops: Vec<T>,
    /// Distance of each hop in kilometres; one shorter than `stops`.
    pub legs_km: Vec<f64>,
}

impl<T> Tour<T> {
    /// Length of the whole path in kilometres.
    pub fn total_km(&self) -> f64 {
        self.legs_km.iter().sum()
    }
}

/// Order `stops` by repeatedly visiting the nearest unvisited one.
pub fn nearest_neighbor_tour<T>(stops: Vec<(T, GeoPoint)>) -> Tour<T> {
    let mut pending = stops.into_iter();
    let Some((seed, mut here)) = pending.next() else {
        return Tour {
            stops: Vec::new(),
            legs_km: Vec::new(),
        };
    };
    let mut remaining: Vec<(T, GeoPoint)> = pending.collect();

    let mut order = Vec::with_capacity(remaining.len().saturating_add(1));
    let mut legs_km = Vec::with_capacity(remaining.len());
    order.push(seed);

    while !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;
        for (index, (_, point)) in remaining.iter().enumerate() {
            let distance = haversine_km(here, *point);
            // Strict comparison keeps the earliest candidate on ties.
            if best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }
        let Some((index, distance)) = best else {
            break;
        };
        // `remove` keeps the rest in input order for later tie-breaks.
        let (stop, point) = remaining.remove(index);
        order.push(stop);
        legs_km.push(distance);
        here = point;
    }

    Tour {
        stops: order,
        legs_km,
    }
}
