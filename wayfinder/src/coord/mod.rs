//! Coordinate module
//!
//! Provides the geographic point type shared by every part of the engine,
//! plus the small amount of geometry the engine needs (great-circle
//! distance for logging and change detection).

mod types;

pub use types::{Coordinate, CoordError, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two coordinates in meters (haversine).
#[inline]
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Returns the first argument only when it holds a valid coordinate.
///
/// Helper for turning source readings into the engine's "present or absent"
/// view of a point.
#[inline]
pub fn valid_or_none(coordinate: Option<Coordinate>) -> Option<Coordinate> {
    coordinate.and_then(Coordinate::validated)
}
