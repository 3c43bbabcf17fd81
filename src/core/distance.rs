use crate::core::FilterError;
use crate::models::Coordinate;

/// Earth's mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distances at or below this many kilometers count as zero
///
/// The same tolerance decides radius boundaries in the filter pipeline, so a
/// radius of 0 admits exactly the points this module considers coincident.
pub const DISTANCE_EPSILON_KM: f64 = 1e-9;

/// Calculate the Haversine distance between two points in kilometers
///
/// Inputs are not range-checked; use [`distance_km`] for untrusted
/// coordinates.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two coordinates in kilometers
///
/// Fails with [`FilterError::InvalidCoordinate`] if either point lies outside
/// the valid latitude/longitude ranges.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> Result<f64, FilterError> {
    a.validate()?;
    b.validate()?;

    Ok(haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude))
}

/// True if `distance` counts as zero
#[inline]
pub fn is_zero_distance(distance: f64) -> bool {
    distance <= DISTANCE_EPSILON_KM
}

/// True if `distance` is within `radius_km`, using the zero tolerance at the edge
#[inline]
pub fn is_within_radius(distance: f64, radius_km: f64) -> bool {
    distance <= radius_km + DISTANCE_EPSILON_KM
}

impl Coordinate {
    /// Check whether `other` lies within `radius_km` of this point
    pub fn is_within(&self, other: &Coordinate, radius_km: f64) -> Result<bool, FilterError> {
        Ok(is_within_radius(distance_km(self, other)?, radius_km))
    }
}
