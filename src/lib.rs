//! Polyglot Map - geospatial marker filtering for the Polyglot world map
//!
//! This library narrows the set of people shown on the map by distance from
//! the viewer and by spoken languages, and keeps the shared filter state the
//! map renders from.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance_km, filter, filter_with_location, FilterError, FilterResult, FilterState,
    LocationError, MarkerBoard, RecordIntegrityAnomaly,
};
pub use models::{Coordinate, FilterCriteria, LocationRecord, MapMarker};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let a = Coordinate::new(52.52, 13.405).unwrap();
        let b = Coordinate::new(48.137, 11.575).unwrap();
        let distance = distance_km(&a, &b).unwrap();
        assert!((distance - 504.0).abs() < 10.0, "Berlin to Munich should be ~504km, got {}", distance);
    }
}
