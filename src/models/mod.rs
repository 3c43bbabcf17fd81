// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Coordinate, FilterCriteria, LocationRecord, MapMarker, UserRow};
pub use requests::{FilterMarkersRequest, ReplaceFiltersRequest, UpdateFiltersRequest};
pub use responses::{ErrorResponse, FilterMarkersResponse, HealthResponse, MarkersResponse};
