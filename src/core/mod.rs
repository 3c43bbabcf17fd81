// Core algorithm exports
pub mod board;
pub mod distance;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod tags;

pub use board::{MarkerBoard, PassTicket};
pub use distance::{distance_km, haversine_distance, DISTANCE_EPSILON_KM, EARTH_RADIUS_KM};
pub use error::{FilterError, LocationError};
pub use pipeline::{filter, filter_with_location, AnomalyKind, FilterResult, RecordIntegrityAnomaly};
pub use state::{FilterState, SubscriptionId};
