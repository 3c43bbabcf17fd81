use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the viewer-location provider could not resolve a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    #[error("location unavailable")]
    Unavailable,

    #[error("location permission denied")]
    PermissionDenied,
}

/// Errors that abort a single filter pass
///
/// Per-record problems are not errors; they are reported as
/// [`RecordIntegrityAnomaly`](crate::core::RecordIntegrityAnomaly) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Distance filter requested without a viewer location{}", cause_suffix(.cause))]
    MissingViewerLocation { cause: Option<LocationError> },

    #[error("Invalid radius: {0} km")]
    InvalidRadius(f64),
}

fn cause_suffix(cause: &Option<LocationError>) -> String {
    match cause {
        Some(cause) => format!(" ({})", cause),
        None => String::new(),
    }
}

impl FilterError {
    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::InvalidCoordinate { .. } => "invalid_coordinate",
            FilterError::MissingViewerLocation { .. } => "missing_viewer_location",
            FilterError::InvalidRadius(_) => "invalid_radius",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_viewer_message() {
        let err = FilterError::MissingViewerLocation { cause: None };
        assert_eq!(err.to_string(), "Distance filter requested without a viewer location");

        let err = FilterError::MissingViewerLocation {
            cause: Some(LocationError::PermissionDenied),
        };
        assert!(err.to_string().ends_with("(location permission denied)"));
        assert_eq!(err.code(), "missing_viewer_location");
    }
}
