use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

use crate::core::LocationError;
use crate::models::domain::{Coordinate, FilterCriteria};

/// Request to filter the visible markers
///
/// When `criteria` is omitted the shared filter state is used. A client that
/// could not resolve its own position sends `viewerError` instead of `viewer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMarkersRequest {
    #[serde(default)]
    pub viewer: Option<Coordinate>,
    #[serde(default)]
    pub viewer_error: Option<LocationError>,
    #[serde(default)]
    pub criteria: Option<UpdateFiltersRequest>,
}

impl FilterMarkersRequest {
    /// The viewer position as the location provider reported it
    pub fn viewer_location(&self) -> Result<Coordinate, LocationError> {
        resolve_viewer(self.viewer, self.viewer_error)
    }
}

fn resolve_viewer(
    viewer: Option<Coordinate>,
    viewer_error: Option<LocationError>,
) -> Result<Coordinate, LocationError> {
    match (viewer, viewer_error) {
        (Some(viewer), _) => Ok(viewer),
        (None, Some(error)) => Err(error),
        (None, None) => Err(LocationError::Unavailable),
    }
}

/// Request to replace the active filter criteria
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFiltersRequest {
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub radius_km: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub tags: BTreeSet<String>,
}

/// Request to replace the shared filter criteria
///
/// The viewer fields feed the pass that redraws the shared markers under the
/// new criteria.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceFiltersRequest {
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub radius_km: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub viewer: Option<Coordinate>,
    #[serde(default)]
    pub viewer_error: Option<LocationError>,
}

impl ReplaceFiltersRequest {
    pub fn viewer_location(&self) -> Result<Coordinate, LocationError> {
        resolve_viewer(self.viewer, self.viewer_error)
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            radius_km: self.radius_km,
            tags: self.tags.clone(),
        }
    }
}

impl From<UpdateFiltersRequest> for FilterCriteria {
    fn from(req: UpdateFiltersRequest) -> Self {
        Self {
            radius_km: req.radius_km,
            tags: req.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_radius_fails_validation() {
        let req: UpdateFiltersRequest =
            serde_json::from_str(r#"{"radiusKm": -3, "tags": []}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_viewer_location_resolution() {
        let req: FilterMarkersRequest =
            serde_json::from_str(r#"{"viewerError": "permission_denied"}"#).unwrap();
        assert_eq!(req.viewer_location(), Err(LocationError::PermissionDenied));

        let req: FilterMarkersRequest =
            serde_json::from_str(r#"{"viewer": {"latitude": 1.5, "longitude": 2.5}}"#).unwrap();
        assert_eq!(
            req.viewer_location(),
            Ok(Coordinate { latitude: 1.5, longitude: 2.5 })
        );

        let req: FilterMarkersRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.viewer_location(), Err(LocationError::Unavailable));
    }

    #[test]
    fn test_replace_filters_carries_viewer() {
        let req: ReplaceFiltersRequest = serde_json::from_str(
            r#"{"radiusKm": 20, "tags": ["Korean"], "viewer": {"latitude": 37.5, "longitude": 127.0}}"#,
        )
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.criteria(), FilterCriteria::new(Some(20.0), ["Korean"]));
        assert_eq!(
            req.viewer_location(),
            Ok(Coordinate { latitude: 37.5, longitude: 127.0 })
        );
    }
}
