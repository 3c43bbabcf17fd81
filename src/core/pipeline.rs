use serde::Serialize;

use crate::core::{
    distance::{distance_km, is_within_radius},
    tags, FilterError, LocationError,
};
use crate::models::{Coordinate, FilterCriteria, LocationRecord};

/// What was wrong with a record that had to be skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    MissingPosition,
    InvalidPosition,
}

/// A record excluded from a pass because its position was unusable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIntegrityAnomaly {
    pub record_id: String,
    pub kind: AnomalyKind,
}

/// Output of a filter pass
///
/// `records` keeps the input order of the included records. Every record in
/// it has a valid position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    pub records: Vec<LocationRecord>,
    pub anomalies: Vec<RecordIntegrityAnomaly>,
}

impl FilterResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Filter location records by distance from the viewer and by tags
///
/// # Pipeline Stages
/// 1. Criteria and viewer checks (fatal to the pass)
/// 2. Position integrity (per record, reported and skipped)
/// 3. Distance constraint, when a radius is set
/// 4. Tag constraint
///
/// # Errors
/// * `MissingViewerLocation` if a radius is set but `viewer` is `None`
/// * `InvalidRadius` for a negative or non-finite radius
/// * `InvalidCoordinate` if `viewer` is out of range
pub fn filter(
    records: &[LocationRecord],
    viewer: Option<Coordinate>,
    criteria: &FilterCriteria,
) -> Result<FilterResult, FilterError> {
    criteria.validate()?;

    // A distance constraint needs a viewer; never drop it silently
    let origin = match (criteria.radius_km, viewer) {
        (Some(radius), Some(viewer)) => Some((viewer, radius)),
        (Some(_), None) => return Err(FilterError::MissingViewerLocation { cause: None }),
        (None, _) => None,
    };

    if let Some(viewer) = viewer {
        viewer.validate()?;
    }

    let mut result = FilterResult::default();

    for record in records {
        let position = match record.position {
            Some(position) if position.is_valid() => position,
            Some(_) => {
                report_anomaly(&mut result, record, AnomalyKind::InvalidPosition);
                continue;
            }
            None => {
                report_anomaly(&mut result, record, AnomalyKind::MissingPosition);
                continue;
            }
        };

        if let Some((viewer, radius_km)) = origin {
            if !is_within_radius(distance_km(&viewer, &position)?, radius_km) {
                continue;
            }
        }

        if !tags::matches(&record.tags, &criteria.tags) {
            continue;
        }

        result.records.push(record.clone());
    }

    tracing::debug!(
        "Filter pass kept {} of {} records ({} anomalies, radius: {:?}, tags: {})",
        result.records.len(),
        records.len(),
        result.anomalies.len(),
        criteria.radius_km,
        criteria.tags.len()
    );

    Ok(result)
}

/// Filter using the outcome of a viewer-location lookup
///
/// A failed lookup only matters when a radius is set; it then surfaces as
/// `MissingViewerLocation` carrying the provider's reason.
pub fn filter_with_location(
    records: &[LocationRecord],
    viewer: Result<Coordinate, LocationError>,
    criteria: &FilterCriteria,
) -> Result<FilterResult, FilterError> {
    match viewer {
        Ok(viewer) => filter(records, Some(viewer), criteria),
        Err(cause) if criteria.radius_km.is_some() => {
            tracing::warn!("Viewer location failed with an active radius: {}", cause);
            Err(FilterError::MissingViewerLocation { cause: Some(cause) })
        }
        Err(cause) => {
            tracing::debug!("Viewer location failed ({}), no radius set", cause);
            filter(records, None, criteria)
        }
    }
}

fn report_anomaly(result: &mut FilterResult, record: &LocationRecord, kind: AnomalyKind) {
    tracing::warn!(
        record_id = %record.id,
        ?kind,
        "Skipping record with unusable position"
    );
    result.anomalies.push(RecordIntegrityAnomaly {
        record_id: record.id.clone(),
        kind,
    });
}
