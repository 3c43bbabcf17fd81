use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::FilterError;

/// A point on the globe in decimal degrees
///
/// Fields are public so raw input can be carried around unchecked;
/// `validate` (and every distance computation) rejects out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside [-90,90] x [-180,180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, FilterError> {
        let coordinate = Self { latitude, longitude };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(FilterError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(value: Coordinate) -> Self {
        geo::Point::new(value.longitude, value.latitude)
    }
}

/// A person's map location as supplied by the record source
///
/// `position` is `None` for rows that never resolved coordinates; the
/// pipeline reports those as integrity anomalies instead of rendering them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub display_name: String,
    pub country_code: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub position: Option<Coordinate>,
}

/// Active filter criteria
///
/// `radius_km: None` means no distance constraint, empty `tags` means no tag
/// constraint. The default value is the identity criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new<I, S>(radius_km: Option<f64>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            radius_km,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the criteria excludes nothing
    pub fn is_unconstrained(&self) -> bool {
        self.radius_km.is_none() && self.tags.is_empty()
    }

    /// Reject negative or non-finite radii
    pub fn validate(&self) -> Result<(), FilterError> {
        match self.radius_km {
            Some(radius) if !radius.is_finite() || radius < 0.0 => {
                Err(FilterError::InvalidRadius(radius))
            }
            _ => Ok(()),
        }
    }
}

/// Row shape of the `users` table in the external store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub show_on_map: bool,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl From<UserRow> for LocationRecord {
    fn from(row: UserRow) -> Self {
        let position = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate { latitude, longitude }),
            _ => None,
        };

        Self {
            id: row.id,
            display_name: row.name,
            country_code: row.country,
            tags: row.languages.into_iter().collect(),
            position,
        }
    }
}

/// Marker handed to the clustering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: String,
    pub name: String,
    pub country: String,
    pub languages: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl MapMarker {
    /// Project a record onto a marker; `None` when the record has no position
    pub fn from_record(record: &LocationRecord) -> Option<Self> {
        let position = record.position?;
        Some(Self {
            id: record.id.clone(),
            name: record.display_name.clone(),
            country: record.country_code.clone(),
            languages: record.tags.iter().cloned().collect(),
            latitude: position.latitude,
            longitude: position.longitude,
        })
    }
}
