use serde::{Deserialize, Serialize};

use crate::core::RecordIntegrityAnomaly;
use crate::models::domain::{FilterCriteria, MapMarker};

/// Response for the filter markers endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMarkersResponse {
    pub markers: Vec<MapMarker>,
    pub anomalies: Vec<RecordIntegrityAnomaly>,
    pub total_records: usize,
    pub criteria: FilterCriteria,
    /// True when the pass replaced the shared markers; previews with their
    /// own criteria and superseded passes leave the board alone
    pub published: bool,
}

/// Markers currently on display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkersResponse {
    pub markers: Vec<MapMarker>,
    pub generation: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
