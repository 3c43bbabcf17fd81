use crate::models::{LocationRecord, UserRow};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when reading from the record source
#[derive(Debug, Error)]
pub enum RecordSourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read-only client for the `users` table behind a PostgREST endpoint
///
/// Only rows whose owners opted into map visibility are requested.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    table: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new client
    pub fn new(
        base_url: String,
        api_key: String,
        table: String,
        timeout: Duration,
    ) -> Result<Self, RecordSourceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            table,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), self.table)
    }

    /// Fetch every visible user as a location record
    ///
    /// Rows that fail to parse are skipped with a warning so one malformed row
    /// does not hide the whole map.
    pub async fn fetch_visible_records(&self) -> Result<Vec<LocationRecord>, RecordSourceError> {
        let url = self.endpoint();
        tracing::debug!("Fetching visible records from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("select", "*"), ("show_on_map", "eq.true")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(RecordSourceError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Record source returned {}: {}", status, body);
            return Err(RecordSourceError::ApiError(format!(
                "Failed to fetch records: {}",
                status
            )));
        }

        let rows = match response.json::<serde_json::Value>().await? {
            serde_json::Value::Array(rows) => rows,
            _ => {
                return Err(RecordSourceError::InvalidResponse(
                    "Expected a JSON array of rows".into(),
                ))
            }
        };
        let row_count = rows.len();

        let records: Vec<LocationRecord> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<UserRow>(row) {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::warn!("Skipping unparseable user row: {}", e);
                    None
                }
            })
            // Hidden rows never reach the map, even if the source ignores the query
            .filter(|row| row.show_on_map)
            .map(LocationRecord::from)
            .collect();

        tracing::debug!("Fetched {} visible records ({} rows)", records.len(), row_count);

        Ok(records)
    }
}
