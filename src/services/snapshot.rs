use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::models::LocationRecord;
use crate::services::records::{RecordSourceError, SupabaseClient};

const SNAPSHOT_KEY: &str = "records:visible";

/// Errors surfaced by the snapshot cache
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Source(#[from] Arc<RecordSourceError>),
}

/// Time-bounded in-memory snapshot of the visible records
///
/// Concurrent callers that miss the cache share a single fetch. With caching
/// disabled every call goes to the source.
pub struct RecordSnapshotCache {
    source: SupabaseClient,
    snapshot: Option<moka::future::Cache<&'static str, Arc<Vec<LocationRecord>>>>,
}

impl RecordSnapshotCache {
    pub fn new(source: SupabaseClient, ttl_secs: u64, enabled: bool) -> Self {
        let snapshot = enabled.then(|| {
            moka::future::CacheBuilder::new(1)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build()
        });

        Self { source, snapshot }
    }

    /// Current record snapshot, fetched from the source on a miss
    pub async fn records(&self) -> Result<Arc<Vec<LocationRecord>>, SnapshotError> {
        let Some(cache) = &self.snapshot else {
            let records = self.source.fetch_visible_records().await.map_err(Arc::new)?;
            return Ok(Arc::new(records));
        };

        if let Some(records) = cache.get(SNAPSHOT_KEY).await {
            tracing::trace!("Record snapshot hit ({} records)", records.len());
            return Ok(records);
        }

        let records = cache
            .try_get_with(SNAPSHOT_KEY, async {
                self.source.fetch_visible_records().await.map(Arc::new)
            })
            .await?;

        tracing::debug!("Record snapshot refreshed ({} records)", records.len());
        Ok(records)
    }

    /// Drop the cached snapshot so the next call refetches
    pub async fn invalidate(&self) {
        if let Some(cache) = &self.snapshot {
            cache.invalidate(SNAPSHOT_KEY).await;
            tracing::debug!("Record snapshot invalidated");
        }
    }
}
