// Service exports
pub mod records;
pub mod snapshot;

pub use records::{RecordSourceError, SupabaseClient};
pub use snapshot::{RecordSnapshotCache, SnapshotError};
