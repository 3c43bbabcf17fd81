use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::core::FilterResult;
use crate::models::MapMarker;

/// Token identifying one filter pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket(u64);

impl PassTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Markers currently shown to the cluster layer
///
/// Each pass takes a ticket. Only the newest ticket may publish; results of
/// superseded passes are dropped. A failed pass keeps whatever was shown
/// before.
#[derive(Debug, Default)]
pub struct MarkerBoard {
    generation: AtomicU64,
    markers: RwLock<Arc<Vec<MapMarker>>>,
}

impl MarkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pass; any pass started earlier becomes stale
    pub fn begin_pass(&self) -> PassTicket {
        PassTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Mark every in-flight pass stale, e.g. after the criteria changed
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: PassTicket) -> bool {
        ticket.0 == self.generation()
    }

    /// Show the result of a pass; returns false if the pass was superseded
    pub fn publish(&self, ticket: PassTicket, result: &FilterResult) -> bool {
        let markers: Vec<MapMarker> = result
            .records
            .iter()
            .filter_map(MapMarker::from_record)
            .collect();

        let mut current = self.markers.write().unwrap_or_else(|e| e.into_inner());
        // Checked under the lock so two publishers cannot both win
        if !self.is_current(ticket) {
            tracing::debug!(
                "Discarding stale filter pass {} (current generation {})",
                ticket.0,
                self.generation()
            );
            return false;
        }

        tracing::debug!("Publishing {} markers from pass {}", markers.len(), ticket.0);
        *current = Arc::new(markers);
        true
    }

    /// Record a failed pass; the markers on display stay as they were
    pub fn fail(&self, ticket: PassTicket, error: &dyn std::fmt::Display) {
        tracing::warn!(
            "Filter pass {} failed, keeping {} markers on display: {}",
            ticket.0,
            self.current().len(),
            error
        );
    }

    pub fn current(&self) -> Arc<Vec<MapMarker>> {
        let guard = self.markers.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }
}
