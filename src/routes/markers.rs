use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{
    filter_with_location, FilterError, FilterResult, FilterState, LocationError, MarkerBoard,
    PassTicket,
};
use crate::models::{
    Coordinate, ErrorResponse, FilterCriteria, FilterMarkersRequest, FilterMarkersResponse,
    HealthResponse, LocationRecord, MapMarker, MarkersResponse, ReplaceFiltersRequest,
};
use crate::services::{RecordSnapshotCache, SnapshotError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub filters: Arc<FilterState>,
    pub board: Arc<MarkerBoard>,
    pub records: Arc<RecordSnapshotCache>,
    pub max_radius_km: f64,
}

/// A finished pass, ready to be rendered
struct PassOutcome {
    result: FilterResult,
    total_records: usize,
    criteria: FilterCriteria,
    published: bool,
}

impl AppState {
    /// Build the state and tie the board to filter changes
    ///
    /// Any criteria change makes in-flight passes stale, so a slow pass under
    /// old criteria can never overwrite the markers of a newer one.
    pub fn new(records: Arc<RecordSnapshotCache>, max_radius_km: f64) -> Self {
        let filters = Arc::new(FilterState::new());
        let board = Arc::new(MarkerBoard::new());

        let listener_board = Arc::clone(&board);
        filters.subscribe(move |criteria| {
            tracing::debug!("Filter criteria changed to {:?}, invalidating in-flight passes", criteria);
            listener_board.invalidate();
        });

        Self {
            filters,
            board,
            records,
            max_radius_km,
        }
    }

    /// Start a board pass and read the shared criteria it runs under
    ///
    /// The ticket is taken first: a criteria change that lands after this
    /// call invalidates the ticket, so the pass can never publish markers for
    /// criteria that are no longer active.
    pub fn begin_shared_pass(&self) -> (PassTicket, FilterCriteria) {
        let ticket = self.board.begin_pass();
        (ticket, self.filters.get())
    }

    fn check_radius(&self, criteria: &FilterCriteria) -> Result<(), HttpResponse> {
        match criteria.radius_km {
            Some(radius) if radius > self.max_radius_km => Err(bad_request(
                "invalid_radius",
                format!("radiusKm must not exceed {} km", self.max_radius_km),
            )),
            _ => Ok(()),
        }
    }

    /// Re-run the pipeline under the shared criteria and publish the markers
    ///
    /// A failed pass keeps the markers on display.
    async fn redraw_board(
        &self,
        viewer: Result<Coordinate, LocationError>,
    ) -> Result<PassOutcome, HttpResponse> {
        let (ticket, criteria) = self.begin_shared_pass();

        let records = match self.records.records().await {
            Ok(records) => records,
            Err(e) => {
                self.board.fail(ticket, &e);
                return Err(record_source_error(&e));
            }
        };

        let result = match filter_with_location(&records, viewer, &criteria) {
            Ok(result) => result,
            Err(e) => {
                self.board.fail(ticket, &e);
                return Err(filter_error_response(&e));
            }
        };

        let published = self.board.publish(ticket, &result);
        Ok(PassOutcome {
            result,
            total_records: records.len(),
            criteria,
            published,
        })
    }

    /// Run the pipeline under request-local criteria without touching the board
    async fn preview(
        &self,
        criteria: FilterCriteria,
        viewer: Result<Coordinate, LocationError>,
    ) -> Result<PassOutcome, HttpResponse> {
        let records: Arc<Vec<LocationRecord>> = self
            .records
            .records()
            .await
            .map_err(|e| record_source_error(&e))?;

        let result =
            filter_with_location(&records, viewer, &criteria).map_err(|e| filter_error_response(&e))?;

        Ok(PassOutcome {
            result,
            total_records: records.len(),
            criteria,
            published: false,
        })
    }
}

/// Configure all marker and filter routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/markers", web::get().to(current_markers))
        .route("/markers/filter", web::post().to(filter_markers))
        .route("/filters", web::get().to(get_filters))
        .route("/filters", web::put().to(update_filters))
        .route("/filters", web::delete().to(clear_filters))
        .route("/records/refresh", web::post().to(refresh_records));
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

fn filter_error_response(err: &FilterError) -> HttpResponse {
    bad_request(err.code(), err.to_string())
}

fn record_source_error(err: &SnapshotError) -> HttpResponse {
    tracing::error!("Failed to load records: {}", err);
    HttpResponse::BadGateway().json(ErrorResponse {
        error: "record_source_unavailable".to_string(),
        message: err.to_string(),
        status_code: 502,
    })
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Markers currently on display
///
/// GET /api/v1/markers
async fn current_markers(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(MarkersResponse {
        markers: state.board.current().as_ref().clone(),
        generation: state.board.generation(),
    })
}

/// Filter markers endpoint
///
/// POST /api/v1/markers/filter
///
/// Request body:
/// ```json
/// {
///   "viewer": { "latitude": 52.52, "longitude": 13.40 },
///   "viewerError": "unavailable|permission_denied",
///   "criteria": { "radiusKm": 50, "tags": ["English"] }
/// }
/// ```
///
/// Without `criteria` the shared filter state applies and the result replaces
/// the markers on display. With `criteria` the result is a preview and the
/// board is left alone.
async fn filter_markers(
    state: web::Data<AppState>,
    req: web::Json<FilterMarkersRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let viewer = req.viewer_location();

    let outcome = match req.criteria {
        Some(update) => {
            if let Err(errors) = update.validate() {
                return bad_request("validation_failed", errors.to_string());
            }
            let criteria: FilterCriteria = update.into();
            if let Err(response) = state.check_radius(&criteria) {
                return response;
            }
            state.preview(criteria, viewer).await
        }
        None => state.redraw_board(viewer).await,
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };

    tracing::info!(
        "Filter pass returned {} of {} records ({} anomalies, published: {})",
        outcome.result.len(),
        outcome.total_records,
        outcome.result.anomalies.len(),
        outcome.published
    );

    HttpResponse::Ok().json(FilterMarkersResponse {
        markers: outcome
            .result
            .records
            .iter()
            .filter_map(MapMarker::from_record)
            .collect(),
        anomalies: outcome.result.anomalies,
        total_records: outcome.total_records,
        criteria: outcome.criteria,
        published: outcome.published,
    })
}

/// GET /api/v1/filters
async fn get_filters(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.filters.get())
}

/// Replace the active criteria and redraw the markers under them
///
/// PUT /api/v1/filters
async fn update_filters(
    state: web::Data<AppState>,
    req: web::Json<ReplaceFiltersRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let criteria = req.criteria();
    if let Err(response) = state.check_radius(&criteria) {
        return response;
    }

    if let Err(e) = state.filters.set(criteria.clone()) {
        return filter_error_response(&e);
    }
    tracing::info!("Filters updated: radius {:?}, {} tags", criteria.radius_km, criteria.tags.len());

    if state.redraw_board(req.viewer_location()).await.is_err() {
        tracing::warn!("Markers not redrawn for the new filters");
    }

    HttpResponse::Ok().json(criteria)
}

/// Reset to the identity criteria and redraw the markers
///
/// DELETE /api/v1/filters
async fn clear_filters(state: web::Data<AppState>) -> impl Responder {
    state.filters.clear();
    tracing::info!("Filters cleared");

    // No distance constraint, so the pass needs no viewer
    if state.redraw_board(Err(LocationError::Unavailable)).await.is_err() {
        tracing::warn!("Markers not redrawn after clearing filters");
    }

    HttpResponse::Ok().json(state.filters.get())
}

/// Drop the cached record snapshot
///
/// POST /api/v1/records/refresh
async fn refresh_records(state: web::Data<AppState>) -> impl Responder {
    state.records.invalidate().await;
    HttpResponse::NoContent().finish()
}
