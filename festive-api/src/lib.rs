//! festive-api library - REST surface of the event catalog
//!
//! Thin axum layer over the festive-common services: request parsing,
//! status codes and JSON bodies. All catalog semantics live in the services.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use festive_common::{EventService, OrganizerService};

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
    pub organizers: Arc<OrganizerService>,
}

impl AppState {
    pub fn new(events: EventService, organizers: OrganizerService) -> Self {
        Self {
            events: Arc::new(events),
            organizers: Arc::new(organizers),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::event_routes())
        .merge(api::organizer_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
