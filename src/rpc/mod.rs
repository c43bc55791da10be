use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::dispatch::DispatchService;

pub mod codec;
pub mod error;
pub mod handlers;

pub const SIGNAL_EMERGENCY: &str = "/dispatch.v1.DispatchService/SignalEmergency";
pub const TRACK_INTERVENTION: &str = "/dispatch.v1.DispatchService/TrackIntervention";
pub const LIST_HISTORY: &str = "/dispatch.v1.DispatchService/ListHistory";
pub const GET_INTERVENTION: &str = "/dispatch.v1.DispatchService/GetIntervention";

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub service: DispatchService,
}

pub fn router(service: DispatchService) -> Router {
    Router::new()
        .route(SIGNAL_EMERGENCY, post(handlers::signal_emergency))
        .route(TRACK_INTERVENTION, post(handlers::track_intervention))
        .route(LIST_HISTORY, post(handlers::list_history))
        .route(GET_INTERVENTION, post(handlers::get_intervention))
        .route("/emergency-types", get(handlers::emergency_types))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}
