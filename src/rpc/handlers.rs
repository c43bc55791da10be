use axum::extract::State;
use axum::response::Response;
use axum::Json;
use futures::StreamExt;
use serde::Serialize;
use tokio_stream::wrappers::ReceiverStream;

use super::codec::{framed_stream, Protobuf};
use super::error::RpcResult;
use super::AppState;
use crate::db::ScanFilter;
use crate::dispatch::{EmergencyReport, TrackingUpdate};
use crate::error::DispatchError;
use crate::models::wire as pb;
use crate::models::{Coordinates, EmergencyKind, InterventionReport};

impl From<TrackingUpdate> for pb::TrackingUpdate {
    fn from(update: TrackingUpdate) -> Self {
        Self {
            position: Some(update.position.into()),
            eta_minutes: update.eta_minutes,
            status_message: update.status_message,
            arrived: update.arrived,
        }
    }
}

/// A request without a position is malformed, not a report at (0, 0).
fn report_from_request(req: pb::SignalEmergencyRequest) -> Result<EmergencyReport, DispatchError> {
    let position = req
        .position
        .map(Coordinates::from)
        .ok_or_else(|| DispatchError::Validation("position is required".to_string()))?;

    Ok(EmergencyReport {
        kind: pb::kind_from_wire(req.r#type),
        position,
        description: req.description,
        citizen_id: Some(req.citizen_id),
    })
}

/// POST SignalEmergency -- unary.
pub async fn signal_emergency(
    State(state): State<AppState>,
    Protobuf(req): Protobuf<pb::SignalEmergencyRequest>,
) -> RpcResult<Protobuf<pb::SignalEmergencyResponse>> {
    let ack = state
        .service
        .signal_emergency(report_from_request(req)?)
        .await?;

    Ok(Protobuf(pb::SignalEmergencyResponse {
        intervention_id: ack.intervention_id,
        acknowledged: ack.acknowledged,
        message: ack.message,
        status: pb::ReportStatus::from(ack.status) as i32,
    }))
}

/// POST TrackIntervention -- server-streaming.
///
/// Unknown identities fail before the stream opens. Once open, the body ends
/// on arrival; a client closing the body cancels the session.
pub async fn track_intervention(
    State(state): State<AppState>,
    Protobuf(req): Protobuf<pb::TrackInterventionRequest>,
) -> RpcResult<Response> {
    let handle = state.service.open_tracking(&req.intervention_id).await?;
    let updates = ReceiverStream::new(handle.updates).map(pb::TrackingUpdate::from);
    Ok(framed_stream(updates))
}

/// POST ListHistory -- unary.
pub async fn list_history(
    State(state): State<AppState>,
    Protobuf(req): Protobuf<pb::ListHistoryRequest>,
) -> RpcResult<Protobuf<pb::ListHistoryResponse>> {
    let records = state
        .service
        .list_history(req.citizen_id.as_deref())
        .await?;

    Ok(Protobuf(pb::ListHistoryResponse {
        records: records.iter().map(pb::HistoryRecord::from).collect(),
    }))
}

/// POST GetIntervention -- unary.
pub async fn get_intervention(
    State(state): State<AppState>,
    Protobuf(req): Protobuf<pb::GetInterventionRequest>,
) -> RpcResult<Protobuf<pb::HistoryRecord>> {
    let report: InterventionReport = state
        .service
        .find_intervention(req.intervention_id.trim())
        .await?;
    Ok(Protobuf(pb::HistoryRecord::from(&report)))
}

/// GET /emergency-types -- the kinds a citizen can choose from.
pub async fn emergency_types() -> Json<Vec<EmergencyKind>> {
    Json(EmergencyKind::SELECTABLE.to_vec())
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store_healthy: bool,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = state
        .service
        .store()
        .scan(&ScanFilter::default(), 1)
        .await
        .is_ok();

    Json(HealthResponse {
        status: if store_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store_healthy,
    })
}
