//! Live tracking of a responding unit.
//!
//! A [`TrackingSession`] is a small state machine advanced once per tick:
//!
//! ```text
//!   ACTIVE --advance, eta > 0--> ACTIVE      (emits en-route update)
//!   ACTIVE --advance, eta = 0--> ARRIVED     (emits the single arrival update)
//!   ACTIVE --peer gone---------> CANCELLED   (emits nothing)
//! ```
//!
//! [`run_session`] drives it against an [`UpdateSink`]: wait for the tick,
//! check the peer is still there, advance, deliver. The session lives on the
//! driving task only and is dropped when the stream ends.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::models::Coordinates;

pub const EN_ROUTE_MESSAGE: &str = "Unit en route, sirens on";
pub const ARRIVAL_MESSAGE: &str = "Unit arrived on scene";

/// Simulation parameters. They do not depend on the report being tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingParams {
    pub start: Coordinates,
    /// (latitude, longitude) displacement applied on every tick.
    pub step: (f64, f64),
    pub initial_eta_minutes: u32,
    pub eta_step_minutes: u32,
    pub tick: Duration,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            start: Coordinates::new(36.8065, 10.1815),
            step: (-0.001, 0.001),
            initial_eta_minutes: 10,
            eta_step_minutes: 1,
            tick: Duration::from_secs(1),
        }
    }
}

impl TrackingParams {
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_initial_eta(mut self, minutes: u32) -> Self {
        self.initial_eta_minutes = minutes;
        self
    }

    /// Upper bound on the number of updates a session can emit.
    pub fn max_updates(&self) -> u32 {
        self.initial_eta_minutes / self.eta_step_minutes.max(1) + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Arrived,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Active)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingUpdate {
    /// 1-based tick number within the session.
    pub tick: u32,
    pub position: Coordinates,
    pub eta_minutes: u32,
    pub status_message: String,
    pub arrived: bool,
}

#[derive(Debug)]
pub struct TrackingSession {
    intervention_id: String,
    params: TrackingParams,
    position: Coordinates,
    eta_minutes: u32,
    tick: u32,
    state: SessionState,
}

impl TrackingSession {
    pub fn new(intervention_id: impl Into<String>, params: TrackingParams) -> Self {
        Self {
            intervention_id: intervention_id.into(),
            position: params.start,
            eta_minutes: params.initial_eta_minutes,
            tick: 0,
            state: SessionState::Active,
            params,
        }
    }

    pub fn intervention_id(&self) -> &str {
        &self.intervention_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn eta_minutes(&self) -> u32 {
        self.eta_minutes
    }

    /// Performs one tick. Returns `None` once the session is terminal.
    pub fn advance(&mut self) -> Option<TrackingUpdate> {
        if self.state != SessionState::Active {
            return None;
        }

        let (delta_lat, delta_lon) = self.params.step;
        self.position = self.position.offset(delta_lat, delta_lon);
        self.eta_minutes = self
            .eta_minutes
            .saturating_sub(self.params.eta_step_minutes.max(1));
        self.tick += 1;

        let arrived = self.eta_minutes == 0;
        if arrived {
            self.state = SessionState::Arrived;
        }

        Some(TrackingUpdate {
            tick: self.tick,
            position: self.position,
            eta_minutes: self.eta_minutes,
            status_message: if arrived {
                ARRIVAL_MESSAGE
            } else {
                EN_ROUTE_MESSAGE
            }
            .to_string(),
            arrived,
        })
    }

    /// Peer went away. No-op once the session has arrived.
    pub fn cancel(&mut self) {
        if self.state == SessionState::Active {
            self.state = SessionState::Cancelled;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("tracking stream closed by peer")]
pub struct SinkClosed;

/// Receiving end of a tracking stream as seen by the session driver.
#[async_trait]
pub trait UpdateSink: Send {
    /// Transport-level liveness of the call.
    fn is_active(&self) -> bool;

    /// Resolves once the peer has gone away.
    async fn closed(&self);

    async fn deliver(&mut self, update: TrackingUpdate) -> Result<(), SinkClosed>;
}

#[async_trait]
impl UpdateSink for mpsc::Sender<TrackingUpdate> {
    fn is_active(&self) -> bool {
        !self.is_closed()
    }

    async fn closed(&self) {
        mpsc::Sender::closed(self).await
    }

    async fn deliver(&mut self, update: TrackingUpdate) -> Result<(), SinkClosed> {
        self.send(update).await.map_err(|_| SinkClosed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub intervention_id: String,
    pub outcome: SessionState,
    pub updates_sent: u32,
}

/// Drives `session` until arrival or until the peer disconnects.
///
/// The first update goes out immediately, later ones one tick apart. A
/// disconnect wakes the driver early, so cancellation never waits longer
/// than one tick and nothing is delivered after it is observed.
pub async fn run_session<S: UpdateSink>(
    mut session: TrackingSession,
    sink: &mut S,
) -> SessionSummary {
    let mut ticker = tokio::time::interval(session.params.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut updates_sent = 0;

    info!(
        intervention_id = %session.intervention_id(),
        eta = session.eta_minutes(),
        "Tracking session started"
    );

    loop {
        tokio::select! {
            biased;
            _ = sink.closed() => {}
            _ = ticker.tick() => {}
        }

        if !sink.is_active() {
            session.cancel();
            break;
        }

        let Some(update) = session.advance() else {
            break;
        };
        debug!(
            intervention_id = %session.intervention_id(),
            tick = update.tick,
            eta = update.eta_minutes,
            lat = update.position.latitude,
            lon = update.position.longitude,
            "Tracking update"
        );

        if sink.deliver(update).await.is_err() {
            session.cancel();
            break;
        }
        updates_sent += 1;

        if session.state().is_terminal() {
            break;
        }
    }

    match session.state() {
        SessionState::Arrived => info!(
            intervention_id = %session.intervention_id(),
            updates = updates_sent,
            "Unit arrived, tracking finished"
        ),
        _ => info!(
            intervention_id = %session.intervention_id(),
            updates = updates_sent,
            "Client left, tracking cancelled"
        ),
    }

    SessionSummary {
        intervention_id: session.intervention_id,
        outcome: session.state,
        updates_sent,
    }
}
