use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::db::InterventionStore;
use crate::error::{DispatchError, DispatchResult};
use crate::models::InterventionStatus;

pub mod history;
pub mod intake;
pub mod tracking;

pub use history::HISTORY_PAGE_LIMIT;
pub use intake::{Acknowledgement, EmergencyReport, ACK_MESSAGE};
use tracking::{run_session, SessionState, SessionSummary, TrackingParams, TrackingSession};
pub use tracking::TrackingUpdate;

/// Updates buffered between a session and a slow client.
const UPDATE_BUFFER: usize = 4;

/// Entry point for every dispatch operation. Cheap to clone; the store is
/// shared, tracking sessions are not.
#[derive(Clone)]
pub struct DispatchService {
    store: Arc<dyn InterventionStore>,
    tracking: TrackingParams,
}

/// An open tracking stream.
#[derive(Debug)]
pub struct TrackingHandle {
    pub updates: mpsc::Receiver<TrackingUpdate>,
    pub session: JoinHandle<SessionSummary>,
}

impl DispatchService {
    pub fn new(store: Arc<dyn InterventionStore>, tracking: TrackingParams) -> Self {
        Self { store, tracking }
    }

    pub fn store(&self) -> &Arc<dyn InterventionStore> {
        &self.store
    }

    pub fn tracking_params(&self) -> &TrackingParams {
        &self.tracking
    }

    /// Looks up a single intervention.
    pub async fn find_intervention(
        &self,
        intervention_id: &str,
    ) -> DispatchResult<crate::models::InterventionReport> {
        self.store
            .find_by_id(intervention_id)
            .await?
            .ok_or_else(|| DispatchError::NotFound(intervention_id.to_string()))
    }

    /// Opens a tracking stream for a known intervention.
    ///
    /// A pending intervention is marked in progress before the first update;
    /// on arrival it is marked completed. Dropping `updates` cancels the
    /// session within one tick.
    pub async fn open_tracking(&self, intervention_id: &str) -> DispatchResult<TrackingHandle> {
        let intervention_id = intervention_id.trim();
        if intervention_id.is_empty() {
            return Err(DispatchError::Validation(
                "intervention id must not be empty".to_string(),
            ));
        }

        self.find_intervention(intervention_id).await?;
        // The store refuses backward moves, so a completed intervention stays
        // completed even if another stream finished since the lookup.
        self.store
            .update_status(intervention_id, InterventionStatus::InProgress)
            .await?;

        let (mut tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let session = TrackingSession::new(intervention_id, self.tracking.clone());
        let store = self.store.clone();

        let task = tokio::spawn(async move {
            let summary = run_session(session, &mut tx).await;
            drop(tx);
            if summary.outcome == SessionState::Arrived {
                mark_completed(store.as_ref(), &summary.intervention_id).await;
            }
            summary
        });

        Ok(TrackingHandle {
            updates: rx,
            session: task,
        })
    }
}

async fn mark_completed(store: &dyn InterventionStore, intervention_id: &str) {
    match store
        .update_status(intervention_id, InterventionStatus::Completed)
        .await
    {
        Ok(true) => info!(intervention_id = %intervention_id, "Intervention completed"),
        Ok(false) => debug!(
            intervention_id = %intervention_id,
            "Intervention already completed or gone"
        ),
        Err(e) => error!(
            intervention_id = %intervention_id,
            "Failed to mark intervention completed: {}", e
        ),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;

    use crate::db::{InterventionStore, ScanFilter};
    use crate::error::{DispatchError, DispatchResult};
    use crate::models::{InterventionReport, InterventionStatus};

    /// A store whose backend is always down.
    pub struct UnreachableStore;

    fn down() -> DispatchError {
        DispatchError::StorageUnavailable(sqlx::Error::PoolTimedOut)
    }

    #[async_trait]
    impl InterventionStore for UnreachableStore {
        async fn insert(&self, _report: InterventionReport) -> DispatchResult<String> {
            Err(down())
        }

        async fn find_by_id(&self, _id: &str) -> DispatchResult<Option<InterventionReport>> {
            Err(down())
        }

        async fn scan(
            &self,
            _filter: &ScanFilter,
            _limit: usize,
        ) -> DispatchResult<Vec<InterventionReport>> {
            Err(down())
        }

        async fn update_status(
            &self,
            _id: &str,
            _status: InterventionStatus,
        ) -> DispatchResult<bool> {
            Err(down())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Coordinates, EmergencyKind};
    use std::time::Duration;

    fn service() -> DispatchService {
        DispatchService::new(
            Arc::new(MemoryStore::new()),
            TrackingParams::default().with_tick(Duration::from_millis(50)),
        )
    }

    async fn signal(service: &DispatchService) -> String {
        service
            .signal_emergency(EmergencyReport {
                kind: EmergencyKind::RoadAccident,
                position: Coordinates::new(36.85, 10.20),
                description: "Collision".to_string(),
                citizen_id: None,
            })
            .await
            .unwrap()
            .intervention_id
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracking_runs_to_completion() {
        let service = service();
        let id = signal(&service).await;

        let mut handle = service.open_tracking(&id).await.unwrap();
        let first = handle.updates.recv().await.unwrap();
        assert!(first.eta_minutes < service.tracking_params().initial_eta_minutes);
        assert_eq!(
            service.find_intervention(&id).await.unwrap().status,
            InterventionStatus::InProgress
        );

        let mut last = first;
        while let Some(update) = handle.updates.recv().await {
            last = update;
        }
        assert_eq!(last.eta_minutes, 0);
        assert!(last.arrived);

        let summary = handle.session.await.unwrap();
        assert_eq!(summary.outcome, SessionState::Arrived);
        assert_eq!(
            service.find_intervention(&id).await.unwrap().status,
            InterventionStatus::Completed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_tracking_leaves_in_progress() {
        let service = service();
        let id = signal(&service).await;

        let mut handle = service.open_tracking(&id).await.unwrap();
        handle.updates.recv().await.unwrap();
        handle.updates.recv().await.unwrap();
        drop(handle.updates);

        let summary = handle.session.await.unwrap();
        assert_eq!(summary.outcome, SessionState::Cancelled);
        assert_eq!(summary.updates_sent, 2);
        assert_eq!(
            service.find_intervention(&id).await.unwrap().status,
            InterventionStatus::InProgress
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retracking_completed_intervention_does_not_regress_status() {
        let service = service();
        let id = signal(&service).await;
        service
            .store()
            .update_status(&id, InterventionStatus::Completed)
            .await
            .unwrap();

        let mut handle = service.open_tracking(&id).await.unwrap();
        assert_eq!(
            service.find_intervention(&id).await.unwrap().status,
            InterventionStatus::Completed
        );
        while handle.updates.recv().await.is_some() {}
        assert_eq!(
            handle.session.await.unwrap().outcome,
            SessionState::Arrived
        );
        assert_eq!(
            service.find_intervention(&id).await.unwrap().status,
            InterventionStatus::Completed
        );
    }

    /// Answers lookups with a snapshot taken before the record was completed.
    struct StaleLookupStore {
        inner: Arc<MemoryStore>,
        snapshot: crate::models::InterventionReport,
    }

    #[async_trait::async_trait]
    impl InterventionStore for StaleLookupStore {
        async fn insert(
            &self,
            report: crate::models::InterventionReport,
        ) -> DispatchResult<String> {
            self.inner.insert(report).await
        }

        async fn find_by_id(
            &self,
            _id: &str,
        ) -> DispatchResult<Option<crate::models::InterventionReport>> {
            Ok(Some(self.snapshot.clone()))
        }

        async fn scan(
            &self,
            filter: &crate::db::ScanFilter,
            limit: usize,
        ) -> DispatchResult<Vec<crate::models::InterventionReport>> {
            self.inner.scan(filter, limit).await
        }

        async fn update_status(
            &self,
            id: &str,
            status: InterventionStatus,
        ) -> DispatchResult<bool> {
            self.inner.update_status(id, status).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_opened_on_stale_read_keeps_completed_status() {
        let inner = Arc::new(MemoryStore::new());
        let plain = DispatchService::new(inner.clone(), TrackingParams::default());
        let id = signal(&plain).await;
        let snapshot = plain.find_intervention(&id).await.unwrap();
        assert_eq!(snapshot.status, InterventionStatus::Pending);

        // Another stream reaches arrival between this lookup and the write.
        inner
            .update_status(&id, InterventionStatus::Completed)
            .await
            .unwrap();

        let service = DispatchService::new(
            Arc::new(StaleLookupStore {
                inner: inner.clone(),
                snapshot,
            }),
            TrackingParams::default().with_tick(Duration::from_millis(50)),
        );
        let mut handle = service.open_tracking(&id).await.unwrap();
        handle.updates.recv().await.unwrap();
        assert_eq!(
            inner.find_by_id(&id).await.unwrap().unwrap().status,
            InterventionStatus::Completed
        );

        drop(handle.updates);
        handle.session.await.unwrap();
        assert_eq!(
            inner.find_by_id(&id).await.unwrap().unwrap().status,
            InterventionStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_tracking_unknown_intervention_is_not_found() {
        let service = service();
        let err = service.open_tracking("does-not-exist").await.unwrap_err();
        assert!(matches!(err, DispatchError::NotFound(ref id) if id == "does-not-exist"));
    }

    #[tokio::test]
    async fn test_tracking_requires_an_id() {
        let service = service();
        let err = service.open_tracking("  ").await.unwrap_err();
        assert!(matches!(err, DispatchError::Validation(_)));
    }

    #[tokio::test]
    async fn test_tracking_with_store_down_fails_before_streaming() {
        let service = DispatchService::new(
            Arc::new(test_support::UnreachableStore),
            TrackingParams::default(),
        );
        let err = service.open_tracking("x").await.unwrap_err();
        assert!(matches!(err, DispatchError::StorageUnavailable(_)));
    }
}
