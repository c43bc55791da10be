use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{InterventionStore, ScanFilter};
use crate::error::{DispatchError, DispatchResult};
use crate::models::{InterventionReport, InterventionStatus};

#[derive(Default)]
struct Inner {
    records: Vec<InterventionReport>,
    index: HashMap<String, usize>,
}

/// Process-local store. Records keep their insertion order; a single lock
/// serializes writers against readers.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }
}

#[async_trait]
impl InterventionStore for MemoryStore {
    async fn insert(&self, report: InterventionReport) -> DispatchResult<String> {
        let mut inner = self.inner.write().await;
        if inner.index.contains_key(&report.intervention_id) {
            return Err(DispatchError::Conflict(report.intervention_id));
        }
        let id = report.intervention_id.clone();
        let position = inner.records.len();
        inner.index.insert(id.clone(), position);
        inner.records.push(report);
        Ok(id)
    }

    async fn find_by_id(&self, intervention_id: &str) -> DispatchResult<Option<InterventionReport>> {
        let inner = self.inner.read().await;
        Ok(inner
            .index
            .get(intervention_id)
            .map(|&i| inner.records[i].clone()))
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        limit: usize,
    ) -> DispatchResult<Vec<InterventionReport>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        intervention_id: &str,
        status: InterventionStatus,
    ) -> DispatchResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(&i) = inner.index.get(intervention_id) else {
            return Ok(false);
        };
        let record = &mut inner.records[i];
        if !record.status.can_advance_to(status) {
            return Ok(false);
        }
        record.status = status;
        Ok(true)
    }
}
