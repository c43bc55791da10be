use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::error::DispatchResult;
use crate::models::{InterventionReport, InterventionStatus};

pub mod memory;
pub mod postgres;
pub mod queries;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Optional restrictions applied by [`InterventionStore::scan`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanFilter {
    /// Exact match on the reporting citizen.
    pub citizen_id: Option<String>,
}

impl ScanFilter {
    pub fn for_citizen(citizen_id: impl Into<String>) -> Self {
        Self {
            citizen_id: Some(citizen_id.into()),
        }
    }

    pub fn matches(&self, report: &InterventionReport) -> bool {
        match &self.citizen_id {
            Some(citizen_id) => report.citizen_id.as_deref() == Some(citizen_id.as_str()),
            None => true,
        }
    }
}

/// Keyed storage of intervention records.
///
/// Every write is atomic: a reader sees either the whole record or nothing.
/// Backend failures surface as `DispatchError::StorageUnavailable`.
#[async_trait]
pub trait InterventionStore: Send + Sync {
    /// Stores a report under its pre-generated identity and returns it.
    async fn insert(&self, report: InterventionReport) -> DispatchResult<String>;

    async fn find_by_id(&self, intervention_id: &str) -> DispatchResult<Option<InterventionReport>>;

    /// Returns at most `limit` matching records in insertion order, read from
    /// one consistent view: every insert committed before the scan starts is
    /// included and nothing committed after it is.
    async fn scan(&self, filter: &ScanFilter, limit: usize)
        -> DispatchResult<Vec<InterventionReport>>;

    /// Moves an existing record forward to `status`. The check and the write
    /// are one atomic step. Returns `false` when the identity is unknown or
    /// the record is already at or past `status`.
    async fn update_status(
        &self,
        intervention_id: &str,
        status: InterventionStatus,
    ) -> DispatchResult<bool>;
}
