use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::{debug, info};

use super::{queries, DbPool, InterventionStore, ScanFilter};
use crate::error::{DispatchError, DispatchResult};
use crate::models::{Coordinates, EmergencyKind, InterventionReport, InterventionStatus};

/// Row shape of the `interventions` table. Labels are kept as text so that
/// rows written by older services still decode.
#[derive(Debug, FromRow)]
struct InterventionRow {
    intervention_id: String,
    kind: String,
    latitude: f64,
    longitude: f64,
    description: String,
    citizen_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<InterventionRow> for InterventionReport {
    fn from(row: InterventionRow) -> Self {
        Self {
            intervention_id: row.intervention_id,
            kind: EmergencyKind::from_label(&row.kind),
            position: Coordinates::new(row.latitude, row.longitude),
            description: row.description,
            citizen_id: row.citizen_id.filter(|c| !c.is_empty()),
            status: InterventionStatus::from_label(&row.status),
            created_at: row.created_at,
        }
    }
}

/// Durable store backed by a Postgres `interventions` table.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the table and index if they do not exist yet.
    pub async fn ensure_schema(&self) -> DispatchResult<()> {
        sqlx::query(queries::CREATE_INTERVENTIONS_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(queries::CREATE_CITIZEN_INDEX)
            .execute(&self.pool)
            .await?;
        info!("interventions schema ready");
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[async_trait]
impl InterventionStore for PgStore {
    async fn insert(&self, report: InterventionReport) -> DispatchResult<String> {
        let result = sqlx::query(queries::INSERT_INTERVENTION)
            .bind(&report.intervention_id)
            .bind(report.kind.as_str())
            .bind(report.position.latitude)
            .bind(report.position.longitude)
            .bind(&report.description)
            .bind(report.citizen_id.as_deref())
            .bind(report.status.as_str())
            .bind(report.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                debug!(intervention_id = %report.intervention_id, "intervention row inserted");
                Ok(report.intervention_id)
            }
            Err(e) if is_unique_violation(&e) => {
                Err(DispatchError::Conflict(report.intervention_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, intervention_id: &str) -> DispatchResult<Option<InterventionReport>> {
        let row: Option<InterventionRow> = sqlx::query_as(queries::SELECT_INTERVENTION_BY_ID)
            .bind(intervention_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(InterventionReport::from))
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        limit: usize,
    ) -> DispatchResult<Vec<InterventionReport>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<InterventionRow> = sqlx::query_as(queries::SCAN_INTERVENTIONS)
            .bind(filter.citizen_id.as_deref())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(InterventionReport::from).collect())
    }

    async fn update_status(
        &self,
        intervention_id: &str,
        status: InterventionStatus,
    ) -> DispatchResult<bool> {
        let result = sqlx::query(queries::UPDATE_INTERVENTION_STATUS)
            .bind(intervention_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(kind: &str, status: &str, citizen_id: Option<&str>) -> InterventionRow {
        InterventionRow {
            intervention_id: "65a1f0c2e4b0".to_string(),
            kind: kind.to_string(),
            latitude: 36.8,
            longitude: 10.1,
            description: "Collision légère - Test Data".to_string(),
            citizen_id: citizen_id.map(str::to_string),
            status: status.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 12, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_legacy_row_decodes() {
        let report = InterventionReport::from(row("ACCIDENT_ROUTE", "TERMINE", Some("")));
        assert_eq!(report.kind, EmergencyKind::RoadAccident);
        assert_eq!(report.status, InterventionStatus::Completed);
        assert_eq!(report.citizen_id, None);
        assert_eq!(report.position, Coordinates::new(36.8, 10.1));
    }

    #[test]
    fn test_unrecognised_kind_decodes_as_unknown() {
        let report = InterventionReport::from(row("TSUNAMI", "PENDING", Some("c-7")));
        assert_eq!(report.kind, EmergencyKind::Unknown);
        assert_eq!(report.citizen_id.as_deref(), Some("c-7"));
    }
}
