use tracing::info;

use super::DispatchService;
use crate::db::ScanFilter;
use crate::error::DispatchResult;
use crate::models::InterventionReport;

/// Maximum number of records a history query returns.
pub const HISTORY_PAGE_LIMIT: usize = 20;

impl DispatchService {
    /// Past reports in insertion order, optionally for one citizen only.
    ///
    /// A blank filter means "all citizens". The store answers from a single
    /// consistent read, so records committed after the query started are left
    /// out without comparing clocks.
    pub async fn list_history(
        &self,
        citizen_id: Option<&str>,
    ) -> DispatchResult<Vec<InterventionReport>> {
        let filter = ScanFilter {
            citizen_id: citizen_id
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        };

        let records = self.store.scan(&filter, HISTORY_PAGE_LIMIT).await?;
        info!(
            citizen_id = filter.citizen_id.as_deref().unwrap_or("*"),
            count = records.len(),
            "History retrieved"
        );
        Ok(records)
    }
}
