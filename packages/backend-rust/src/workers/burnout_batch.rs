use std::time::Instant;

use tracing::{debug, info};
use utbk_burnout::BurnoutCalculator;

use crate::db::operations::list_completed_without_metrics;
use crate::db::Database;
use crate::services::burnout::{calculate_batch, BatchReport};

pub const SESSIONS_PER_CYCLE: i64 = 500;

/// Scores up to `limit` completed sessions that have no stored metrics yet.
/// Sessions that turn out too short are flagged and not picked up again
/// until they receive another answer.
pub async fn score_pending_sessions(
    db: &Database,
    calculator: &BurnoutCalculator,
    limit: i64,
) -> Result<BatchReport, super::WorkerError> {
    let start = Instant::now();

    let pending = list_completed_without_metrics(db, limit).await?;
    if pending.is_empty() {
        debug!("No completed sessions awaiting burnout scoring");
        return Ok(BatchReport::default());
    }

    let report = calculate_batch(db, calculator, &pending).await;

    info!(
        processed = report.processed,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        duration_secs = format!("{:.2}", start.elapsed().as_secs_f64()),
        "Burnout batch cycle completed"
    );

    Ok(report)
}
