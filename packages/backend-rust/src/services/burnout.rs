use serde::Serialize;
use utbk_burnout::{
    prepare_events, BurnoutCalculator, BurnoutError, BurnoutLevel, SessionContext,
    ValidationResult,
};

use crate::db::operations::{
    get_session, list_answers, mark_unscorable, upsert_metrics, AnswerRecord, StoredBurnoutMetrics,
};
use crate::db::{Database, DbError};

#[derive(Debug, thiserror::Error)]
pub enum BurnoutServiceError {
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error("{}", .0.reason.as_deref().unwrap_or("insufficient data"))]
    InsufficientData(ValidationResult),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSuccess {
    pub session_id: String,
    pub burnout_level: BurnoutLevel,
    pub fatigue_index: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub session_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub processed: usize,
    pub succeeded: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
}

/// Scores one session from its stored answers and persists the result,
/// overwriting any earlier score. A session with too few timed answers gets
/// no metrics row; it is only flagged so the pending sweep skips it.
pub async fn calculate_for_session(
    db: &Database,
    calculator: &BurnoutCalculator,
    session_id: &str,
) -> Result<StoredBurnoutMetrics, BurnoutServiceError> {
    let session = get_session(db, session_id)
        .await?
        .ok_or_else(|| BurnoutServiceError::SessionNotFound(session_id.to_string()))?;

    let records = list_answers(db, session_id).await?;
    let raw = records
        .iter()
        .map(AnswerRecord::to_event)
        .collect::<Result<Vec<_>, _>>()?;
    let prepared = prepare_events(raw);
    let context = SessionContext::with_skipped(prepared.skipped_count);

    let result = match calculator.calculate(&prepared.events, &context) {
        Ok(result) => result,
        Err(BurnoutError::InsufficientData { answered, required }) => {
            tracing::debug!(
                session_id = %session_id,
                answered,
                required,
                skipped = prepared.skipped_count,
                untimed = prepared.untimed_count,
                "not enough answers to score session"
            );
            mark_unscorable(db, session_id).await?;
            let verdict = utbk_burnout::validate_events(&prepared.events, calculator.config());
            return Err(BurnoutServiceError::InsufficientData(verdict));
        }
    };

    let stored = upsert_metrics(db, &session.id, &session.user_id, &result).await?;

    tracing::info!(
        session_id = %session_id,
        user_id = %session.user_id,
        fatigue_index = stored.fatigue_index,
        burnout_level = %stored.burnout_level,
        "burnout metrics updated"
    );

    Ok(stored)
}

/// Scores each session in order. A failing session is recorded in the
/// report and the batch moves on.
pub async fn calculate_batch(
    db: &Database,
    calculator: &BurnoutCalculator,
    session_ids: &[String],
) -> BatchReport {
    let mut report = BatchReport::default();

    for session_id in session_ids {
        report.processed += 1;
        match calculate_for_session(db, calculator, session_id).await {
            Ok(stored) => report.succeeded.push(BatchSuccess {
                session_id: session_id.clone(),
                burnout_level: stored.burnout_level,
                fatigue_index: stored.fatigue_index,
            }),
            Err(err) => {
                if let BurnoutServiceError::Db(ref db_err) = err {
                    tracing::warn!(session_id = %session_id, error = %db_err, "batch scoring failed");
                }
                report.failed.push(BatchFailure {
                    session_id: session_id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "burnout batch finished"
    );

    report
}
