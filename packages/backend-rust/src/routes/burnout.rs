use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utbk_burnout::ValidationResult;

use crate::db::operations;
use crate::response::{AppError, SuccessResponse};
use crate::services::burnout::{calculate_batch, calculate_for_session, BurnoutServiceError};
use crate::state::AppState;

const MAX_BATCH_SIZE: usize = 1000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsufficientDataResponse {
    success: bool,
    can_calculate: bool,
    code: &'static str,
    reason: String,
    answered_count: usize,
    required_count: usize,
}

impl From<ValidationResult> for InsufficientDataResponse {
    fn from(verdict: ValidationResult) -> Self {
        Self {
            success: false,
            can_calculate: false,
            code: "INSUFFICIENT_DATA",
            reason: verdict
                .reason
                .unwrap_or_else(|| "not enough answered questions".to_string()),
            answered_count: verdict.answered_count,
            required_count: verdict.required_count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    session_ids: Option<Vec<String>>,
    user_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/:sessionId", get(get_metrics))
        .route("/sessions/:sessionId/calculate", post(calculate))
        .route("/batch", post(batch))
}

async fn calculate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    let calculator = state.calculator();
    match calculate_for_session(state.db(), &calculator, &session_id).await {
        Ok(stored) => Ok(Json(SuccessResponse::new(stored)).into_response()),
        Err(BurnoutServiceError::InsufficientData(verdict)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(InsufficientDataResponse::from(verdict)),
        )
            .into_response()),
        Err(BurnoutServiceError::SessionNotFound(id)) => {
            Err(AppError::not_found(format!("Session {id} not found")))
        }
        Err(BurnoutServiceError::Db(err)) => Err(err.into()),
    }
}

async fn get_metrics(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stored = operations::get_metrics(state.db(), &session_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("No burnout metrics for session {session_id}"))
        })?;
    Ok(Json(SuccessResponse::new(stored)))
}

async fn batch(
    State(state): State<AppState>,
    payload: Option<Json<BatchRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.unwrap_or_default();

    // An explicit id list wins, even when empty.
    let session_ids = match (request.session_ids, request.user_id) {
        (Some(ids), _) => {
            if ids.len() > MAX_BATCH_SIZE {
                return Err(AppError::validation(format!(
                    "at most {MAX_BATCH_SIZE} sessionIds per batch"
                )));
            }
            ids
        }
        (None, Some(user_id)) if !user_id.trim().is_empty() => {
            // Newest sessions first
            operations::list_session_ids_for_user(
                state.db(),
                user_id.trim(),
                MAX_BATCH_SIZE as i64,
            )
            .await?
        }
        _ => operations::list_completed_without_metrics(state.db(), MAX_BATCH_SIZE as i64).await?,
    };

    let calculator = state.calculator();
    let report = calculate_batch(state.db(), &calculator, &session_ids).await;
    Ok(Json(SuccessResponse::new(report)))
}
