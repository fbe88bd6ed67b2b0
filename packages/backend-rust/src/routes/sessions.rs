use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utbk_burnout::BurnoutLevel;

use crate::db::operations::{self, NewAnswer, NewSession, QuizSession, SessionStatus};
use crate::db::{format_datetime, now_iso, parse_datetime};
use crate::response::{json_error, AppError, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    user_id: String,
    subtest: Option<String>,
    total_questions: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSessionsQuery {
    user_id: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    limit: i64,
    offset: i64,
}

#[derive(Serialize)]
struct ListResponse<T> {
    success: bool,
    data: T,
    pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BurnoutSummary {
    burnout_level: BurnoutLevel,
    fatigue_index: f64,
    calculated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionDetail {
    #[serde(flatten)]
    session: QuizSession,
    answer_count: i64,
    burnout: Option<BurnoutSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAnswerRequest {
    question_id: String,
    selected_answer: Option<String>,
    is_correct: bool,
    #[serde(default)]
    is_skipped: bool,
    time_spent: f64,
    answered_at: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/:sessionId", get(get_session))
        .route("/:sessionId/end", post(end_session))
        .route("/:sessionId/answers", get(list_answers).post(submit_answer))
}

async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = payload.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(AppError::validation("userId is required"));
    }
    if let Some(total) = payload.total_questions {
        if total <= 0 {
            return Err(AppError::validation("totalQuestions must be a positive integer"));
        }
    }

    let subtest = payload
        .subtest
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let session = operations::create_session(
        state.db(),
        NewSession {
            user_id,
            subtest,
            total_questions: payload.total_questions,
        },
    )
    .await?;

    tracing::info!(session_id = %session.id, user_id = %session.user_id, "session started");

    Ok((StatusCode::CREATED, Json(SuccessResponse::new(session))))
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = query
        .user_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("userId query parameter is required"))?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let sessions = operations::list_sessions(state.db(), &user_id, limit, offset).await?;

    Ok(Json(ListResponse {
        success: true,
        data: sessions,
        pagination: Pagination { limit, offset },
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = operations::require_session(state.db(), &session_id).await?;
    let answer_count = operations::count_answers(state.db(), &session_id).await?;
    let burnout = operations::get_metrics(state.db(), &session_id)
        .await?
        .map(|m| BurnoutSummary {
            burnout_level: m.burnout_level,
            fatigue_index: m.fatigue_index,
            calculated_at: m.calculated_at,
        });

    Ok(Json(SuccessResponse::new(SessionDetail {
        session,
        answer_count,
        burnout,
    })))
}

async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = operations::end_session(state.db(), &session_id).await?;
    tracing::info!(session_id = %session.id, "session ended");
    Ok(Json(SuccessResponse::new(session)))
}

async fn submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question_id = payload.question_id.trim().to_string();
    if question_id.is_empty() {
        return Err(AppError::validation("questionId is required"));
    }
    if !payload.time_spent.is_finite() || payload.time_spent < 0.0 {
        return Err(AppError::validation(
            "timeSpent must be a non-negative number of seconds",
        ));
    }

    let answered_at = match payload.answered_at.as_deref() {
        Some(raw) => parse_datetime(raw)
            .map(format_datetime)
            .ok_or_else(|| AppError::validation("answeredAt must be an RFC 3339 timestamp"))?,
        None => now_iso(),
    };

    let session = operations::require_session(state.db(), &session_id).await?;
    if session.status != SessionStatus::Active {
        return Err(json_error(
            StatusCode::CONFLICT,
            "SESSION_NOT_ACTIVE",
            format!("Session {session_id} is already completed"),
        ));
    }

    let record = operations::upsert_answer(
        state.db(),
        NewAnswer {
            session_id,
            question_id,
            selected_answer: payload.selected_answer,
            is_correct: payload.is_correct,
            is_skipped: payload.is_skipped,
            time_spent: Some(payload.time_spent),
            answered_at,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(SuccessResponse::new(record))))
}

async fn list_answers(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    operations::require_session(state.db(), &session_id).await?;
    let answers = operations::list_answers(state.db(), &session_id).await?;
    Ok(Json(SuccessResponse::new(answers)))
}
