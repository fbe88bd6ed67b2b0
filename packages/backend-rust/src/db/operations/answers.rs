use serde::{Deserialize, Serialize};
use sqlx::Row;
use utbk_burnout::AnswerEvent;
use uuid::Uuid;

use crate::db::{parse_datetime, Database, DbError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub id: String,
    pub session_id: String,
    pub question_id: String,
    pub selected_answer: Option<String>,
    pub is_correct: bool,
    pub is_skipped: bool,
    pub time_spent: Option<f64>,
    pub answered_at: String,
}

impl AnswerRecord {
    /// Untimed records become zero-time events, which the scorer filters out.
    pub fn to_event(&self) -> Result<AnswerEvent, DbError> {
        let answered_at = parse_datetime(&self.answered_at).ok_or_else(|| {
            DbError::Corrupt(format!(
                "answer {} has unreadable answeredAt {:?}",
                self.id, self.answered_at
            ))
        })?;
        Ok(AnswerEvent {
            time_spent: self.time_spent.unwrap_or(0.0),
            is_correct: self.is_correct,
            is_skipped: self.is_skipped,
            answered_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub session_id: String,
    pub question_id: String,
    pub selected_answer: Option<String>,
    pub is_correct: bool,
    pub is_skipped: bool,
    pub time_spent: Option<f64>,
    /// RFC 3339 with millisecond precision
    pub answered_at: String,
}

/// Stores an answer. Answering the same question again in the same session
/// replaces the earlier answer and keeps its id.
/// Also clears the session's unscorable mark, since the new answer may make
/// it scorable.
pub async fn upsert_answer(db: &Database, input: NewAnswer) -> Result<AnswerRecord, DbError> {
    let mut tx = db.pool().begin().await?;
    sqlx::query(
        r#"
        INSERT INTO "answer_records"
            ("id", "sessionId", "questionId", "selectedAnswer", "isCorrect", "isSkipped", "timeSpent", "answeredAt")
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT ("sessionId", "questionId") DO UPDATE SET
            "selectedAnswer" = excluded."selectedAnswer",
            "isCorrect" = excluded."isCorrect",
            "isSkipped" = excluded."isSkipped",
            "timeSpent" = excluded."timeSpent",
            "answeredAt" = excluded."answeredAt"
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&input.session_id)
    .bind(&input.question_id)
    .bind(&input.selected_answer)
    .bind(input.is_correct)
    .bind(input.is_skipped)
    .bind(input.time_spent)
    .bind(&input.answered_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query(r#"UPDATE "quiz_sessions" SET "unscorableAt" = NULL WHERE "id" = ?"#)
        .bind(&input.session_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let row = sqlx::query(
        r#"SELECT * FROM "answer_records" WHERE "sessionId" = ? AND "questionId" = ? LIMIT 1"#,
    )
    .bind(&input.session_id)
    .bind(&input.question_id)
    .fetch_one(db.pool())
    .await?;
    map_answer(&row)
}

/// Answers of one session in submission order.
pub async fn list_answers(db: &Database, session_id: &str) -> Result<Vec<AnswerRecord>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "answer_records"
        WHERE "sessionId" = ?
        ORDER BY "answeredAt" ASC, "rowid" ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(db.pool())
    .await?;
    rows.iter().map(map_answer).collect()
}

pub async fn count_answers(db: &Database, session_id: &str) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM "answer_records" WHERE "sessionId" = ?"#,
    )
    .bind(session_id)
    .fetch_one(db.pool())
    .await?;
    Ok(count)
}

fn map_answer(row: &sqlx::sqlite::SqliteRow) -> Result<AnswerRecord, DbError> {
    Ok(AnswerRecord {
        id: row.try_get("id")?,
        session_id: row.try_get("sessionId")?,
        question_id: row.try_get("questionId")?,
        selected_answer: row.try_get("selectedAnswer")?,
        is_correct: row.try_get("isCorrect")?,
        is_skipped: row.try_get("isSkipped")?,
        time_spent: row.try_get("timeSpent")?,
        answered_at: row.try_get("answeredAt")?,
    })
}
