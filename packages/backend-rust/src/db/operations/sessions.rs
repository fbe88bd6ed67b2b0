use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use crate::db::{now_iso, Database, DbError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }

    fn from_db(value: &str) -> Self {
        match value {
            "COMPLETED" => Self::Completed,
            _ => Self::Active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub id: String,
    pub user_id: String,
    pub subtest: Option<String>,
    pub status: SessionStatus,
    pub total_questions: Option<i64>,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub user_id: String,
    pub subtest: Option<String>,
    pub total_questions: Option<i64>,
}

pub async fn create_session(db: &Database, input: NewSession) -> Result<QuizSession, DbError> {
    let id = Uuid::new_v4().to_string();
    let now = now_iso();

    sqlx::query(
        r#"
        INSERT INTO "quiz_sessions"
            ("id", "userId", "subtest", "status", "totalQuestions", "startedAt", "createdAt", "updatedAt")
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&input.user_id)
    .bind(&input.subtest)
    .bind(SessionStatus::Active.as_str())
    .bind(input.total_questions)
    .bind(&now)
    .bind(&now)
    .bind(&now)
    .execute(db.pool())
    .await?;

    Ok(QuizSession {
        id,
        user_id: input.user_id,
        subtest: input.subtest,
        status: SessionStatus::Active,
        total_questions: input.total_questions,
        started_at: now.clone(),
        ended_at: None,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn get_session(db: &Database, session_id: &str) -> Result<Option<QuizSession>, DbError> {
    let row = sqlx::query(r#"SELECT * FROM "quiz_sessions" WHERE "id" = ? LIMIT 1"#)
        .bind(session_id)
        .fetch_optional(db.pool())
        .await?;
    row.map(|r| map_session(&r)).transpose()
}

pub async fn require_session(db: &Database, session_id: &str) -> Result<QuizSession, DbError> {
    get_session(db, session_id)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Session {session_id} not found")))
}

pub async fn list_sessions(
    db: &Database,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<QuizSession>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "quiz_sessions"
        WHERE "userId" = ?
        ORDER BY "startedAt" DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db.pool())
    .await?;
    rows.iter().map(map_session).collect()
}

pub async fn list_session_ids_for_user(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<Vec<String>, DbError> {
    let ids = sqlx::query_scalar::<_, String>(
        r#"
        SELECT "id" FROM "quiz_sessions"
        WHERE "userId" = ?
        ORDER BY "startedAt" DESC, "rowid" DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db.pool())
    .await?;
    Ok(ids)
}

/// Completed sessions with no stored burnout metrics, oldest first.
/// Sessions already found unscorable are left out until they get a new answer.
pub async fn list_completed_without_metrics(
    db: &Database,
    limit: i64,
) -> Result<Vec<String>, DbError> {
    let ids = sqlx::query_scalar::<_, String>(
        r#"
        SELECT s."id" FROM "quiz_sessions" s
        LEFT JOIN "burnout_metrics" m ON m."sessionId" = s."id"
        WHERE s."status" = 'COMPLETED'
          AND m."sessionId" IS NULL
          AND s."unscorableAt" IS NULL
        ORDER BY s."endedAt" ASC, s."rowid" ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db.pool())
    .await?;
    Ok(ids)
}

/// Marks the session completed. Ending an already completed session keeps
/// its original `endedAt`.
pub async fn end_session(db: &Database, session_id: &str) -> Result<QuizSession, DbError> {
    let now = now_iso();
    sqlx::query(
        r#"
        UPDATE "quiz_sessions"
        SET "status" = 'COMPLETED', "endedAt" = ?, "updatedAt" = ?
        WHERE "id" = ? AND "status" = 'ACTIVE'
        "#,
    )
    .bind(&now)
    .bind(&now)
    .bind(session_id)
    .execute(db.pool())
    .await?;

    require_session(db, session_id).await
}

pub async fn mark_unscorable(db: &Database, session_id: &str) -> Result<(), DbError> {
    sqlx::query(r#"UPDATE "quiz_sessions" SET "unscorableAt" = ? WHERE "id" = ?"#)
        .bind(now_iso())
        .bind(session_id)
        .execute(db.pool())
        .await?;
    Ok(())
}

fn map_session(row: &sqlx::sqlite::SqliteRow) -> Result<QuizSession, DbError> {
    let status: String = row.try_get("status")?;
    Ok(QuizSession {
        id: row.try_get("id")?,
        user_id: row.try_get("userId")?,
        subtest: row.try_get("subtest")?,
        status: SessionStatus::from_db(&status),
        total_questions: row.try_get("totalQuestions")?,
        started_at: row.try_get("startedAt")?,
        ended_at: row.try_get("endedAt")?,
        created_at: row.try_get("createdAt")?,
        updated_at: row.try_get("updatedAt")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    fn new_session(user_id: &str) -> NewSession {
        NewSession {
            user_id: user_id.to_string(),
            subtest: Some("PU".to_string()),
            total_questions: Some(20),
        }
    }

    #[tokio::test]
    async fn create_then_end_session() {
        let db = test_db().await;
        let created = create_session(&db, new_session("u1")).await.unwrap();
        assert_eq!(created.status, SessionStatus::Active);

        let ended = end_session(&db, &created.id).await.unwrap();
        assert_eq!(ended.status, SessionStatus::Completed);
        let first_end = ended.ended_at.clone();
        assert!(first_end.is_some());

        let again = end_session(&db, &created.id).await.unwrap();
        assert_eq!(again.ended_at, first_end);
    }

    #[tokio::test]
    async fn ending_missing_session_is_not_found() {
        let db = test_db().await;
        let err = end_session(&db, "nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_scoped_to_user() {
        let db = test_db().await;
        create_session(&db, new_session("u1")).await.unwrap();
        create_session(&db, new_session("u1")).await.unwrap();
        create_session(&db, new_session("u2")).await.unwrap();

        assert_eq!(list_sessions(&db, "u1", 50, 0).await.unwrap().len(), 2);
        assert_eq!(list_sessions(&db, "u1", 1, 0).await.unwrap().len(), 1);
        assert_eq!(list_session_ids_for_user(&db, "u2", 50).await.unwrap().len(), 1);
        assert_eq!(list_session_ids_for_user(&db, "u1", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_completed_sessions_are_pending_metrics() {
        let db = test_db().await;
        let active = create_session(&db, new_session("u1")).await.unwrap();
        let done = create_session(&db, new_session("u1")).await.unwrap();
        end_session(&db, &done.id).await.unwrap();

        let pending = list_completed_without_metrics(&db, 100).await.unwrap();
        assert_eq!(pending, vec![done.id]);
        assert!(!pending.contains(&active.id));
    }

    #[tokio::test]
    async fn unscorable_sessions_leave_the_pending_list() {
        let db = test_db().await;
        let short = create_session(&db, new_session("u1")).await.unwrap();
        end_session(&db, &short.id).await.unwrap();
        let later = create_session(&db, new_session("u1")).await.unwrap();
        end_session(&db, &later.id).await.unwrap();

        mark_unscorable(&db, &short.id).await.unwrap();

        let pending = list_completed_without_metrics(&db, 1).await.unwrap();
        assert_eq!(pending, vec![later.id]);
    }
}
