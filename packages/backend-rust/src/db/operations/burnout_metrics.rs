use serde::{Deserialize, Serialize};
use sqlx::Row;
use utbk_burnout::{BurnoutComponents, BurnoutLevel, BurnoutResult, Recommendation, SessionStats};

use crate::db::{now_iso, Database, DbError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBurnoutMetrics {
    pub session_id: String,
    pub user_id: String,
    pub burnout_level: BurnoutLevel,
    pub fatigue_index: f64,
    pub components: BurnoutComponents,
    pub recommendations: Recommendation,
    pub session_stats: SessionStats,
    pub calculated_at: String,
}

/// Writes the latest score for a session, replacing any earlier one.
pub async fn upsert_metrics(
    db: &Database,
    session_id: &str,
    user_id: &str,
    result: &BurnoutResult,
) -> Result<StoredBurnoutMetrics, DbError> {
    let calculated_at = now_iso();
    let components = to_json(&result.components)?;
    let recommendations = to_json(&result.recommendations)?;
    let session_stats = to_json(&result.session_stats)?;

    sqlx::query(
        r#"
        INSERT INTO "burnout_metrics"
            ("sessionId", "userId", "burnoutLevel", "fatigueIndex", "components", "recommendations", "sessionStats", "calculatedAt")
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT ("sessionId") DO UPDATE SET
            "userId" = excluded."userId",
            "burnoutLevel" = excluded."burnoutLevel",
            "fatigueIndex" = excluded."fatigueIndex",
            "components" = excluded."components",
            "recommendations" = excluded."recommendations",
            "sessionStats" = excluded."sessionStats",
            "calculatedAt" = excluded."calculatedAt"
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(result.burnout_level.as_str())
    .bind(result.fatigue_index)
    .bind(&components)
    .bind(&recommendations)
    .bind(&session_stats)
    .bind(&calculated_at)
    .execute(db.pool())
    .await?;

    Ok(StoredBurnoutMetrics {
        session_id: session_id.to_string(),
        user_id: user_id.to_string(),
        burnout_level: result.burnout_level,
        fatigue_index: result.fatigue_index,
        components: result.components.clone(),
        recommendations: result.recommendations.clone(),
        session_stats: result.session_stats.clone(),
        calculated_at,
    })
}

pub async fn get_metrics(
    db: &Database,
    session_id: &str,
) -> Result<Option<StoredBurnoutMetrics>, DbError> {
    let row = sqlx::query(r#"SELECT * FROM "burnout_metrics" WHERE "sessionId" = ? LIMIT 1"#)
        .bind(session_id)
        .fetch_optional(db.pool())
        .await?;
    row.map(|r| map_metrics(&r)).transpose()
}

fn map_metrics(row: &sqlx::sqlite::SqliteRow) -> Result<StoredBurnoutMetrics, DbError> {
    let session_id: String = row.try_get("sessionId")?;
    let level_raw: String = row.try_get("burnoutLevel")?;
    let burnout_level = BurnoutLevel::parse(&level_raw).ok_or_else(|| {
        DbError::Corrupt(format!("unknown burnout level {level_raw:?} for {session_id}"))
    })?;
    let components: String = row.try_get("components")?;
    let recommendations: String = row.try_get("recommendations")?;
    let session_stats: String = row.try_get("sessionStats")?;

    Ok(StoredBurnoutMetrics {
        user_id: row.try_get("userId")?,
        burnout_level,
        fatigue_index: row.try_get("fatigueIndex")?,
        components: from_json(&components, "components")?,
        recommendations: from_json(&recommendations, "recommendations")?,
        session_stats: from_json(&session_stats, "sessionStats")?,
        calculated_at: row.try_get("calculatedAt")?,
        session_id,
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|e| DbError::Corrupt(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> Result<T, DbError> {
    serde_json::from_str(raw).map_err(|e| DbError::Corrupt(format!("{column}: {e}")))
}
