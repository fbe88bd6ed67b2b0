pub mod operations;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid database url: {0}")]
    Config(String),
    #[error("stored row is malformed: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// SQLite-backed store for sessions, answers and burnout metrics.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database at `url` and applies the
    /// embedded migrations. In-memory URLs are pinned to a single connection
    /// so every query sees the same database.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let in_memory = url.contains(":memory:");

        if !in_memory {
            ensure_parent_dir(url);
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::Config(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(30));
        let options = if in_memory {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!(url = %url, "database ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn ensure_parent_dir(url: &str) {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!(dir = %parent.display(), error = %err, "failed to create database directory");
            }
        }
    }
}

pub fn now_iso() -> String {
    format_datetime(Utc::now())
}

pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts RFC 3339 as well as SQLite's `YYYY-MM-DD HH:MM:SS[.fff]` form.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_both_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 3, 9, 15, 0).unwrap();
        assert_eq!(parse_datetime("2024-06-03T09:15:00.000Z"), Some(expected));
        assert_eq!(parse_datetime("2024-06-03T16:15:00+07:00"), Some(expected));
        assert_eq!(parse_datetime("2024-06-03 09:15:00"), Some(expected));
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn formats_with_millis() {
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 9, 15, 0).unwrap();
        assert_eq!(format_datetime(at), "2024-06-03T09:15:00.000Z");
    }

    #[tokio::test]
    async fn in_memory_database_migrates() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        assert!(db.ping().await);
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '_sqlx%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["answer_records", "burnout_metrics", "quiz_sessions"]);
    }
}
