//! SQLite exchange repository implementation.
//!
//! Implements `ExchangeRepository` from `echotwin-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, writes on the writer.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

use echotwin_core::memory::repository::ExchangeRepository;
use echotwin_types::error::RepositoryError;
use echotwin_types::exchange::{Exchange, ExchangeId, LanguageMix, Mood};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ExchangeRepository`.
pub struct SqliteExchangeRepository {
    pool: DatabasePool,
}

impl SqliteExchangeRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Exchange.
struct ExchangeRow {
    id: String,
    timestamp: String,
    user_input: String,
    ai_response: String,
    context: String,
    mood: String,
    language_mix: String,
}

impl ExchangeRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            timestamp: row.try_get("timestamp")?,
            user_input: row.try_get("user_input")?,
            ai_response: row.try_get("ai_response")?,
            context: row.try_get("context")?,
            mood: row.try_get("mood")?,
            language_mix: row.try_get("language_mix")?,
        })
    }

    fn into_exchange(self) -> Result<Exchange, RepositoryError> {
        let mood: Mood = self.mood.parse().map_err(RepositoryError::Query)?;
        let language_mix: LanguageMix = self
            .language_mix
            .parse()
            .map_err(RepositoryError::Query)?;

        Ok(Exchange {
            id: ExchangeId(self.id),
            user_input: self.user_input,
            ai_response: self.ai_response,
            context: self.context,
            mood,
            language_mix,
            timestamp: parse_datetime(&self.timestamp)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC form, so string comparison in SQL orders correctly.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Exchange>, RepositoryError> {
    rows.iter()
        .map(|row| {
            ExchangeRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_exchange()
        })
        .collect()
}

const SELECT_COLUMNS: &str =
    "SELECT id, timestamp, user_input, ai_response, context, mood, language_mix FROM conversations";

impl ExchangeRepository for SqliteExchangeRepository {
    async fn upsert_exchange(&self, exchange: &Exchange) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversations (id, timestamp, date, user_input, ai_response, context, mood, language_mix)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   timestamp = excluded.timestamp,
                   date = excluded.date,
                   context = excluded.context,
                   mood = excluded.mood,
                   language_mix = excluded.language_mix"#,
        )
        .bind(exchange.id.as_str())
        .bind(format_datetime(&exchange.timestamp))
        .bind(exchange.timestamp.date_naive().to_string())
        .bind(&exchange.user_input)
        .bind(&exchange.ai_response)
        .bind(&exchange.context)
        .bind(exchange.mood.to_string())
        .bind(exchange.language_mix.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_exchange(&self, id: &ExchangeId) -> Result<Option<Exchange>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(ref r) => {
                let exchange = ExchangeRow::from_row(r)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_exchange()?;
                Ok(Some(exchange))
            }
            None => Ok(None),
        }
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Exchange>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY timestamp DESC, rowid DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(&rows)
    }

    async fn list_all(&self) -> Result<Vec<Exchange>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY timestamp ASC, rowid ASC"))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(&rows)
    }

    async fn count_exchanges(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM conversations WHERE timestamp >= ?")
                .bind(format_datetime(&since))
                .fetch_one(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }

    async fn language_histogram(&self) -> Result<BTreeMap<String, u64>, RepositoryError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT language_mix, COUNT(*) FROM conversations GROUP BY language_mix",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(label, count)| (label, count as u64))
            .collect())
    }
}
