//! SQLite transcript repository implementation.

use chrono::NaiveDateTime;

use echotwin_core::memory::repository::TranscriptRepository;
use echotwin_types::error::RepositoryError;
use echotwin_types::transcript::{TranscriptMessage, TranscriptRecord};

use super::pool::DatabasePool;

/// Storage format of the parsed header time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// SQLite-backed implementation of `TranscriptRepository`.
pub struct SqliteTranscriptRepository {
    pool: DatabasePool,
}

impl SqliteTranscriptRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn format_timestamp(ts: &Option<NaiveDateTime>) -> Option<String> {
    ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
}

type TranscriptRow = (String, String, String, Option<String>, String, String, i64);

fn row_to_record(row: TranscriptRow) -> TranscriptRecord {
    let (id, file_name, raw_timestamp, timestamp, sender, text, is_subject) = row;
    TranscriptRecord {
        id,
        file_name,
        message: TranscriptMessage {
            timestamp: timestamp
                .and_then(|t| NaiveDateTime::parse_from_str(&t, TIMESTAMP_FORMAT).ok()),
            raw_timestamp,
            sender,
            text,
            is_subject: is_subject != 0,
        },
    }
}

impl TranscriptRepository for SqliteTranscriptRepository {
    async fn is_file_ingested(&self, file_name: &str) -> Result<bool, RepositoryError> {
        let (found,): (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM chat_history WHERE file_name = ?)")
                .bind(file_name)
                .fetch_one(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(found != 0)
    }

    async fn save_messages(&self, records: &[TranscriptRecord]) -> Result<u64, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        for record in records {
            let msg = &record.message;
            sqlx::query(
                r#"INSERT INTO chat_history (id, file_name, raw_timestamp, timestamp, sender, message, is_subject)
                   VALUES (?, ?, ?, ?, ?, ?, ?)
                   ON CONFLICT(id) DO UPDATE SET
                       timestamp = excluded.timestamp,
                       is_subject = excluded.is_subject"#,
            )
            .bind(&record.id)
            .bind(&record.file_name)
            .bind(&msg.raw_timestamp)
            .bind(format_timestamp(&msg.timestamp))
            .bind(&msg.sender)
            .bind(&msg.text)
            .bind(if msg.is_subject { 1i64 } else { 0i64 })
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(records.len() as u64)
    }

    async fn list_all(&self) -> Result<Vec<TranscriptRecord>, RepositoryError> {
        let rows: Vec<TranscriptRow> = sqlx::query_as(
            r#"SELECT id, file_name, raw_timestamp, timestamp, sender, message, is_subject
               FROM chat_history ORDER BY rowid"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn subject_texts(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT message FROM chat_history WHERE is_subject = 1 ORDER BY rowid")
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(|(text,)| text).collect())
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_history")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}
