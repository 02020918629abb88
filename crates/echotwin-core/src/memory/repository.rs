//! Relational repository traits for exchanges and transcript messages.
//!
//! Implementations (SQLite) live in echotwin-infra.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use echotwin_types::error::RepositoryError;
use echotwin_types::exchange::{Exchange, ExchangeId};
use echotwin_types::transcript::TranscriptRecord;

/// Repository trait for exchange persistence.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ExchangeRepository: Send + Sync {
    /// Insert the exchange, or overwrite the row with the same id.
    fn upsert_exchange(
        &self,
        exchange: &Exchange,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get_exchange(
        &self,
        id: &ExchangeId,
    ) -> impl std::future::Future<Output = Result<Option<Exchange>, RepositoryError>> + Send;

    /// Most recent exchanges first.
    fn list_recent(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Exchange>, RepositoryError>> + Send;

    /// Every exchange, oldest first.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Exchange>, RepositoryError>> + Send;

    fn count_exchanges(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Exchanges written at or after `since`.
    fn count_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Exchange count per language-mix label.
    fn language_histogram(
        &self,
    ) -> impl std::future::Future<Output = Result<BTreeMap<String, u64>, RepositoryError>> + Send;
}

/// Repository trait for ingested transcript messages.
pub trait TranscriptRepository: Send + Sync {
    /// Whether any message from `file_name` has been stored.
    fn is_file_ingested(
        &self,
        file_name: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Store records atomically. Returns the number written.
    fn save_messages(
        &self,
        records: &[TranscriptRecord],
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Every stored message, in ingest order.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<TranscriptRecord>, RepositoryError>> + Send;

    /// Text of every message sent by the persona, in ingest order.
    fn subject_texts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    fn count_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
