//! Vector index traits.
//!
//! Two collections live in the index: `conversations`, holding the embedding
//! twin of every stored exchange, and `chat_history`, holding ingested
//! transcript messages. Only the former is searched by the retriever.
//! Implementations (LanceDB) live in echotwin-infra.

use std::collections::HashSet;

use chrono::NaiveDate;

use echotwin_types::error::RepositoryError;
use echotwin_types::exchange::{EmbeddingRecord, ExchangeId, RankedExchange};
use echotwin_types::transcript::TranscriptRecord;

/// Vector-indexed exchange storage with similarity search.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ExchangeVectorStore: Send + Sync {
    /// Insert or overwrite the record stored under `record.id`.
    fn upsert(
        &self,
        record: &EmbeddingRecord,
        embedding: &[f32],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Nearest neighbours of `query_embedding`, ascending by distance.
    ///
    /// When `since` is set, only records dated on or after it are
    /// considered. The predicate is applied inside the index query, so up to
    /// `limit` matching records come back even when older near-duplicates
    /// crowd the top of the unfiltered ranking.
    fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        since: Option<NaiveDate>,
    ) -> impl std::future::Future<Output = Result<Vec<RankedExchange>, RepositoryError>> + Send;

    /// Ids currently present in the index.
    fn ids(
        &self,
    ) -> impl std::future::Future<Output = Result<HashSet<ExchangeId>, RepositoryError>> + Send;

    /// Remove every record.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Vector-indexed transcript messages.
pub trait TranscriptVectorStore: Send + Sync {
    /// Upsert records with their embeddings, matched pairwise by position.
    fn upsert_batch(
        &self,
        records: &[TranscriptRecord],
        embeddings: &[Vec<f32>],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Ids of the messages currently indexed.
    fn ids(
        &self,
    ) -> impl std::future::Future<Output = Result<HashSet<String>, RepositoryError>> + Send;

    fn clear(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
