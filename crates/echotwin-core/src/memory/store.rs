//! Dual store: relational records plus their vector-index twins.
//!
//! Every exchange is written twice, first as a relational row and then as
//! an embedded document in the vector index, joined by a content-derived id.
//! Transcript messages follow the same pattern. The two writes are not
//! atomic. A failure after the relational write leaves rows that the vector
//! index lacks; [`DualStore::reconcile`] finds and re-indexes such rows.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use echotwin_types::error::{RepositoryError, StoreError};
use echotwin_types::exchange::{ConversationStats, Exchange, ExchangeId};
use echotwin_types::transcript::{TranscriptMessage, TranscriptRecord};

use crate::classify;
use crate::memory::box_embedder::BoxEmbedder;
use crate::memory::repository::{ExchangeRepository, TranscriptRepository};
use crate::memory::vector::{ExchangeVectorStore, TranscriptVectorStore};
use crate::service::hash::ContentHasher;

/// Bundle of adapter types backing a [`DualStore`].
pub trait StoreBackend: Send + Sync + 'static {
    type Exchanges: ExchangeRepository + 'static;
    type ExchangeIndex: ExchangeVectorStore + 'static;
    type Transcripts: TranscriptRepository + 'static;
    type TranscriptIndex: TranscriptVectorStore + 'static;
    type Hasher: ContentHasher + 'static;
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReconcileReport {
    /// Relational rows examined, exchanges and transcript messages together.
    pub scanned: u64,
    /// Rows whose vector twin was missing and has been rebuilt.
    pub repaired: u64,
    /// Rows still missing a twin after this pass.
    pub failed: u64,
}

pub struct DualStore<B: StoreBackend> {
    exchanges: Arc<B::Exchanges>,
    exchange_index: Arc<B::ExchangeIndex>,
    transcripts: Arc<B::Transcripts>,
    transcript_index: Arc<B::TranscriptIndex>,
    hasher: B::Hasher,
    embedder: Arc<BoxEmbedder>,
}

impl<B: StoreBackend> DualStore<B> {
    pub fn new(
        exchanges: Arc<B::Exchanges>,
        exchange_index: Arc<B::ExchangeIndex>,
        transcripts: Arc<B::Transcripts>,
        transcript_index: Arc<B::TranscriptIndex>,
        hasher: B::Hasher,
        embedder: Arc<BoxEmbedder>,
    ) -> Self {
        Self {
            exchanges,
            exchange_index,
            transcripts,
            transcript_index,
            hasher,
            embedder,
        }
    }

    /// The searchable exchange index, shared with the retriever.
    pub fn exchange_index(&self) -> Arc<B::ExchangeIndex> {
        self.exchange_index.clone()
    }

    pub fn embedder(&self) -> Arc<BoxEmbedder> {
        self.embedder.clone()
    }

    /// Content-derived id of a request/response pair.
    pub fn exchange_id(&self, user_input: &str, ai_response: &str) -> ExchangeId {
        ExchangeId(
            self.hasher
                .compute_hash(&ExchangeId::source_text(user_input, ai_response)),
        )
    }

    /// Persist one exchange in both stores, stamped with the current time.
    pub async fn store_exchange(
        &self,
        user_input: &str,
        ai_response: &str,
        context: &str,
    ) -> Result<Exchange, StoreError> {
        self.store_exchange_at(user_input, ai_response, context, Utc::now())
            .await
    }

    /// Persist one exchange in both stores with an explicit timestamp.
    ///
    /// Mood is classified on `user_input`, language mix on both sides of the
    /// exchange. Storing the same pair again overwrites both records in place.
    #[tracing::instrument(name = "store_exchange", skip_all, fields(id))]
    pub async fn store_exchange_at(
        &self,
        user_input: &str,
        ai_response: &str,
        context: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Exchange, StoreError> {
        let id = self.exchange_id(user_input, ai_response);
        tracing::Span::current().record("id", tracing::field::display(&id));

        let exchange = Exchange {
            id,
            user_input: user_input.to_string(),
            ai_response: ai_response.to_string(),
            context: context.to_string(),
            mood: classify::mood(user_input),
            language_mix: classify::language_mix(&format!("{user_input} {ai_response}")),
            timestamp,
        };

        self.exchanges
            .upsert_exchange(&exchange)
            .await
            .map_err(StoreError::Structured)?;

        if let Err(e) = self.index_exchange(&exchange).await {
            tracing::warn!(error = %e, "exchange stored without vector twin");
            return Err(e);
        }

        tracing::debug!(mood = %exchange.mood, language = %exchange.language_mix, "exchange stored");
        Ok(exchange)
    }

    async fn index_exchange(&self, exchange: &Exchange) -> Result<(), StoreError> {
        let embedding = self
            .embedder
            .embed_one(&exchange.document())
            .await
            .map_err(StoreError::Embedding)?;

        self.exchange_index
            .upsert(&exchange.to_embedding_record(), &embedding)
            .await
            .map_err(|source| StoreError::Vector {
                id: exchange.id.to_string(),
                source,
            })
    }

    /// Re-index every relational row, exchange or transcript message, whose
    /// id is missing from the vector index.
    #[tracing::instrument(name = "reconcile", skip_all)]
    pub async fn reconcile(&self) -> Result<ReconcileReport, RepositoryError> {
        let mut report = self.reconcile_exchanges().await?;
        let transcripts = self.reconcile_transcripts().await?;
        report.scanned += transcripts.scanned;
        report.repaired += transcripts.repaired;
        report.failed += transcripts.failed;

        tracing::info!(
            scanned = report.scanned,
            repaired = report.repaired,
            failed = report.failed,
            "reconciliation complete"
        );
        Ok(report)
    }

    async fn reconcile_exchanges(&self) -> Result<ReconcileReport, RepositoryError> {
        let indexed = self.exchange_index.ids().await?;
        let all = self.exchanges.list_all().await?;

        let mut report = ReconcileReport {
            scanned: all.len() as u64,
            ..ReconcileReport::default()
        };

        for exchange in all.iter().filter(|e| !indexed.contains(&e.id)) {
            match self.index_exchange(exchange).await {
                Ok(()) => report.repaired += 1,
                Err(e) => {
                    tracing::warn!(id = %exchange.id, error = %e, "failed to re-index exchange");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    async fn reconcile_transcripts(&self) -> Result<ReconcileReport, RepositoryError> {
        let indexed = self.transcript_index.ids().await?;
        let all = self.transcripts.list_all().await?;
        let scanned = all.len() as u64;

        let missing: Vec<TranscriptRecord> =
            all.into_iter().filter(|r| !indexed.contains(&r.id)).collect();
        let count = missing.len() as u64;

        let mut report = ReconcileReport {
            scanned,
            ..ReconcileReport::default()
        };
        if missing.is_empty() {
            return Ok(report);
        }

        match self.index_transcripts("reconcile", &missing).await {
            Ok(()) => report.repaired = count,
            Err(e) => {
                tracing::warn!(count, error = %e, "failed to re-index transcript messages");
                report.failed = count;
            }
        }
        Ok(report)
    }

    /// Drop both vector collections and re-embed every relational row.
    pub async fn rebuild_vector_index(&self) -> Result<ReconcileReport, RepositoryError> {
        self.exchange_index.clear().await?;
        self.transcript_index.clear().await?;
        self.reconcile().await
    }

    /// Derive a transcript message's content id.
    pub fn transcript_id(&self, file_name: &str, message: &TranscriptMessage) -> String {
        self.hasher.compute_hash(&format!(
            "{}|{}|{}|{}",
            file_name, message.raw_timestamp, message.sender, message.text
        ))
    }

    pub async fn is_transcript_ingested(&self, file_name: &str) -> Result<bool, RepositoryError> {
        self.transcripts.is_file_ingested(file_name).await
    }

    /// Persist one transcript file's messages in both stores.
    ///
    /// The relational write is a single transaction. Returns the number of
    /// messages written.
    #[tracing::instrument(name = "store_transcript", skip(self, messages), fields(count = messages.len()))]
    pub async fn store_transcript(
        &self,
        file_name: &str,
        messages: &[TranscriptMessage],
    ) -> Result<u64, StoreError> {
        if messages.is_empty() {
            return Ok(0);
        }

        let records: Vec<TranscriptRecord> = messages
            .iter()
            .map(|message| TranscriptRecord {
                id: self.transcript_id(file_name, message),
                file_name: file_name.to_string(),
                message: message.clone(),
            })
            .collect();

        let written = self
            .transcripts
            .save_messages(&records)
            .await
            .map_err(StoreError::Structured)?;

        self.index_transcripts(file_name, &records).await?;

        Ok(written)
    }

    /// Embed and index `records`; `batch` names them in errors.
    async fn index_transcripts(
        &self,
        batch: &str,
        records: &[TranscriptRecord],
    ) -> Result<(), StoreError> {
        let texts: Vec<String> = records.iter().map(|r| r.message.text.clone()).collect();
        let embeddings = self
            .embedder
            .embed(&texts)
            .await
            .map_err(StoreError::Embedding)?;

        self.transcript_index
            .upsert_batch(records, &embeddings)
            .await
            .map_err(|source| StoreError::Vector {
                id: batch.to_string(),
                source,
            })
    }

    /// Texts the persona has sent, in ingest order.
    pub async fn subject_texts(&self) -> Result<Vec<String>, RepositoryError> {
        self.transcripts.subject_texts().await
    }

    /// Most recent exchanges first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<Exchange>, RepositoryError> {
        self.exchanges.list_recent(limit).await
    }

    pub async fn exchange_count(&self) -> Result<u64, RepositoryError> {
        self.exchanges.count_exchanges().await
    }

    pub async fn stats(&self) -> Result<ConversationStats, RepositoryError> {
        self.stats_at(Utc::now()).await
    }

    /// Aggregate counts, with "recent" meaning the 24 hours before `now`.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<ConversationStats, RepositoryError> {
        Ok(ConversationStats {
            total_conversations: self.exchanges.count_exchanges().await?,
            total_chat_messages: self.transcripts.count_messages().await?,
            recent_conversations: self.exchanges.count_since(now - Duration::days(1)).await?,
            language_stats: self.exchanges.language_histogram().await?,
        })
    }
}
