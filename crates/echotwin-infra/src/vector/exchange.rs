//! LanceDB-backed exchange index.
//!
//! Implements `ExchangeVectorStore` from `echotwin-core` on the
//! `conversations` table. Writes are keyed upserts on `id`; searches use
//! cosine distance and push the date window into the query as a prefilter.

use std::collections::HashSet;
use std::sync::Arc;

use arrow_array::{RecordBatch, RecordBatchIterator, StringArray};
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use echotwin_core::memory::vector::ExchangeVectorStore;
use echotwin_types::error::RepositoryError;
use echotwin_types::exchange::{EmbeddingRecord, ExchangeId, RankedExchange};

use super::columns::{distance_column, scan_ids, string_column, vector_column};
use super::lance::LanceVectorStore;
use super::schema::{CONVERSATIONS_TABLE, conversation_schema};

pub struct LanceExchangeIndex {
    store: LanceVectorStore,
    dimension: i32,
}

impl LanceExchangeIndex {
    pub fn new(store: LanceVectorStore, dimension: usize) -> Self {
        Self {
            store,
            dimension: dimension as i32,
        }
    }

    async fn table(&self) -> Result<lancedb::Table, RepositoryError> {
        self.store
            .ensure_table(CONVERSATIONS_TABLE, Arc::new(conversation_schema(self.dimension)))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to ensure conversations table: {e}")))
    }

    fn build_record_batch(
        &self,
        record: &EmbeddingRecord,
        embedding: &[f32],
    ) -> Result<RecordBatch, RepositoryError> {
        let schema = Arc::new(conversation_schema(self.dimension));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![record.id.to_string()])),
                Arc::new(StringArray::from(vec![record.document.clone()])),
                Arc::new(StringArray::from(vec![record.timestamp.to_rfc3339()])),
                Arc::new(StringArray::from(vec![record.date.to_string()])),
                Arc::new(StringArray::from(vec![record.mood.to_string()])),
                Arc::new(StringArray::from(vec![record.language_mix.to_string()])),
                Arc::new(StringArray::from(vec![record.context.clone()])),
                Arc::new(vector_column(&[embedding], self.dimension)?),
            ],
        )
        .map_err(|e| RepositoryError::Query(format!("Failed to build record batch: {e}")))
    }

    /// Parse search results into ranked records, skipping malformed rows.
    fn record_batch_to_ranked(batch: &RecordBatch) -> Result<Vec<RankedExchange>, RepositoryError> {
        let ids = string_column(batch, "id")?;
        let documents = string_column(batch, "document")?;
        let timestamps = string_column(batch, "timestamp")?;
        let dates = string_column(batch, "date")?;
        let moods = string_column(batch, "mood")?;
        let languages = string_column(batch, "language_mix")?;
        let contexts = string_column(batch, "context")?;
        let distances = distance_column(batch)?;

        let mut ranked = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            let parsed = (
                DateTime::parse_from_rfc3339(timestamps.value(i)),
                dates.value(i).parse::<NaiveDate>(),
                moods.value(i).parse(),
                languages.value(i).parse(),
            );
            let (Ok(timestamp), Ok(date), Ok(mood), Ok(language_mix)) = parsed else {
                tracing::warn!(id = ids.value(i), "skipping malformed conversations row");
                continue;
            };

            ranked.push(RankedExchange {
                record: EmbeddingRecord {
                    id: ExchangeId(ids.value(i).to_string()),
                    document: documents.value(i).to_string(),
                    timestamp: timestamp.with_timezone(&Utc),
                    date,
                    mood,
                    language_mix,
                    context: contexts.value(i).to_string(),
                },
                distance: distances.value(i),
            });
        }
        Ok(ranked)
    }
}

impl ExchangeVectorStore for LanceExchangeIndex {
    async fn upsert(&self, record: &EmbeddingRecord, embedding: &[f32]) -> Result<(), RepositoryError> {
        let table = self.table().await?;
        let batch = self.build_record_batch(record, embedding)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        let mut merge = table.merge_insert(&["id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        merge
            .execute(Box::new(reader))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to upsert exchange: {e}")))?;

        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        since: Option<NaiveDate>,
    ) -> Result<Vec<RankedExchange>, RepositoryError> {
        let table = self.table().await?;

        let mut query = table
            .vector_search(query_embedding)
            .map_err(|e| RepositoryError::Query(format!("Vector search setup failed: {e}")))?
            .distance_type(lancedb::DistanceType::Cosine)
            .limit(limit);
        if let Some(cutoff) = since {
            query = query.only_if(format!("date >= '{cutoff}'"));
        }

        let batches: Vec<RecordBatch> = query
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Vector search failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to collect results: {e}")))?;

        let mut ranked = Vec::new();
        for batch in &batches {
            ranked.extend(Self::record_batch_to_ranked(batch)?);
        }
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn ids(&self) -> Result<HashSet<ExchangeId>, RepositoryError> {
        let table = self.table().await?;
        Ok(scan_ids(&table).await?.into_iter().map(ExchangeId).collect())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.store
            .drop_table(CONVERSATIONS_TABLE)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to drop conversations table: {e}")))?;
        self.table().await.map(|_| ())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let table = self.table().await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to count rows: {e}")))?;
        Ok(count as u64)
    }
}
