//! LanceDB-backed transcript message index (`chat_history` table).

use std::collections::HashSet;
use std::sync::Arc;

use arrow_array::{BooleanArray, RecordBatch, RecordBatchIterator, StringArray};

use echotwin_core::memory::vector::TranscriptVectorStore;
use echotwin_types::error::RepositoryError;
use echotwin_types::transcript::TranscriptRecord;

use super::columns::{scan_ids, vector_column};
use super::lance::LanceVectorStore;
use super::schema::{CHAT_HISTORY_TABLE, chat_history_schema};

pub struct LanceTranscriptIndex {
    store: LanceVectorStore,
    dimension: i32,
}

impl LanceTranscriptIndex {
    pub fn new(store: LanceVectorStore, dimension: usize) -> Self {
        Self {
            store,
            dimension: dimension as i32,
        }
    }

    async fn table(&self) -> Result<lancedb::Table, RepositoryError> {
        self.store
            .ensure_table(CHAT_HISTORY_TABLE, Arc::new(chat_history_schema(self.dimension)))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to ensure chat_history table: {e}")))
    }

    fn build_record_batch(
        &self,
        records: &[TranscriptRecord],
        embeddings: &[Vec<f32>],
    ) -> Result<RecordBatch, RepositoryError> {
        let vectors: Vec<&[f32]> = embeddings.iter().map(Vec::as_slice).collect();

        RecordBatch::try_new(
            Arc::new(chat_history_schema(self.dimension)),
            vec![
                Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.id.as_str()))),
                Arc::new(StringArray::from_iter_values(
                    records.iter().map(|r| r.file_name.as_str()),
                )),
                Arc::new(StringArray::from_iter_values(
                    records.iter().map(|r| r.message.sender.as_str()),
                )),
                Arc::new(BooleanArray::from(
                    records.iter().map(|r| r.message.is_subject).collect::<Vec<_>>(),
                )),
                Arc::new(StringArray::from_iter_values(
                    records.iter().map(|r| r.message.text.as_str()),
                )),
                Arc::new(vector_column(&vectors, self.dimension)?),
            ],
        )
        .map_err(|e| RepositoryError::Query(format!("Failed to build record batch: {e}")))
    }
}

impl TranscriptVectorStore for LanceTranscriptIndex {
    async fn upsert_batch(
        &self,
        records: &[TranscriptRecord],
        embeddings: &[Vec<f32>],
    ) -> Result<(), RepositoryError> {
        if records.len() != embeddings.len() {
            return Err(RepositoryError::Query(format!(
                "{} records but {} embeddings",
                records.len(),
                embeddings.len()
            )));
        }
        if records.is_empty() {
            return Ok(());
        }

        let table = self.table().await?;
        let batch = self.build_record_batch(records, embeddings)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        let mut merge = table.merge_insert(&["id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        merge
            .execute(Box::new(reader))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to upsert transcript rows: {e}")))?;

        Ok(())
    }

    async fn ids(&self) -> Result<HashSet<String>, RepositoryError> {
        let table = self.table().await?;
        Ok(scan_ids(&table).await?.into_iter().collect())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.store
            .drop_table(CHAT_HISTORY_TABLE)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to drop chat_history table: {e}")))?;
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
