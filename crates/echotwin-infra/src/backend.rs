//! Local backend: SQLite for relational rows, LanceDB for vectors, fastembed
//! for embeddings, all rooted in one data directory.

use std::path::Path;
use std::sync::Arc;

use echotwin_core::memory::box_embedder::BoxEmbedder;
use echotwin_core::memory::store::{DualStore, StoreBackend};
use echotwin_types::error::RepositoryError;

use crate::hash::Sha256ContentHasher;
use crate::sqlite::exchange::SqliteExchangeRepository;
use crate::sqlite::pool::{database_url, DatabasePool};
use crate::sqlite::transcript::SqliteTranscriptRepository;
use crate::vector::embedder::FastEmbedEmbedder;
use crate::vector::exchange::LanceExchangeIndex;
use crate::vector::lance::LanceVectorStore;
use crate::vector::transcript::LanceTranscriptIndex;

/// Vector database directory inside the data directory.
pub const VECTOR_DIR: &str = "vector_db";

/// Downloaded embedding model weights.
pub const MODEL_CACHE_DIR: &str = "models";

/// Adapter bundle for a single-machine deployment.
pub struct LocalBackend;

impl StoreBackend for LocalBackend {
    type Exchanges = SqliteExchangeRepository;
    type ExchangeIndex = LanceExchangeIndex;
    type Transcripts = SqliteTranscriptRepository;
    type TranscriptIndex = LanceTranscriptIndex;
    type Hasher = Sha256ContentHasher;
}

pub type LocalStore = DualStore<LocalBackend>;

#[derive(Debug, thiserror::Error)]
pub enum OpenStoreError {
    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to open database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to open vector index: {0}")]
    Vector(#[from] lancedb::Error),

    #[error("failed to load embedding model: {0}")]
    Embedder(RepositoryError),
}

/// Load the configured embedding model, caching weights under `data_dir`.
pub async fn load_embedder(model: &str, data_dir: &Path) -> Result<BoxEmbedder, OpenStoreError> {
    let model = model.to_string();
    let cache_dir = data_dir.join(MODEL_CACHE_DIR);

    // Model loading reads (and may download) ONNX weights.
    tokio::task::spawn_blocking(move || FastEmbedEmbedder::new(&model, cache_dir))
        .await
        .map_err(|e| OpenStoreError::Embedder(RepositoryError::Query(e.to_string())))?
        .map(BoxEmbedder::new)
        .map_err(OpenStoreError::Embedder)
}

/// Open both stores under `data_dir`, running migrations as needed.
///
/// Vector tables are sized to the embedder's output dimension.
pub async fn open_local_store(
    data_dir: &Path,
    embedder: Arc<BoxEmbedder>,
) -> Result<LocalStore, OpenStoreError> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|source| OpenStoreError::DataDir {
            path: data_dir.display().to_string(),
            source,
        })?;

    let pool = DatabasePool::new(&database_url(data_dir)).await?;
    let lance = LanceVectorStore::new(data_dir.join(VECTOR_DIR)).await?;
    let dimension = embedder.dimension();

    tracing::debug!(
        data_dir = %data_dir.display(),
        model = embedder.model_name(),
        dimension,
        "opening local store"
    );

    Ok(DualStore::new(
        Arc::new(SqliteExchangeRepository::new(pool.clone())),
        Arc::new(LanceExchangeIndex::new(lance.clone(), dimension)),
        Arc::new(SqliteTranscriptRepository::new(pool)),
        Arc::new(LanceTranscriptIndex::new(lance, dimension)),
        Sha256ContentHasher::new(),
        embedder,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use echotwin_core::memory::embedder::Embedder;
    use echotwin_core::memory::retriever::MemoryRetriever;
    use echotwin_types::transcript::TranscriptMessage;

    /// Letter-frequency vectors: deterministic and cheap.
    struct LetterEmbedder;

    impl Embedder for LetterEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; 8];
                    for c in t.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                        v[(c as usize - 'a' as usize) % 8] += 1.0;
                    }
                    v[7] += 0.01;
                    v
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "letters"
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    async fn open(dir: &Path) -> LocalStore {
        open_local_store(dir, Arc::new(BoxEmbedder::new(LetterEmbedder)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_exchange_lands_in_both_stores() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path()).await;

        let exchange = store
            .store_exchange("ela unnav", "bagane, nuvvu?", "")
            .await
            .unwrap();

        assert_eq!(store.exchange_count().await.unwrap(), 1);
        let report = store.reconcile().await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.repaired, 0);

        let recent = store.recent(5).await.unwrap();
        assert_eq!(recent[0].id, exchange.id);
    }

    #[tokio::test]
    async fn test_retrieval_over_local_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path()).await;
        store
            .store_exchange("movie chuddama", "sure, which one?", "")
            .await
            .unwrap();

        let retriever = MemoryRetriever::new(store.exchange_index(), store.embedder());
        let found = retriever.retrieve_context("movie chuddama", 3, Some(7)).await;
        assert_eq!(found.len(), 1);
        assert!(found[0].record.document.contains("movie chuddama"));
    }

    #[tokio::test]
    async fn test_transcript_ingest_status_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open(dir.path()).await;
            let messages = vec![TranscriptMessage {
                timestamp: None,
                raw_timestamp: "01/02/23, 9:05:00 PM".to_string(),
                sender: "Yaswanth".to_string(),
                text: "Hlo madam".to_string(),
                is_subject: true,
            }];
            assert_eq!(store.store_transcript("chat.txt", &messages).await.unwrap(), 1);
        }

        let store = open(dir.path()).await;
        assert!(store.is_transcript_ingested("chat.txt").await.unwrap());
        assert_eq!(store.subject_texts().await.unwrap(), vec!["Hlo madam".to_string()]);

        let rebuilt = store.rebuild_vector_index().await.unwrap();
        assert_eq!(rebuilt.scanned, 1);
        assert_eq!(rebuilt.repaired, 1);
    }
}
