//! In-memory fakes for the core ports, shared by unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use echotwin_types::error::RepositoryError;
use echotwin_types::exchange::{EmbeddingRecord, Exchange, ExchangeId, RankedExchange};
use echotwin_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};
use echotwin_types::transcript::TranscriptRecord;

use crate::llm::provider::LlmProvider;
use crate::memory::box_embedder::BoxEmbedder;
use crate::memory::embedder::Embedder;
use crate::memory::repository::{ExchangeRepository, TranscriptRepository};
use crate::memory::store::{DualStore, StoreBackend};
use crate::memory::vector::{ExchangeVectorStore, TranscriptVectorStore};
use crate::service::hash::ContentHasher;

fn injected(what: &str) -> RepositoryError {
    RepositoryError::Query(format!("injected {what} failure"))
}

/// Embeds known texts to fixed vectors and everything else to a
/// length-derived vector.
#[derive(Default)]
pub struct FakeEmbedder {
    pub vectors: HashMap<String, Vec<f32>>,
    pub fail: AtomicBool,
}

impl FakeEmbedder {
    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected("embed"));
        }
        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| vec![t.chars().count() as f32, 0.0, 0.0])
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "fake"
    }

    fn dimension(&self) -> usize {
        3
    }
}

#[derive(Default)]
pub struct FakeExchangeIndex {
    pub rows: Mutex<BTreeMap<ExchangeId, (EmbeddingRecord, Vec<f32>)>>,
    pub fail_upsert: AtomicBool,
    pub fail_search: AtomicBool,
}

impl FakeExchangeIndex {
    pub fn insert(&self, record: EmbeddingRecord, vector: Vec<f32>) {
        self.rows
            .lock()
            .unwrap()
            .insert(record.id.clone(), (record, vector));
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

impl ExchangeVectorStore for FakeExchangeIndex {
    async fn upsert(&self, record: &EmbeddingRecord, embedding: &[f32]) -> Result<(), RepositoryError> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(injected("vector upsert"));
        }
        self.insert(record.clone(), embedding.to_vec());
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        since: Option<NaiveDate>,
    ) -> Result<Vec<RankedExchange>, RepositoryError> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(injected("vector search"));
        }
        let rows = self.rows.lock().unwrap();
        let mut ranked: Vec<RankedExchange> = rows
            .values()
            .filter(|(record, _)| since.is_none_or(|cutoff| record.date >= cutoff))
            .map(|(record, vector)| RankedExchange {
                record: record.clone(),
                distance: euclidean(query_embedding, vector),
            })
            .collect();
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn ids(&self) -> Result<HashSet<ExchangeId>, RepositoryError> {
        Ok(self.rows.lock().unwrap().keys().cloned().collect())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.len() as u64)
    }
}

#[derive(Default)]
pub struct FakeExchangeRepository {
    pub rows: Mutex<BTreeMap<ExchangeId, Exchange>>,
    pub fail: AtomicBool,
}

impl FakeExchangeRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl ExchangeRepository for FakeExchangeRepository {
    async fn upsert_exchange(&self, exchange: &Exchange) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected("relational"));
        }
        self.rows
            .lock()
            .unwrap()
            .insert(exchange.id.clone(), exchange.clone());
        Ok(())
    }

    async fn get_exchange(&self, id: &ExchangeId) -> Result<Option<Exchange>, RepositoryError> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Exchange>, RepositoryError> {
        let mut all = self.list_all().await?;
        all.reverse();
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn list_all(&self) -> Result<Vec<Exchange>, RepositoryError> {
        let mut all: Vec<Exchange> = self.rows.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|e| e.timestamp);
        Ok(all)
    }

    async fn count_exchanges(&self) -> Result<u64, RepositoryError> {
        Ok(self.len() as u64)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<u64, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.timestamp >= since)
            .count() as u64)
    }

    async fn language_histogram(&self) -> Result<BTreeMap<String, u64>, RepositoryError> {
        let mut histogram = BTreeMap::new();
        for exchange in self.rows.lock().unwrap().values() {
            *histogram.entry(exchange.language_mix.to_string()).or_insert(0) += 1;
        }
        Ok(histogram)
    }
}

#[derive(Default)]
pub struct FakeTranscriptRepository {
    pub rows: Mutex<Vec<TranscriptRecord>>,
}

impl TranscriptRepository for FakeTranscriptRepository {
    async fn is_file_ingested(&self, file_name: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.file_name == file_name))
    }

    async fn save_messages(&self, records: &[TranscriptRecord]) -> Result<u64, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        for record in records {
            rows.retain(|r| r.id != record.id);
            rows.push(record.clone());
        }
        Ok(records.len() as u64)
    }

    async fn list_all(&self) -> Result<Vec<TranscriptRecord>, RepositoryError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn subject_texts(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.message.is_subject)
            .map(|r| r.message.text.clone())
            .collect())
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct FakeTranscriptIndex {
    pub rows: Mutex<BTreeMap<String, TranscriptRecord>>,
    pub fail_upsert: AtomicBool,
}

impl FakeTranscriptIndex {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl TranscriptVectorStore for FakeTranscriptIndex {
    async fn upsert_batch(
        &self,
        records: &[TranscriptRecord],
        embeddings: &[Vec<f32>],
    ) -> Result<(), RepositoryError> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(injected("transcript upsert"));
        }
        if records.len() != embeddings.len() {
            return Err(RepositoryError::Query("length mismatch".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        for record in records {
            rows.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn ids(&self) -> Result<HashSet<String>, RepositoryError> {
        Ok(self.rows.lock().unwrap().keys().cloned().collect())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.len() as u64)
    }
}

/// Hashes by echoing the content, which keeps ids readable in assertions.
pub struct EchoHasher;

impl ContentHasher for EchoHasher {
    fn compute_hash(&self, content: &str) -> String {
        content.to_string()
    }
}

pub struct FakeBackend;

impl StoreBackend for FakeBackend {
    type Exchanges = FakeExchangeRepository;
    type ExchangeIndex = FakeExchangeIndex;
    type Transcripts = FakeTranscriptRepository;
    type TranscriptIndex = FakeTranscriptIndex;
    type Hasher = EchoHasher;
}

/// A dual store over fakes, with handles to every fake for inspection.
pub struct FakeStore {
    pub store: Arc<DualStore<FakeBackend>>,
    pub exchanges: Arc<FakeExchangeRepository>,
    pub exchange_index: Arc<FakeExchangeIndex>,
    pub transcripts: Arc<FakeTranscriptRepository>,
    pub transcript_index: Arc<FakeTranscriptIndex>,
    pub embedder: Arc<BoxEmbedder>,
}

pub fn fake_store() -> FakeStore {
    fake_store_with(FakeEmbedder::default())
}

pub fn fake_store_with(embedder: FakeEmbedder) -> FakeStore {
    let exchanges = Arc::new(FakeExchangeRepository::default());
    let exchange_index = Arc::new(FakeExchangeIndex::default());
    let transcripts = Arc::new(FakeTranscriptRepository::default());
    let transcript_index = Arc::new(FakeTranscriptIndex::default());
    let embedder = Arc::new(BoxEmbedder::new(embedder));
    let store = Arc::new(DualStore::new(
        exchanges.clone(),
        exchange_index.clone(),
        transcripts.clone(),
        transcript_index.clone(),
        EchoHasher,
        embedder.clone(),
    ));
    FakeStore {
        store,
        exchanges,
        exchange_index,
        transcripts,
        transcript_index,
        embedder,
    }
}

/// Scripted generator behaviour.
pub enum Reply {
    Text(String),
    Fail,
    Hang,
}

/// Clones share call counters, so a test can keep one after boxing another.
#[derive(Clone)]
pub struct FakeProvider {
    pub reply: Arc<Reply>,
    pub calls: Arc<AtomicUsize>,
    pub last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl FakeProvider {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply: Arc::new(reply),
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match self.reply.as_ref() {
            Reply::Text(text) => Ok(CompletionResponse {
                id: "resp-1".to_string(),
                content: text.clone(),
                model: request.model.clone(),
                usage: Usage::default(),
            }),
            Reply::Fail => Err(LlmError::Provider {
                message: "upstream 500".to_string(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::Provider {
                    message: "unreachable".to_string(),
                })
            }
        }
    }
}
