//! Transcript ingestion: parse every transcript file once and persist it.

use std::sync::Arc;

use serde::Serialize;

use echotwin_types::error::IngestError;

use crate::memory::store::{DualStore, StoreBackend};
use crate::transcript::parser::TranscriptParser;
use crate::transcript::source::TranscriptSource;

/// Per-run ingestion summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Files parsed and stored in this run.
    pub ingested: Vec<String>,
    /// Files already present in the store.
    pub skipped: Vec<String>,
    /// Files that could not be read or stored, with the reason.
    pub failed: Vec<(String, String)>,
    /// Messages stored in this run.
    pub messages: u64,
}

pub struct TranscriptIngestor<S: TranscriptSource, B: StoreBackend> {
    source: S,
    parser: TranscriptParser,
    store: Arc<DualStore<B>>,
}

impl<S: TranscriptSource, B: StoreBackend> TranscriptIngestor<S, B> {
    pub fn new(source: S, parser: TranscriptParser, store: Arc<DualStore<B>>) -> Self {
        Self {
            source,
            parser,
            store,
        }
    }

    /// Ingest every file not yet in the store.
    ///
    /// Only a failure to list the source aborts the run. A file that cannot
    /// be read or stored is recorded in the report and the run moves on.
    #[tracing::instrument(name = "ingest_transcripts", skip(self), fields(source = %self.source.location()))]
    pub async fn ingest_all(&self) -> Result<IngestReport, IngestError> {
        let files = self
            .source
            .list_files()
            .await
            .map_err(|e| IngestError::ListFailed {
                dir: self.source.location(),
                reason: e.to_string(),
            })?;

        let mut report = IngestReport::default();

        for file in files {
            match self.store.is_transcript_ingested(&file).await {
                Ok(true) => {
                    tracing::debug!(file = %file, "transcript already ingested, skipping");
                    report.skipped.push(file);
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    let err = IngestError::Storage(e.to_string());
                    tracing::warn!(file = %file, error = %err, "transcript lookup failed");
                    report.failed.push((file, err.to_string()));
                    continue;
                }
            }

            match self.ingest_file(&file).await {
                Ok(count) => {
                    tracing::info!(file = %file, messages = count, "transcript ingested");
                    report.messages += count;
                    report.ingested.push(file);
                }
                Err(e) => {
                    tracing::warn!(file = %file, error = %e, "transcript ingest failed");
                    report.failed.push((file, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    async fn ingest_file(&self, file: &str) -> Result<u64, IngestError> {
        let content = self
            .source
            .read(file)
            .await
            .map_err(|e| IngestError::ReadFailed {
                file: file.to_string(),
                reason: e.to_string(),
            })?;

        let messages = self.parser.parse(&content);
        self.store
            .store_transcript(file, &messages)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))
    }
}
