//! Exported chat transcripts: parsing, sources, and ingestion.

pub mod ingest;
pub mod parser;
pub mod source;

pub use ingest::{IngestReport, TranscriptIngestor};
pub use parser::TranscriptParser;
pub use source::TranscriptSource;
