//! Vector database infrastructure for exchange and transcript embeddings.
//!
//! Provides LanceDB vector store management, the exchange and transcript
//! indexes built on it, and fastembed-based local embedding generation.

mod columns;
pub mod embedder;
pub mod exchange;
pub mod lance;
pub mod schema;
pub mod transcript;
