//! Exchange memory: the dual store, its ports, and semantic retrieval.
//!
//! Ports (`ExchangeRepository`, `ExchangeVectorStore`, `Embedder`, ...) are
//! implemented in echotwin-infra. `DualStore` coordinates the relational and
//! vector writes; `MemoryRetriever` turns a query into grounding context.

pub mod box_embedder;
pub mod embedder;
pub mod repository;
pub mod retriever;
pub mod store;
pub mod vector;
