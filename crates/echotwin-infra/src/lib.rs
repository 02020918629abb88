//! Infrastructure layer for EchoTwin.
//!
//! Implements the ports defined in `echotwin-core`: SQLite repositories,
//! LanceDB vector indexes, the fastembed embedder, the OpenAI-compatible
//! generator, SHA-256 content ids, and filesystem/config loading.

pub mod backend;
pub mod config;
pub mod filesystem;
pub mod hash;
pub mod llm;
pub mod persona;
pub mod sqlite;
pub mod vector;
