//! ContentHasher trait for deriving content-addressed ids.
//!
//! Exchange ids and transcript message ids are hashes of their text, so
//! storing the same content twice lands on the same record in both stores.
//! The `Sha256ContentHasher` adapter lives in echotwin-infra.

/// Abstraction over content hashing.
pub trait ContentHasher: Send + Sync {
    /// Compute a hex-encoded hash of the given content.
    fn compute_hash(&self, content: &str) -> String;
}
