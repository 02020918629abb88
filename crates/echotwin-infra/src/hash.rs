//! SHA-256 content ids.
//!
//! Implements the `ContentHasher` trait from `echotwin-core` with the `sha2`
//! crate. Both stores key records by these digests, so the relational row and
//! the vector row for one exchange always share an id.

use sha2::{Digest, Sha256};

use echotwin_core::service::hash::ContentHasher;

/// Lowercase hex SHA-256 of the content.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256ContentHasher;

impl Sha256ContentHasher {
    pub fn new() -> Self {
        Self
    }
}

impl ContentHasher for Sha256ContentHasher {
    fn compute_hash(&self, content: &str) -> String {
        let digest = Sha256::digest(content.as_bytes());
        format!("{:x}", digest)
    }
}
