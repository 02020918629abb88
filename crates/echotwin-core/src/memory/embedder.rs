//! Embedder trait for text-to-vector conversion.
//!
//! Exchanges, transcript messages and retrieval queries all pass through the
//! same embedder so their vectors share one space. Implementations (e.g. the
//! fastembed model) live in echotwin-infra.

use echotwin_types::error::RepositoryError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in echotwin-infra.
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors.
    ///
    /// Returns one vector per input text, in input order.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, RepositoryError>> + Send;

    /// The model name used for embeddings.
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
