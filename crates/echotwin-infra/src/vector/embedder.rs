//! FastEmbed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `echotwin-core` with fastembed's ONNX
//! runtime inference. The default model is multilingual so romanized and
//! native-script text land in the same space.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use echotwin_core::memory::embedder::Embedder;
use echotwin_types::error::RepositoryError;

/// A supported embedding model and its output dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub dimension: usize,
}

const SUPPORTED_MODELS: &[ModelSpec] = &[
    ModelSpec {
        name: "paraphrase-multilingual-mpnet-base-v2",
        dimension: 768,
    },
    ModelSpec {
        name: "paraphrase-multilingual-minilm-l12-v2",
        dimension: 384,
    },
    ModelSpec {
        name: "bge-small-en-v1.5",
        dimension: 384,
    },
];

/// Look up a configured model name (case-insensitive).
pub fn model_spec(name: &str) -> Option<ModelSpec> {
    let wanted = name.trim().to_lowercase();
    SUPPORTED_MODELS.iter().copied().find(|m| m.name == wanted)
}

fn fastembed_model(spec: ModelSpec) -> EmbeddingModel {
    match spec.name {
        "paraphrase-multilingual-minilm-l12-v2" => EmbeddingModel::ParaphraseMLMiniLML12V2,
        "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        _ => EmbeddingModel::ParaphraseMLMpnetBaseV2,
    }
}

/// Local embedder backed by fastembed.
///
/// Inference is CPU-bound and blocking, so every call runs on the blocking
/// thread pool. The model sits behind a mutex because fastembed needs
/// exclusive access while embedding.
pub struct FastEmbedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    spec: ModelSpec,
}

impl FastEmbedEmbedder {
    /// Load (downloading on first use) the named model.
    ///
    /// `cache_dir` holds the downloaded ONNX weights.
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self, RepositoryError> {
        let spec = model_spec(model_name).ok_or_else(|| {
            RepositoryError::Query(format!("unsupported embedding model: {model_name}"))
        })?;

        let options = InitOptions::new(fastembed_model(spec))
            .with_cache_dir(cache_dir)
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(options).map_err(|e| {
            RepositoryError::Query(format!("failed to load embedding model {}: {e}", spec.name))
        })?;

        tracing::info!(model = spec.name, dimension = spec.dimension, "embedding model loaded");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            spec,
        })
    }
}

impl Embedder for FastEmbedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| RepositoryError::Query("embedding model lock poisoned".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| RepositoryError::Query(format!("embedding failed: {e}")))
        })
        .await
        .map_err(|e| RepositoryError::Query(format!("embedding task failed: {e}")))?
    }

    fn model_name(&self) -> &str {
        self.spec.name
    }

    fn dimension(&self) -> usize {
        self.spec.dimension
    }
}
