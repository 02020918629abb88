//! Configuration types for EchoTwin.
//!
//! `TwinConfig` represents the top-level `config.toml` that controls the
//! generator, retrieval window, persona/transcript locations, and server.

use serde::{Deserialize, Serialize};

use crate::transcript::SenderAliases;

/// Top-level configuration.
///
/// Loaded from `~/.echotwin/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwinConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub persona: PersonaSourceConfig,

    #[serde(default)]
    pub transcripts: TranscriptSourceConfig,

    #[serde(default)]
    pub aliases: SenderAliases,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Generator (LLM) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on one generator call; exceeding it is a generator failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Override for OpenAI-compatible endpoints.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f64 {
    0.8
}

fn default_max_tokens() -> u32 {
    150
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }
}

/// Memory retrieval window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_retrieval_limit")]
    pub limit: usize,

    /// Only exchanges dated within this many days are retrieved. `0` disables the filter.
    #[serde(default = "default_days_back")]
    pub days_back: u32,
}

fn default_retrieval_limit() -> usize {
    3
}

fn default_days_back() -> u32 {
    7
}

impl RetrievalConfig {
    pub fn days_back_filter(&self) -> Option<u32> {
        (self.days_back > 0).then_some(self.days_back)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: default_retrieval_limit(),
            days_back: default_days_back(),
        }
    }
}

/// Where the persona document lives and how much observed style to show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaSourceConfig {
    #[serde(default = "default_persona_file")]
    pub file: String,

    /// Max markers per vocabulary rendered into the prompt.
    #[serde(default = "default_style_preview")]
    pub style_preview: usize,
}

fn default_persona_file() -> String {
    "personality.yaml".to_string()
}

fn default_style_preview() -> usize {
    10
}

impl Default for PersonaSourceConfig {
    fn default() -> Self {
        Self {
            file: default_persona_file(),
            style_preview: default_style_preview(),
        }
    }
}

/// Transcript directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSourceConfig {
    #[serde(default = "default_transcript_dir")]
    pub dir: String,
}

fn default_transcript_dir() -> String {
    "chat_data".to_string()
}

impl Default for TranscriptSourceConfig {
    fn default() -> Self {
        Self {
            dir: default_transcript_dir(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How many exchanges `GET /api/conversations` returns.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8347
}

fn default_recent_limit() -> u32 {
    20
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            recent_limit: default_recent_limit(),
        }
    }
}

/// Embedding model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_embedding_model() -> String {
    "paraphrase-multilingual-mpnet-base-v2".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
        }
    }
}
