//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Core services are generic over their ports; AppState pins them to the
//! local infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use echotwin_core::conversation::{ConversationOrchestrator, TurnSettings};
use echotwin_core::persona::{PersonaPrompt, PersonaPromptBuilder};
use echotwin_core::style::StyleExtractor;
use echotwin_core::transcript::{TranscriptIngestor, TranscriptParser};
use echotwin_infra::backend::{load_embedder, open_local_store, LocalBackend, LocalStore};
use echotwin_infra::config::{apply_port_override, load_twin_config};
use echotwin_infra::filesystem::{resolve_data_dir, resolve_relative, DirectoryTranscriptSource};
use echotwin_infra::llm::create_provider;
use echotwin_infra::persona::load_persona;
use echotwin_types::config::TwinConfig;

use crate::http::demo::DemoResponder;

pub type LocalOrchestrator = ConversationOrchestrator<LocalBackend>;

/// Environment variable holding the generator API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers. Without a generator the
/// orchestrator is absent and `/api/chat` answers in demo mode.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TwinConfig>,
    pub data_dir: PathBuf,
    pub store: Arc<LocalStore>,
    pub persona: Arc<PersonaPrompt>,
    pub orchestrator: Option<Arc<LocalOrchestrator>>,
    pub demo: Arc<DemoResponder>,
}

impl AppState {
    /// Initialize the application state: resolve paths, open stores, wire services.
    ///
    /// With `ingest_first`, new transcripts in the configured directory are
    /// stored before the style markers are extracted.
    pub async fn init(api_key: Option<SecretString>, ingest_first: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;

        let mut config = load_twin_config(&data_dir).await;
        apply_port_override(&mut config, std::env::var("PORT").ok().as_deref());

        let embedder = load_embedder(&config.embedding.model, &data_dir)
            .await
            .context("failed to load the embedding model")?;

        let store = open_local_store(&data_dir, Arc::new(embedder))
            .await
            .with_context(|| format!("failed to open the memory store in {}", data_dir.display()))?;
        let store = Arc::new(store);

        if ingest_first {
            ingest_configured_transcripts(&config, &data_dir, &store).await;
        }

        Ok(Self::assemble(config, data_dir, store, api_key.as_ref()).await)
    }

    /// Wire the persona and generator on top of an opened store.
    pub(crate) async fn assemble(
        config: TwinConfig,
        data_dir: PathBuf,
        store: Arc<LocalStore>,
        api_key: Option<&SecretString>,
    ) -> Self {
        let persona = load_persona(&resolve_relative(&data_dir, &config.persona.file)).await;

        let subject_texts = store.subject_texts().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read transcript history for style markers");
            Vec::new()
        });
        let markers = StyleExtractor::default().extract(subject_texts.as_slice());
        tracing::debug!(
            regional = markers.regional_phrases.len(),
            informal = markers.informal_expressions.len(),
            "style markers extracted"
        );

        let prompt = Arc::new(PersonaPrompt::new(
            persona,
            markers,
            PersonaPromptBuilder::new(config.persona.style_preview),
        ));

        let orchestrator = match api_key {
            Some(key) => match create_provider(&config.generator, key) {
                Ok(provider) => Some(Arc::new(ConversationOrchestrator::new(
                    store.clone(),
                    prompt.clone(),
                    provider,
                    turn_settings(&config),
                ))),
                Err(e) => {
                    tracing::warn!(error = %e, "generator unavailable, running in demo mode");
                    None
                }
            },
            None => None,
        };

        Self {
            config: Arc::new(config),
            data_dir,
            store,
            persona: prompt,
            orchestrator,
            demo: Arc::new(DemoResponder::new()),
        }
    }

    /// Transcript directory: `--dir` if given, else the configured one.
    pub fn transcript_source(&self, dir: Option<PathBuf>) -> DirectoryTranscriptSource {
        let dir = dir.unwrap_or_else(|| resolve_relative(&self.data_dir, &self.config.transcripts.dir));
        DirectoryTranscriptSource::new(dir)
    }

    pub fn transcript_parser(&self) -> TranscriptParser {
        TranscriptParser::new(self.config.aliases.clone())
    }
}

/// Store any new transcripts from the configured directory. Never fails:
/// problems are logged and the caller continues with what is stored.
pub(crate) async fn ingest_configured_transcripts(
    config: &TwinConfig,
    data_dir: &Path,
    store: &Arc<LocalStore>,
) {
    let dir = resolve_relative(data_dir, &config.transcripts.dir);
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no transcript directory, skipping ingest");
        return;
    }

    let ingestor = TranscriptIngestor::new(
        DirectoryTranscriptSource::new(dir),
        TranscriptParser::new(config.aliases.clone()),
        store.clone(),
    );
    match ingestor.ingest_all().await {
        Ok(report) => {
            for (file, reason) in &report.failed {
                tracing::warn!(file = %file, reason = %reason, "transcript not ingested");
            }
            tracing::info!(
                ingested = report.ingested.len(),
                skipped = report.skipped.len(),
                messages = report.messages,
                "startup transcript ingest finished"
            );
        }
        Err(e) => tracing::warn!(error = %e, "startup transcript ingest failed"),
    }
}

/// Read the generator key from the environment. Blank values count as unset.
pub fn api_key_from_env() -> Option<SecretString> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

pub fn turn_settings(config: &TwinConfig) -> TurnSettings {
    TurnSettings {
        model: config.generator.model.clone(),
        temperature: config.generator.temperature,
        max_tokens: config.generator.max_tokens,
        timeout: std::time::Duration::from_secs(config.generator.timeout_secs),
        retrieval_limit: config.retrieval.limit,
        days_back: config.retrieval.days_back_filter(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A real local store over a temp dir with a cheap deterministic embedder.

    use super::*;
    use echotwin_core::memory::box_embedder::BoxEmbedder;
    use echotwin_core::memory::embedder::Embedder;
    use echotwin_types::error::RepositoryError;

    pub struct HashEmbedder;

    impl Embedder for HashEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.01f32; 8];
                    for (i, b) in t.bytes().enumerate() {
                        v[(i + b as usize) % 8] += 1.0;
                    }
                    v
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "hash"
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    /// State with no generator (demo mode). The temp dir lives as long as the test.
    pub async fn demo_state(dir: &std::path::Path) -> AppState {
        let store = open_local_store(dir, Arc::new(BoxEmbedder::new(HashEmbedder)))
            .await
            .unwrap();
        AppState::assemble(TwinConfig::default(), dir.to_path_buf(), Arc::new(store), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_settings_from_config() {
        let mut config = TwinConfig::default();
        config.retrieval.days_back = 0;
        config.generator.timeout_secs = 5;
        let settings = turn_settings(&config);
        assert_eq!(settings.model, "gpt-4");
        assert_eq!(settings.max_tokens, 150);
        assert_eq!(settings.timeout, std::time::Duration::from_secs(5));
        assert_eq!(settings.days_back, None);
        assert_eq!(settings.retrieval_limit, 3);
    }

    #[tokio::test]
    async fn test_assemble_without_key_is_demo_mode() {
        let dir = tempfile::tempdir().unwrap();
        let state = testing::demo_state(dir.path()).await;
        assert!(state.orchestrator.is_none());
        assert!(state.persona.persona().is_none());
        assert_eq!(state.persona.speaker_name(), "Assistant");
    }

    #[tokio::test]
    async fn test_assemble_with_key_builds_orchestrator() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("personality.yaml"),
            "name: Yaswanth\ntarget_person: Indu\n",
        )
        .await
        .unwrap();
        let demo = testing::demo_state(dir.path()).await;

        let key = SecretString::from("sk-test");
        let state =
            AppState::assemble(TwinConfig::default(), dir.path().to_path_buf(), demo.store, Some(&key))
                .await;
        let orchestrator = state.orchestrator.expect("generator configured");
        assert_eq!(orchestrator.provider_name(), "openai");
        assert_eq!(state.persona.addressee_name(), "Indu");
    }

    #[tokio::test]
    async fn test_startup_ingest_feeds_style_markers() {
        let dir = tempfile::tempdir().unwrap();
        let chat_dir = dir.path().join("chat_data");
        tokio::fs::create_dir_all(&chat_dir).await.unwrap();
        tokio::fs::write(
            chat_dir.join("a.txt"),
            "[01/02/23, 9:05:00 PM] Mustang: hi\n[01/02/23, 9:06:00 PM] Prosessor: Hlo madam\n",
        )
        .await
        .unwrap();

        let before = testing::demo_state(dir.path()).await;
        assert!(before.persona.markers().is_empty());

        let config = TwinConfig::default();
        ingest_configured_transcripts(&config, dir.path(), &before.store).await;
        ingest_configured_transcripts(&config, dir.path(), &before.store).await;
        assert_eq!(before.store.stats().await.unwrap().total_chat_messages, 2);

        let state = AppState::assemble(config, dir.path().to_path_buf(), before.store, None).await;
        let markers = state.persona.markers();
        assert!(markers.regional_phrases.contains(&"madam".to_string()));
        assert!(markers.informal_expressions.contains(&"Hlo".to_string()));
    }

    #[tokio::test]
    async fn test_startup_ingest_without_directory_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let state = testing::demo_state(dir.path()).await;
        ingest_configured_transcripts(&TwinConfig::default(), dir.path(), &state.store).await;
        assert_eq!(state.store.stats().await.unwrap().total_chat_messages, 0);
    }

    #[test]
    fn test_transcript_source_defaults_under_data_dir() {
        let config = TwinConfig::default();
        let path = resolve_relative(std::path::Path::new("/data"), &config.transcripts.dir);
        assert_eq!(path, PathBuf::from("/data/chat_data"));
    }
}
