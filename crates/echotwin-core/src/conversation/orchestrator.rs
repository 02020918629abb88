//! Conversation orchestrator: one request in, one persona reply out.
//!
//! A turn retrieves grounding memory, renders the prompts, calls the
//! generator under a timeout and, on success, persists the exchange before
//! returning. The orchestrator never fails a turn: generator errors become a
//! fallback reply and storage errors become a warning on the outcome.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use echotwin_types::exchange::ExchangeId;
use echotwin_types::llm::{CompletionRequest, LlmError};

use crate::conversation::turn::{Turn, TurnState};
use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::retriever::{MemoryRetriever, format_context};
use crate::memory::store::{DualStore, StoreBackend};
use crate::persona::PersonaPrompt;

/// Prefix of the reply sent when the generator fails.
pub const FALLBACK_PREFIX: &str = "Sorry, technical issue ayindhi.";

/// Generation and retrieval knobs for a turn.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub retrieval_limit: usize,
    pub days_back: Option<u32>,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.8,
            max_tokens: 150,
            timeout: Duration::from_secs(30),
            retrieval_limit: 3,
            days_back: Some(7),
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    /// Reply text: the generated response, or the fallback.
    pub response: String,
    /// Whether the generator produced the reply.
    pub generated: bool,
    /// Id of the persisted exchange, when persistence succeeded.
    pub exchange_id: Option<ExchangeId>,
    /// Set when the reply was generated but could not be fully persisted.
    pub storage_warning: Option<String>,
    /// Number of past exchanges used as grounding.
    pub memories_used: usize,
}

pub struct ConversationOrchestrator<B: StoreBackend> {
    store: Arc<DualStore<B>>,
    retriever: MemoryRetriever<B::ExchangeIndex>,
    persona: Arc<PersonaPrompt>,
    provider: BoxLlmProvider,
    settings: TurnSettings,
}

impl<B: StoreBackend> ConversationOrchestrator<B> {
    pub fn new(
        store: Arc<DualStore<B>>,
        persona: Arc<PersonaPrompt>,
        provider: BoxLlmProvider,
        settings: TurnSettings,
    ) -> Self {
        let retriever = MemoryRetriever::new(store.exchange_index(), store.embedder());
        Self {
            store,
            retriever,
            persona,
            provider,
            settings,
        }
    }

    pub fn persona(&self) -> &PersonaPrompt {
        &self.persona
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Produce the persona's reply to `user_input`.
    #[tracing::instrument(name = "respond", skip_all, fields(provider = %self.provider.name()))]
    pub async fn respond(&self, user_input: &str, context: &str) -> TurnOutcome {
        let mut turn = Turn::start();

        let memories = self
            .retriever
            .retrieve_context(
                user_input,
                self.settings.retrieval_limit,
                self.settings.days_back,
            )
            .await;
        turn.advance(TurnState::ContextRetrieved);

        let memory_context = format_context(&memories);
        let request = CompletionRequest::single_turn(
            self.settings.model.clone(),
            self.persona.system_prompt(),
            self.persona.user_prompt(&memory_context, context, user_input),
            self.settings.temperature,
            self.settings.max_tokens,
        );
        turn.advance(TurnState::PromptBuilt);

        let generated = self.generate(&request).await;
        turn.advance(TurnState::GeneratorCalled);

        let response = match generated {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "generator failed; sending fallback");
                turn.advance(TurnState::Idle);
                return TurnOutcome {
                    response: format!("{FALLBACK_PREFIX} {e}"),
                    generated: false,
                    exchange_id: None,
                    storage_warning: None,
                    memories_used: memories.len(),
                };
            }
        };

        let (exchange_id, storage_warning) =
            match self.store.store_exchange(user_input, &response, context).await {
                Ok(exchange) => (Some(exchange.id), None),
                Err(e) => {
                    tracing::warn!(error = %e, "reply generated but not fully persisted");
                    (None, Some(e.to_string()))
                }
            };
        turn.advance(TurnState::Persisted);
        turn.advance(TurnState::Idle);

        TurnOutcome {
            response,
            generated: true,
            exchange_id,
            storage_warning,
            memories_used: memories.len(),
        }
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let timeout = self.settings.timeout;
        let response = tokio::time::timeout(timeout, self.provider.complete(request))
            .await
            .map_err(|_| LlmError::Timeout(timeout.as_secs()))??;

        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::Deserialization(
                "generator returned an empty reply".to_string(),
            ));
        }
        Ok(text)
    }
}
