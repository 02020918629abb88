//! LlmProvider trait definition.
//!
//! The generator is treated as an opaque text-in/text-out service. Uses
//! RPITIT for `complete`; implementations live in echotwin-infra
//! (e.g., `OpenAiCompatibleProvider`).

use echotwin_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for generator backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
