//! Generator implementations.
//!
//! Contains the concrete [`LlmProvider`](echotwin_core::llm::provider::LlmProvider)
//! used by EchoTwin and a factory ([`create_provider`]) that builds it from
//! the `[generator]` section of `config.toml`.

pub mod openai_compat;

use secrecy::{ExposeSecret, SecretString};

use echotwin_core::llm::box_provider::BoxLlmProvider;
use echotwin_types::config::GeneratorConfig;
use echotwin_types::llm::LlmError;

use self::openai_compat::config::OpenAiCompatConfig;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from generator settings and an API key.
///
/// A configured `base_url` points the client at an OpenAI-compatible gateway;
/// otherwise the public OpenAI endpoint is used.
///
/// # Errors
///
/// Returns `AuthenticationFailed` when the key is empty.
pub fn create_provider(
    config: &GeneratorConfig,
    api_key: &SecretString,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.expose_secret();
    if key.trim().is_empty() {
        return Err(LlmError::AuthenticationFailed);
    }

    let provider = match config.base_url.as_deref() {
        Some(base_url) => OpenAiCompatibleProvider::new(OpenAiCompatConfig {
            provider_name: config.provider_name.clone(),
            base_url: base_url.to_string(),
            api_key: key.to_string(),
            model: config.model.clone(),
        }),
        None => OpenAiCompatibleProvider::openai(key, &config.model),
    };

    tracing::debug!(
        provider = %config.provider_name,
        model = %config.model,
        "generator configured"
    );
    Ok(BoxLlmProvider::new(provider))
}
