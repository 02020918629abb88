//! Connection settings for OpenAI-compatible chat completion endpoints.

/// Default public OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an OpenAI-compatible generator.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Name reported in logs and `/health` (e.g. "openai").
    pub provider_name: String,
    pub base_url: String,
    pub api_key: String,
    /// Model used when a request leaves `model` empty.
    pub model: String,
}

/// OpenAI defaults: public endpoint, caller-supplied key and model.
pub fn openai_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key: api_key.into(),
        model: model.into(),
    }
}
