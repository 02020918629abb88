//! `personality.yaml` loading.
//!
//! A missing or broken persona document is not fatal: the caller gets `None`
//! and the prompt builder falls back to the neutral assistant prompt.

use std::path::Path;

use echotwin_types::error::PersonaError;
use echotwin_types::persona::PersonaConfig;

/// Read and parse a persona document.
pub async fn read_persona(path: &Path) -> Result<PersonaConfig, PersonaError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PersonaError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    parse_persona(&content)
}

pub fn parse_persona(content: &str) -> Result<PersonaConfig, PersonaError> {
    serde_yaml_ng::from_str(content).map_err(|e| PersonaError::Parse(e.to_string()))
}

/// Load the persona, logging and swallowing any failure.
pub async fn load_persona(path: &Path) -> Option<PersonaConfig> {
    match read_persona(path).await {
        Ok(persona) => {
            tracing::info!(name = %persona.name, path = %path.display(), "persona loaded");
            Some(persona)
        }
        Err(err) => {
            tracing::warn!(error = %err, "persona unavailable, using neutral prompt");
            None
        }
    }
}
