//! Persona prompt construction.

pub mod prompt;

pub use prompt::{NEUTRAL_PROMPT, PersonaPrompt, PersonaPromptBuilder};
