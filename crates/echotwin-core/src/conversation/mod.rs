//! Conversational turns over memory, persona and the generator.

pub mod orchestrator;
pub mod turn;

pub use orchestrator::{ConversationOrchestrator, FALLBACK_PREFIX, TurnOutcome, TurnSettings};
pub use turn::TurnState;
