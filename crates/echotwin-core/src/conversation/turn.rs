//! Per-turn state machine.

use std::fmt;

/// Stages of a single conversational turn.
///
/// `Idle -> ContextRetrieved -> PromptBuilt -> GeneratorCalled -> Persisted -> Idle`.
/// A generator failure returns straight to `Idle` without persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    ContextRetrieved,
    PromptBuilt,
    GeneratorCalled,
    Persisted,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnState::Idle => write!(f, "idle"),
            TurnState::ContextRetrieved => write!(f, "context_retrieved"),
            TurnState::PromptBuilt => write!(f, "prompt_built"),
            TurnState::GeneratorCalled => write!(f, "generator_called"),
            TurnState::Persisted => write!(f, "persisted"),
        }
    }
}

impl TurnState {
    fn can_advance_to(self, next: TurnState) -> bool {
        use TurnState::*;
        matches!(
            (self, next),
            (Idle, ContextRetrieved)
                | (ContextRetrieved, PromptBuilt)
                | (PromptBuilt, GeneratorCalled)
                | (GeneratorCalled, Persisted)
                | (GeneratorCalled, Idle)
                | (Persisted, Idle)
        )
    }
}

/// Tracks one turn's progress and logs every transition.
#[derive(Debug)]
pub(crate) struct Turn {
    state: TurnState,
}

impl Turn {
    pub(crate) fn start() -> Self {
        Self {
            state: TurnState::Idle,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> TurnState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: TurnState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid turn transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "turn transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut turn = Turn::start();
        for next in [
            TurnState::ContextRetrieved,
            TurnState::PromptBuilt,
            TurnState::GeneratorCalled,
            TurnState::Persisted,
            TurnState::Idle,
        ] {
            turn.advance(next);
        }
        assert_eq!(turn.state(), TurnState::Idle);
    }

    #[test]
    fn test_failure_returns_to_idle() {
        assert!(TurnState::GeneratorCalled.can_advance_to(TurnState::Idle));
        assert!(!TurnState::Idle.can_advance_to(TurnState::Persisted));
        assert!(!TurnState::PromptBuilt.can_advance_to(TurnState::Persisted));
    }
}
