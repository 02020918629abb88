//! Conversation history endpoint.
//!
//! GET /api/conversations - Most recent exchanges, newest first.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use echotwin_types::exchange::Exchange;

use crate::state::AppState;

#[derive(Debug, Serialize, PartialEq)]
pub struct ConversationView {
    pub user_input: String,
    pub ai_response: String,
    pub timestamp: String,
    pub mood: String,
    pub language: String,
}

impl From<Exchange> for ConversationView {
    fn from(exchange: Exchange) -> Self {
        Self {
            user_input: exchange.user_input,
            ai_response: exchange.ai_response,
            timestamp: exchange.timestamp.to_rfc3339(),
            mood: exchange.mood.to_string(),
            language: exchange.language_mix.to_string(),
        }
    }
}

/// GET /api/conversations
///
/// A store failure is logged and answered with an empty list.
pub async fn list_conversations(State(state): State<AppState>) -> Json<Vec<ConversationView>> {
    let limit = state.config.server.recent_limit;
    match state.store.recent(limit).await {
        Ok(exchanges) => Json(exchanges.into_iter().map(ConversationView::from).collect()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to list conversations");
            Json(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::demo_state;

    #[tokio::test]
    async fn test_lists_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let state = demo_state(dir.path()).await;
        let base = chrono::Utc::now();
        state
            .store
            .store_exchange_at("first", "one", "", base - chrono::Duration::minutes(5))
            .await
            .unwrap();
        state
            .store
            .store_exchange_at("this is great 😊", "two", "", base)
            .await
            .unwrap();

        let Json(list) = list_conversations(State(state)).await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].user_input, "this is great 😊");
        assert_eq!(list[0].mood, "happy");
        assert_eq!(list[1].ai_response, "one");
    }

    #[tokio::test]
    async fn test_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let state = demo_state(dir.path()).await;
        let Json(list) = list_conversations(State(state)).await;
        assert!(list.is_empty());
    }
}
