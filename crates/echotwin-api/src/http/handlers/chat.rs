//! Chat endpoint.
//!
//! POST /api/chat - One conversational turn with the persona.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Extra situational context forwarded to the prompt.
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    /// Local wall-clock time, `HH:MM:SS`.
    pub timestamp: String,
    pub user_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_warning: Option<String>,
}

/// POST /api/chat
///
/// Without a configured generator the reply is a canned demo response and
/// nothing is stored.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Empty message".to_string()));
    }
    let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();

    let Some(orchestrator) = state.orchestrator.as_ref() else {
        return Ok(Json(ChatResponse {
            response: state.demo.respond(message).to_string(),
            timestamp,
            user_message: message.to_string(),
            demo_mode: Some(true),
            storage_warning: None,
        }));
    };

    let context = body.context.as_deref().unwrap_or("");
    let outcome = orchestrator.respond(message, context).await;

    Ok(Json(ChatResponse {
        response: outcome.response,
        timestamp,
        user_message: message.to_string(),
        demo_mode: None,
        storage_warning: outcome.storage_warning,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::state::testing::demo_state;

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = demo_state(dir.path()).await;
        let request = ChatRequest {
            message: "   ".to_string(),
            context: None,
        };
        let err = chat(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_demo_mode_reply_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let state = demo_state(dir.path()).await;
        let request = ChatRequest {
            message: " hello ".to_string(),
            context: None,
        };
        let Json(reply) = chat(State(state.clone()), Json(request)).await.unwrap();

        assert_eq!(reply.demo_mode, Some(true));
        assert_eq!(reply.user_message, "hello");
        assert!(!reply.response.is_empty());
        assert_eq!(reply.timestamp.len(), 8);
        assert_eq!(state.store.exchange_count().await.unwrap(), 0);
    }

    #[test]
    fn test_request_context_is_optional() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request.message, "hi");
        assert!(request.context.is_none());
    }
}
