//! Statistics endpoint.
//!
//! GET /api/stats - Totals, 24-hour activity and the language histogram.

use axum::extract::State;
use axum::Json;

use echotwin_types::exchange::ConversationStats;

use crate::state::AppState;

/// GET /api/stats
///
/// A store failure is logged and answered with zeroed counts.
pub async fn get_stats(State(state): State<AppState>) -> Json<ConversationStats> {
    match state.store.stats().await {
        Ok(stats) => Json(stats),
        Err(e) => {
            tracing::warn!(error = %e, "failed to compute stats");
            Json(ConversationStats::default())
        }
    }
}
