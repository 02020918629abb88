//! Axum router configuration with middleware.
//!
//! Routes live under `/api/` plus `/health`. Middleware: CORS, tracing.
//!
//! When the web UI directory exists (`ECHOTWIN_WEB_DIR`, default `static`),
//! its files are served for any other path, falling back to `index.html`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/conversations", get(handlers::conversations::list_conversations))
        .route("/stats", get(handlers::stats::get_stats));

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let web_dir = std::env::var("ECHOTWIN_WEB_DIR").unwrap_or_else(|_| "static".to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{}/index.html", web_dir);
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "static web UI enabled");
    }

    router
}

/// GET /health
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let axum::Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_router_builds() {
        let dir = tempfile::tempdir().unwrap();
        let state = crate::state::testing::demo_state(dir.path()).await;
        let _router = build_router(state);
    }
}
