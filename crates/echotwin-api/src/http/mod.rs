//! HTTP/REST API layer for EchoTwin.
//!
//! Axum-based JSON API under `/api/` plus `/health`, with CORS and request
//! tracing. A static web UI is served as a fallback when present.

pub mod demo;
pub mod error;
pub mod handlers;
pub mod router;
