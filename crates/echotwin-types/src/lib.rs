//! Shared domain types for EchoTwin.
//!
//! This crate contains the core domain types used across the EchoTwin
//! workspace: transcript messages, persona configuration, exchanges and their
//! embedding records, generator requests, configuration, and error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod exchange;
pub mod llm;
pub mod persona;
pub mod transcript;
