//! Generator abstractions.
//!
//! - `LlmProvider`: RPITIT trait for concrete generator backends
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;
