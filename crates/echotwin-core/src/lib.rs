//! Memory and persona pipeline for EchoTwin.
//!
//! This crate holds the conversational core and the "ports" (RPITIT traits)
//! the infrastructure layer implements. It depends only on
//! `echotwin-types` -- never on `echotwin-infra` or any database/IO crate.

pub mod classify;
pub mod conversation;
pub mod llm;
pub mod memory;
pub mod persona;
pub mod service;
pub mod style;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;
