//! SQLite relational store for exchanges and transcript messages.

pub mod exchange;
pub mod pool;
pub mod transcript;
