//! Write-time classification of exchange text.
//!
//! Both classifiers are pure functions so they can be tested without any
//! store behind them.

pub mod language;
pub mod mood;

pub use language::language_mix;
pub use mood::mood;
