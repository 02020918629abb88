//! Communication-style profiling from the persona's own transcript messages.

pub mod extractor;

pub use extractor::{StyleExtractor, StyleMarkers};
