//! Vocabulary-presence style extractor.
//!
//! Two fixed vocabularies are matched against the persona's messages: one of
//! regional-language (romanized Telugu) markers and one of informal English
//! shorthand. The result records which entries the persona actually uses,
//! not how often.

use serde::Serialize;

/// Romanized regional-language markers.
pub const REGIONAL_VOCABULARY: &[&str] = &[
    "kadha",
    "ante",
    "ayyo",
    "devudaaa",
    "ayyayyo",
    "haa",
    "avunu",
    "ledhu",
    "cheppu",
    "chesthaanu",
    "unnav",
    "bagane",
    "ela",
    "enti",
    "andhuke",
    "theliyadhu",
    "gurthuledu",
    "koncham",
    "manchi",
    "thappu",
    "sare le",
    "po po",
    "madam",
    "andi",
];

/// Informal English expressions and shorthand spellings.
pub const INFORMAL_VOCABULARY: &[&str] = &[
    "Ok ok",
    "Thank you",
    "No problem",
    "I will try",
    "Ayina",
    "Actually",
    "Seriously",
    "Just",
    "Yeah",
    "Hlo",
    "Thnx",
    "U tell",
    "Wht",
    "Tht",
    "Aftr",
    "Evn",
    "Undrstud",
];

/// Vocabulary entries observed in the persona's messages, in vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleMarkers {
    pub regional_phrases: Vec<String>,
    pub informal_expressions: Vec<String>,
}

impl StyleMarkers {
    /// Cap each list at `n` entries for prompt rendering.
    pub fn preview(&self, n: usize) -> StyleMarkers {
        StyleMarkers {
            regional_phrases: self.regional_phrases.iter().take(n).cloned().collect(),
            informal_expressions: self.informal_expressions.iter().take(n).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regional_phrases.is_empty() && self.informal_expressions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct StyleExtractor {
    regional: Vec<String>,
    informal: Vec<String>,
}

impl Default for StyleExtractor {
    fn default() -> Self {
        Self::new(REGIONAL_VOCABULARY, INFORMAL_VOCABULARY)
    }
}

impl StyleExtractor {
    pub fn new(regional: &[&str], informal: &[&str]) -> Self {
        Self {
            regional: regional.iter().map(|s| s.to_string()).collect(),
            informal: informal.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Entries of each vocabulary that occur, case-insensitively, as a
    /// substring of at least one text.
    pub fn extract<S: AsRef<str>>(&self, texts: &[S]) -> StyleMarkers {
        let lowered: Vec<String> = texts.iter().map(|t| t.as_ref().to_lowercase()).collect();
        StyleMarkers {
            regional_phrases: present(&self.regional, &lowered),
            informal_expressions: present(&self.informal, &lowered),
        }
    }
}

fn present(vocabulary: &[String], lowered: &[String]) -> Vec<String> {
    vocabulary
        .iter()
        .filter(|entry| {
            let needle = entry.to_lowercase();
            lowered.iter().any(|text| text.contains(&needle))
        })
        .cloned()
        .collect()
}
