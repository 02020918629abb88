//! Transcript domain types.
//!
//! A transcript is an exported chat log. Parsing turns it into ordered
//! [`TranscriptMessage`] values; ingestion persists them as
//! [`TranscriptRecord`] rows keyed by a content-derived id.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One parsed utterance from an exported chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    /// Parsed header time. `None` when the header matched the export
    /// pattern but named an impossible date (e.g. `31/02/23`).
    pub timestamp: Option<NaiveDateTime>,
    /// Header time exactly as it appeared in the export.
    pub raw_timestamp: String,
    /// Canonical sender after alias folding.
    pub sender: String,
    pub text: String,
    /// Whether the sender is the modeled persona.
    pub is_subject: bool,
}

/// A transcript message as stored, tagged with its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: String,
    pub file_name: String,
    pub message: TranscriptMessage,
}

/// One canonical participant and the raw display names that fold into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub canonical: String,
    /// Alternate spellings, matched case-insensitively.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Identity {
    pub fn matches(&self, raw: &str) -> bool {
        let needle = raw.trim().to_lowercase();
        std::iter::once(&self.canonical)
            .chain(&self.aliases)
            .any(|name| name.trim().to_lowercase() == needle)
    }
}

/// Alias table folding display names into the persona and addressee identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderAliases {
    #[serde(default = "default_subject")]
    pub subject: Identity,
    #[serde(default = "default_addressee")]
    pub addressee: Identity,
}

fn default_subject() -> Identity {
    Identity {
        canonical: "Yaswanth".to_string(),
        aliases: vec![
            "yaswanth".to_string(),
            "prosessor".to_string(),
            "processor".to_string(),
        ],
    }
}

fn default_addressee() -> Identity {
    Identity {
        canonical: "Indu".to_string(),
        aliases: vec!["indu".to_string(), "mustang".to_string()],
    }
}

impl Default for SenderAliases {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            addressee: default_addressee(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matches_case_insensitive() {
        let aliases = SenderAliases::default();
        assert!(aliases.subject.matches("PROCESSOR"));
        assert!(aliases.subject.matches(" Yaswanth "));
        assert!(aliases.addressee.matches("Mustang"));
        assert!(!aliases.addressee.matches("Ravi"));
    }

    #[test]
    fn test_mixed_case_alias_matches() {
        let identity = Identity {
            canonical: "Asha".to_string(),
            aliases: vec!["Ash".to_string(), " BOSS ".to_string()],
        };
        assert!(identity.matches("ash"));
        assert!(identity.matches("ASH"));
        assert!(identity.matches("Boss"));
        assert!(!identity.matches("Ashok"));
    }

    #[test]
    fn test_aliases_deserialize_partial() {
        let toml_str = r#"
[subject]
canonical = "Asha"
aliases = ["ash"]
"#;
        let aliases: SenderAliases = toml::from_str(toml_str).unwrap();
        assert_eq!(aliases.subject.canonical, "Asha");
        assert_eq!(aliases.addressee.canonical, "Indu");
    }
}
