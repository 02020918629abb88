//! Persona configuration types.
//!
//! `PersonaConfig` is the typed form of `personality.yaml`. Every field has an
//! explicit default so a sparse document degrades to empty sections instead
//! of failing to load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declarative description of the modeled persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Who the persona is talking to.
    #[serde(default = "default_target_person")]
    pub target_person: String,

    #[serde(default = "default_relationship_context")]
    pub relationship_context: String,

    #[serde(default)]
    pub style: Vec<String>,

    #[serde(default)]
    pub personality_traits: Vec<String>,

    #[serde(default)]
    pub behavioral_traits: Vec<String>,

    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default)]
    pub tone: Vec<String>,

    #[serde(default)]
    pub catchphrases: Vec<String>,

    #[serde(default)]
    pub voice_inspiration: Vec<String>,

    #[serde(default)]
    pub languages: Vec<String>,

    /// Behavior keyed by the addressee's mood.
    #[serde(default, alias = "flirty_behavior_rules")]
    pub mood_rules: MoodRules,

    /// Worked input/output pairs keyed by scenario name.
    #[serde(default)]
    pub communication_examples: BTreeMap<String, ExampleEntry>,

    /// Upper bound on reply length, in lines.
    #[serde(default = "default_max_response_lines")]
    pub max_response_lines: u8,

    /// Target share (percent) of the persona's primary language in replies.
    #[serde(default = "default_primary_language_share")]
    pub primary_language_share: u8,
}

fn default_name() -> String {
    "Yaswanth".to_string()
}

fn default_target_person() -> String {
    "Indu".to_string()
}

fn default_relationship_context() -> String {
    "rebuilding rapport".to_string()
}

fn default_max_response_lines() -> u8 {
    2
}

fn default_primary_language_share() -> u8 {
    80
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            target_person: default_target_person(),
            relationship_context: default_relationship_context(),
            style: Vec::new(),
            personality_traits: Vec::new(),
            behavioral_traits: Vec::new(),
            values: Vec::new(),
            tone: Vec::new(),
            catchphrases: Vec::new(),
            voice_inspiration: Vec::new(),
            languages: Vec::new(),
            mood_rules: MoodRules::default(),
            communication_examples: BTreeMap::new(),
            max_response_lines: default_max_response_lines(),
            primary_language_share: default_primary_language_share(),
        }
    }
}

impl PersonaConfig {
    /// Examples that carry both an input and an output, in scenario-key order.
    pub fn examples(&self) -> impl Iterator<Item = &CommunicationExample> {
        self.communication_examples
            .values()
            .filter_map(|entry| match entry {
                ExampleEntry::Pair(example) => Some(example),
                ExampleEntry::Other(_) => None,
            })
    }
}

/// Rules applied depending on the addressee's mood.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodRules {
    #[serde(default, alias = "when_indu_happy")]
    pub when_happy: Vec<String>,

    #[serde(default, alias = "when_indu_sad_angry")]
    pub when_upset: Vec<String>,
}

/// A literal input/output example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationExample {
    pub input: String,
    pub output: String,
}

/// A `communication_examples` entry.
///
/// Entries that are not an `{input, output}` mapping are kept as raw values
/// so one malformed example does not reject the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleEntry {
    Pair(CommunicationExample),
    Other(serde_yaml_ng::Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: PersonaConfig = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(config, PersonaConfig::default());
        assert_eq!(config.name, "Yaswanth");
        assert_eq!(config.target_person, "Indu");
        assert_eq!(config.max_response_lines, 2);
        assert_eq!(config.primary_language_share, 80);
    }

    #[test]
    fn test_legacy_rule_keys_are_accepted() {
        let yaml = r#"
name: Yaswanth
flirty_behavior_rules:
  when_indu_happy:
    - Tease back lightly
  when_indu_sad_angry:
    - Stay calm and listen
"#;
        let config: PersonaConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.mood_rules.when_happy, vec!["Tease back lightly"]);
        assert_eq!(config.mood_rules.when_upset, vec!["Stay calm and listen"]);
    }

    #[test]
    fn test_malformed_example_is_skipped() {
        let yaml = r#"
communication_examples:
  greeting:
    input: "Hi"
    output: "Hlo madam"
  broken: "just a string"
  missing_output:
    input: "Where?"
"#;
        let config: PersonaConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.communication_examples.len(), 3);
        let examples: Vec<_> = config.examples().collect();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].output, "Hlo madam");
    }
}
