//! Exchange (conversation turn) types shared by the dual store and retriever.
//!
//! An [`Exchange`] lives in the relational store; its [`EmbeddingRecord`] twin
//! lives in the vector index under the same [`ExchangeId`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Content-derived identifier joining an exchange across both stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(pub String);

impl ExchangeId {
    /// The text an exchange id is hashed from.
    pub fn source_text(user_input: &str, ai_response: &str) -> String {
        format!("User: {user_input} | AI: {ai_response}")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse mood label assigned at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "happy")]
    Happy,
    #[serde(rename = "negative")]
    Negative,
    #[serde(rename = "waiting/reminder")]
    WaitingReminder,
    #[serde(rename = "neutral")]
    Neutral,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Happy => write!(f, "happy"),
            Mood::Negative => write!(f, "negative"),
            Mood::WaitingReminder => write!(f, "waiting/reminder"),
            Mood::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "negative" => Ok(Mood::Negative),
            "waiting/reminder" => Ok(Mood::WaitingReminder),
            "neutral" => Ok(Mood::Neutral),
            other => Err(format!("invalid mood: '{other}'")),
        }
    }
}

/// Script balance of a text: target script versus Latin letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageMix {
    ScriptDominant,
    LatinDominant,
    Mixed,
}

impl fmt::Display for LanguageMix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageMix::ScriptDominant => write!(f, "script-dominant"),
            LanguageMix::LatinDominant => write!(f, "latin-dominant"),
            LanguageMix::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for LanguageMix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "script-dominant" => Ok(LanguageMix::ScriptDominant),
            "latin-dominant" => Ok(LanguageMix::LatinDominant),
            "mixed" => Ok(LanguageMix::Mixed),
            other => Err(format!("invalid language mix: '{other}'")),
        }
    }
}

/// One persisted request/response turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: ExchangeId,
    pub user_input: String,
    pub ai_response: String,
    pub context: String,
    pub mood: Mood,
    pub language_mix: LanguageMix,
    pub timestamp: DateTime<Utc>,
}

impl Exchange {
    /// The document embedded into the vector index.
    pub fn document(&self) -> String {
        ExchangeId::source_text(&self.user_input, &self.ai_response)
    }

    /// Vector-index twin of this exchange.
    pub fn to_embedding_record(&self) -> EmbeddingRecord {
        EmbeddingRecord {
            id: self.id.clone(),
            document: self.document(),
            timestamp: self.timestamp,
            date: self.timestamp.date_naive(),
            mood: self.mood,
            language_mix: self.language_mix,
            context: self.context.clone(),
        }
    }
}

/// Metadata stored alongside an exchange's embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: ExchangeId,
    pub document: String,
    pub timestamp: DateTime<Utc>,
    pub date: NaiveDate,
    pub mood: Mood,
    pub language_mix: LanguageMix,
    pub context: String,
}

/// A retrieved record with its embedding distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedExchange {
    pub record: EmbeddingRecord,
    /// Lower is more similar.
    pub distance: f32,
}

/// Aggregate counts over the relational store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total_conversations: u64,
    pub total_chat_messages: u64,
    /// Exchanges created within the last 24 hours.
    pub recent_conversations: u64,
    /// Exchange count per language-mix label.
    pub language_stats: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_display_and_parse() {
        for mood in [Mood::Happy, Mood::Negative, Mood::WaitingReminder, Mood::Neutral] {
            let parsed: Mood = mood.to_string().parse().unwrap();
            assert_eq!(parsed, mood);
        }
        assert_eq!(Mood::WaitingReminder.to_string(), "waiting/reminder");
        assert!("sleepy".parse::<Mood>().is_err());
    }

    #[test]
    fn test_mood_serde_matches_display() {
        let json = serde_json::to_string(&Mood::WaitingReminder).unwrap();
        assert_eq!(json, "\"waiting/reminder\"");
    }

    #[test]
    fn test_language_mix_labels() {
        assert_eq!(LanguageMix::ScriptDominant.to_string(), "script-dominant");
        assert_eq!(
            serde_json::to_string(&LanguageMix::LatinDominant).unwrap(),
            "\"latin-dominant\""
        );
        assert_eq!("MIXED".parse::<LanguageMix>().unwrap(), LanguageMix::Mixed);
    }

    #[test]
    fn test_embedding_record_mirrors_exchange() {
        let timestamp = "2026-03-04T10:15:00Z".parse::<DateTime<Utc>>().unwrap();
        let exchange = Exchange {
            id: ExchangeId("abc".to_string()),
            user_input: "ela unnav".to_string(),
            ai_response: "bagane".to_string(),
            context: String::new(),
            mood: Mood::Neutral,
            language_mix: LanguageMix::LatinDominant,
            timestamp,
        };

        let record = exchange.to_embedding_record();
        assert_eq!(record.id, exchange.id);
        assert_eq!(record.document, "User: ela unnav | AI: bagane");
        assert_eq!(record.date.to_string(), "2026-03-04");
    }
}
