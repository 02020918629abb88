//! Canned replies for `/api/chat` when no generator is configured.
//!
//! The message is matched against keyword groups in a fixed priority order;
//! each group rotates through its replies so repeated questions vary.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoTopic {
    Greeting,
    Language,
    Technical,
    Question,
    General,
}

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "namaste", "hola"];
const LANGUAGE_WORDS: &[&str] = &["telugu", "hindi", "language", "languages", "multilingual"];
const TECHNICAL_WORDS: &[&str] = &["technology", "api", "setup", "works", "stack"];
const QUESTION_WORDS: &[&str] = &["what", "who", "how", "tell me"];

const GREETING_REPLIES: &[&str] = &[
    "Hello! 👋 This is the demo. Set OPENAI_API_KEY and I reply in the persona's own voice.",
    "Hey there! 🌟 Demo mode lo unnanu, real replies need a generator key.",
    "Namaste! 🙏 Demo replies only for now. Configure a key for the full twin.",
];

const LANGUAGE_REPLIES: &[&str] = &[
    "Code-switching between Telugu and English is the whole point! 😊 Demo lo limited replies matrame.",
    "Replies follow the persona's language mix. In demo mode, you only get these canned lines.",
    "Telugu script, romanized Telugu, English: all of it lands in the same memory space. ✨",
];

const TECHNICAL_REPLIES: &[&str] = &[
    "Rust backend: SQLite for exchanges, LanceDB for semantic memory, fastembed for vectors. 🛠️",
    "Every reply is grounded in past exchanges retrieved by similarity, then shaped by the persona prompt. 🧠",
    "Setup: put exported chats in chat_data/, run `echotwin ingest`, then export OPENAI_API_KEY. 🚀",
];

const QUESTION_REPLIES: &[&str] = &[
    "I'm a persona twin: I learn a chat style from exported transcripts and reply in that voice. 🤖",
    "I remember past conversations and pull the relevant ones into each reply. 💬",
    "Ask me anything once a generator key is set. For now this is the demo. 😎",
];

const GENERAL_REPLIES: &[&str] = &[
    "Demo mode active! 🎯 The full twin remembers conversations and adapts to the persona.",
    "This is a canned reply. Set OPENAI_API_KEY cheyyandi for real conversations! 📱",
    "Nice UI kada? 🎨 The real twin adds mood detection and style-aware replies.",
    "Demo response! 🌟 The production twin grounds every reply in semantic memory.",
];

impl DemoTopic {
    /// Classify a message. Single words match whole tokens, phrases match substrings.
    pub fn of(message: &str) -> Self {
        let lower = message.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let hit = |keys: &[&str]| {
            keys.iter().any(|key| {
                if key.contains(' ') {
                    lower.contains(key)
                } else {
                    words.contains(key)
                }
            })
        };

        if hit(GREETING_WORDS) {
            DemoTopic::Greeting
        } else if hit(LANGUAGE_WORDS) {
            DemoTopic::Language
        } else if hit(TECHNICAL_WORDS) {
            DemoTopic::Technical
        } else if hit(QUESTION_WORDS) {
            DemoTopic::Question
        } else {
            DemoTopic::General
        }
    }

    fn replies(self) -> &'static [&'static str] {
        match self {
            DemoTopic::Greeting => GREETING_REPLIES,
            DemoTopic::Language => LANGUAGE_REPLIES,
            DemoTopic::Technical => TECHNICAL_REPLIES,
            DemoTopic::Question => QUESTION_REPLIES,
            DemoTopic::General => GENERAL_REPLIES,
        }
    }
}

#[derive(Debug, Default)]
pub struct DemoResponder {
    next: AtomicUsize,
}

impl DemoResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, message: &str) -> &'static str {
        let replies = DemoTopic::of(message).replies();
        let turn = self.next.fetch_add(1, Ordering::Relaxed);
        replies[turn % replies.len()]
    }
}
