//! Exported chat transcript parser.
//!
//! Lines of the form `[DD/MM/YY, H:MM:SS AM] Sender: text` open a new message.
//! Any other non-blank line continues the open message's text. The parser
//! never fails: lines that appear before the first header are dropped.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use echotwin_types::transcript::{SenderAliases, TranscriptMessage};

/// Joins the text segments of a multi-line message.
pub const TEXT_SEGMENT_SEPARATOR: &str = " ";

/// Export header format, as understood by chrono.
const HEADER_TIME_FORMAT: &str = "%d/%m/%y, %I:%M:%S %p";

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d{2}/\d{2}/\d{2}, \d{1,2}:\d{2}:\d{2} [AP]M)\] ([^:]+): (.+)$")
        .expect("valid header regex")
});

/// Message under construction: header fields plus accumulated text segments.
struct PendingMessage {
    raw_timestamp: String,
    sender: String,
    is_subject: bool,
    segments: Vec<String>,
}

impl PendingMessage {
    fn finish(self) -> TranscriptMessage {
        TranscriptMessage {
            timestamp: parse_header_time(&self.raw_timestamp),
            raw_timestamp: self.raw_timestamp,
            sender: self.sender,
            text: self.segments.join(TEXT_SEGMENT_SEPARATOR),
            is_subject: self.is_subject,
        }
    }
}

/// Parses transcript text into ordered messages, folding sender aliases.
#[derive(Debug, Clone, Default)]
pub struct TranscriptParser {
    aliases: SenderAliases,
}

impl TranscriptParser {
    pub fn new(aliases: SenderAliases) -> Self {
        Self { aliases }
    }

    /// Parse one transcript file's content, preserving source order.
    pub fn parse(&self, content: &str) -> Vec<TranscriptMessage> {
        let mut messages = Vec::new();
        let mut pending: Option<PendingMessage> = None;

        for line in content.lines() {
            if let Some(caps) = HEADER.captures(line) {
                if let Some(done) = pending.take() {
                    messages.push(done.finish());
                }
                let (sender, is_subject) = self.normalize_sender(&caps[2]);
                let first = caps[3].trim();
                pending = Some(PendingMessage {
                    raw_timestamp: caps[1].to_string(),
                    sender,
                    is_subject,
                    segments: if first.is_empty() {
                        Vec::new()
                    } else {
                        vec![first.to_string()]
                    },
                });
                continue;
            }

            let segment = line.trim();
            if segment.is_empty() {
                continue;
            }
            if let Some(open) = pending.as_mut() {
                open.segments.push(segment.to_string());
            }
        }

        if let Some(done) = pending {
            messages.push(done.finish());
        }

        messages
    }

    /// Fold a raw display name to its canonical identity.
    ///
    /// Returns the canonical name and whether it is the persona. Unknown
    /// senders pass through (trimmed) as non-subject.
    pub fn normalize_sender(&self, raw: &str) -> (String, bool) {
        if self.aliases.subject.matches(raw) {
            (self.aliases.subject.canonical.clone(), true)
        } else if self.aliases.addressee.matches(raw) {
            (self.aliases.addressee.canonical.clone(), false)
        } else {
            (raw.trim().to_string(), false)
        }
    }
}

fn parse_header_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, HEADER_TIME_FORMAT).ok()
}
