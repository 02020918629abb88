//! Keyword/emoji mood classifier.

use echotwin_types::exchange::Mood;

const POSITIVE: &[&str] = &["happy", "good", "great", "awesome", "nice", "😊", "😄", "😍"];

const NEGATIVE: &[&str] = &["sad", "upset", "angry", "frustrated", "bad", "😢", "😠"];

/// Whole-message strings that mean "still waiting for a reply".
const WAITING: &[&str] = &["..", ".", "...", "waiting", "where"];

/// Classify the mood of a message.
///
/// Sets are checked in priority order positive, negative, waiting; the first
/// hit wins. Positive and negative are substring tests on the lowercased
/// text, waiting requires the whole trimmed message to match.
pub fn mood(text: &str) -> Mood {
    let lower = text.to_lowercase();

    if POSITIVE.iter().any(|word| lower.contains(word)) {
        return Mood::Happy;
    }
    if NEGATIVE.iter().any(|word| lower.contains(word)) {
        return Mood::Negative;
    }
    if WAITING.contains(&lower.trim()) {
        return Mood::WaitingReminder;
    }
    Mood::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_keyword_and_emoji() {
        assert_eq!(mood("this is great 😊"), Mood::Happy);
        assert_eq!(mood("😍"), Mood::Happy);
        assert_eq!(mood("AWESOME"), Mood::Happy);
    }

    #[test]
    fn test_negative() {
        assert_eq!(mood("I'm upset with you"), Mood::Negative);
        assert_eq!(mood("😠"), Mood::Negative);
    }

    #[test]
    fn test_positive_wins_over_negative() {
        assert_eq!(mood("not bad, actually good"), Mood::Happy);
    }

    #[test]
    fn test_waiting_requires_exact_match() {
        assert_eq!(mood("..."), Mood::WaitingReminder);
        assert_eq!(mood("  .  "), Mood::WaitingReminder);
        assert_eq!(mood("Where"), Mood::WaitingReminder);
        assert_eq!(mood("where are you"), Mood::Neutral);
    }

    #[test]
    fn test_neutral() {
        assert_eq!(mood("ok fine"), Mood::Neutral);
        assert_eq!(mood(""), Mood::Neutral);
    }
}
