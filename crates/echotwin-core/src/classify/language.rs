//! Script-balance classifier.

use echotwin_types::exchange::LanguageMix;

/// Unicode block of the persona's regional script (Telugu).
const TARGET_SCRIPT: std::ops::RangeInclusive<char> = '\u{0C00}'..='\u{0C7F}';

/// Compare target-script characters against ASCII Latin letters.
///
/// An exact tie (including text with neither) is `Mixed`.
pub fn language_mix(text: &str) -> LanguageMix {
    let (script, latin) = text.chars().fold((0usize, 0usize), |(script, latin), c| {
        if TARGET_SCRIPT.contains(&c) {
            (script + 1, latin)
        } else if c.is_ascii_alphabetic() {
            (script, latin + 1)
        } else {
            (script, latin)
        }
    });

    match script.cmp(&latin) {
        std::cmp::Ordering::Greater => LanguageMix::ScriptDominant,
        std::cmp::Ordering::Less => LanguageMix::LatinDominant,
        std::cmp::Ordering::Equal => LanguageMix::Mixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_dominant() {
        assert_eq!(language_mix("ఎలా ఉన్నావు"), LanguageMix::ScriptDominant);
    }

    #[test]
    fn test_latin_dominant() {
        assert_eq!(language_mix("ela unnav"), LanguageMix::LatinDominant);
        assert_eq!(language_mix("ok ఆ"), LanguageMix::LatinDominant);
    }

    #[test]
    fn test_tie_is_mixed() {
        assert_eq!(language_mix("ab అఆ"), LanguageMix::Mixed);
        assert_eq!(language_mix("😊 123"), LanguageMix::Mixed);
        assert_eq!(language_mix(""), LanguageMix::Mixed);
    }
}
