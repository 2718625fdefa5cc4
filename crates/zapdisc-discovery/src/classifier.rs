//! Heuristic bot classification from profile metadata.

use std::sync::LazyLock;

use regex::Regex;

use crate::metadata::ProfileMetadata;

const BOT_WORD: &str = "bot";

/// Runs of letters and digits. Everything else separates words.
static WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid word regex"));

/// Classifies an author as automated.
///
/// An author is a bot when the profile sets `"bot": true`, or when the
/// standalone word "bot" appears in `name`, `display_name`, or `about`.
/// Camel-case humps count as word boundaries, so `CoolBot` and `NewsBOT`
/// match while `Robot` and `bots` do not. Absent metadata is never a bot.
#[must_use]
pub fn detect_bot(metadata: Option<&ProfileMetadata>) -> bool {
    let Some(metadata) = metadata else {
        return false;
    };

    if metadata.bot == Some(true) {
        return true;
    }

    [&metadata.name, &metadata.display_name, &metadata.about]
        .into_iter()
        .flatten()
        .any(|field| contains_word(field, BOT_WORD))
}

/// Case-insensitive whole-word search using [`words`] segmentation.
pub(crate) fn contains_word(text: &str, word: &str) -> bool {
    words(text).any(|w| w.eq_ignore_ascii_case(word))
}

/// Splits `text` into words: alphanumeric runs, further split at camel-case
/// humps (`coolBot` -> `cool`, `Bot`; `HTTPBot` -> `HTTP`, `Bot`).
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> {
    WORD_RUN
        .find_iter(text)
        .flat_map(|m| split_camel(m.as_str()))
}

fn split_camel(run: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = run.char_indices().collect();
    let mut parts = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let (offset, current) = chars[i];
        let previous = chars[i - 1].1;
        let next_is_lower = chars.get(i + 1).is_some_and(|(_, c)| c.is_lowercase());

        let hump = current.is_uppercase()
            && (previous.is_lowercase()
                || previous.is_numeric()
                || (previous.is_uppercase() && next_is_lower));
        if hump {
            parts.push(&run[start..offset]);
            start = offset;
        }
    }
    parts.push(&run[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ProfileMetadata {
        ProfileMetadata {
            name: Some(name.to_string()),
            ..ProfileMetadata::default()
        }
    }

    #[test]
    fn absent_metadata_is_not_bot() {
        assert!(!detect_bot(None));
    }

    #[test]
    fn empty_metadata_is_not_bot() {
        assert!(!detect_bot(Some(&ProfileMetadata::default())));
    }

    #[test]
    fn explicit_flag_wins_regardless_of_text() {
        let m = ProfileMetadata {
            bot: Some(true),
            name: Some("Alice".to_string()),
            ..ProfileMetadata::default()
        };
        assert!(detect_bot(Some(&m)));
    }

    #[test]
    fn explicit_false_flag_does_not_override_keyword() {
        let m = ProfileMetadata {
            bot: Some(false),
            about: Some("a bot".to_string()),
            ..ProfileMetadata::default()
        };
        assert!(detect_bot(Some(&m)));
    }

    #[test]
    fn camel_case_name_is_bot() {
        assert!(detect_bot(Some(&named("CoolBot"))));
        assert!(detect_bot(Some(&named("BotBot"))));
        assert!(detect_bot(Some(&named("NewsBOT"))));
        assert!(detect_bot(Some(&named("HTTPBot"))));
    }

    #[test]
    fn word_inside_another_word_is_not_bot() {
        assert!(!detect_bot(Some(&named("Robot Lover"))));
        assert!(!detect_bot(Some(&named("robots"))));
        assert!(!detect_bot(Some(&named("ROBOT"))));
        assert!(!detect_bot(Some(&named("Abbott"))));
    }

    #[test]
    fn about_sentence_is_bot() {
        let m = ProfileMetadata {
            about: Some("I am a bot.".to_string()),
            ..ProfileMetadata::default()
        };
        assert!(detect_bot(Some(&m)));
    }

    #[test]
    fn display_name_is_checked() {
        let m = ProfileMetadata {
            display_name: Some("weather-bot".to_string()),
            ..ProfileMetadata::default()
        };
        assert!(detect_bot(Some(&m)));
    }

    #[test]
    fn other_fields_are_ignored() {
        let m = ProfileMetadata {
            nip05: Some("bot@example.com".to_string()),
            picture: Some("https://example.com/bot.png".to_string()),
            ..ProfileMetadata::default()
        };
        assert!(!detect_bot(Some(&m)));
    }

    #[test]
    fn words_splits_on_humps_and_punctuation() {
        let got: Vec<&str> = words("hello, coolBot! HTTPServer v2Bot").collect();
        assert_eq!(got, vec!["hello", "cool", "Bot", "HTTP", "Server", "v2", "Bot"]);
    }

    #[test]
    fn contains_word_is_case_insensitive() {
        assert!(contains_word("BOT", "bot"));
        assert!(contains_word("a Bot here", "bot"));
        assert!(!contains_word("bottle", "bot"));
    }
}
