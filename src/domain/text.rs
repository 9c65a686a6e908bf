//! Text helpers shared by the scorer, aggregator and workflow.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

/// Words ignored when extracting keywords from a title.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has",
    "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me",
    "more", "my", "new", "no", "not", "now", "of", "on", "or", "our", "out", "over", "says",
    "she", "so", "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "to", "up", "us", "was", "we", "were", "what", "when", "which", "who", "why", "will",
    "with", "would", "you", "your",
];

fn noise_pattern() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| {
        Regex::new(r"https?://\S+|www\.\S+|@\w+|#\w+").expect("static regex pattern")
    })
}

fn whitespace_pattern() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("static regex pattern"))
}

/// Strip URLs, mentions and hashtags, collapse whitespace.
#[must_use]
pub fn clean_for_scoring(text: &str) -> String {
    let stripped = noise_pattern().replace_all(text, "");
    whitespace_pattern()
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Truncate to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Deduplication key for a title: lowercase with punctuation and
/// whitespace removed.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercase word tokens; `$` and inner apostrophes stay inside tokens.
pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '$' || c == '\''))
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
}

/// Significant keywords of a title: tokens of three or more characters
/// that are not stopwords.
#[must_use]
pub fn keywords(text: &str) -> BTreeSet<String> {
    tokens(text)
        .filter(|t| t.chars().count() >= 3 && !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// True when `text` contains `word` as a whole word (case-insensitive).
#[must_use]
pub fn contains_word(text: &str, word: &str) -> bool {
    let word = word.to_lowercase();
    tokens(text).any(|t| t == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_patterns_compile() {
        assert!(noise_pattern().is_match("@alice"));
        assert!(whitespace_pattern().is_match(" \t"));
    }

    #[test]
    fn clean_strips_urls_mentions_and_hashtags() {
        let cleaned = clean_for_scoring("Big news @alice   see https://x.com/a #crypto www.site.io now");
        assert_eq!(cleaned, "Big news see now");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn normalize_title_drops_case_and_punctuation() {
        assert_eq!(
            normalize_title("Bitcoin hits $100k!"),
            normalize_title("bitcoin  hits 100K")
        );
    }

    #[test]
    fn keywords_skip_stopwords_and_short_tokens() {
        let kws = keywords("Will the Fed cut rates in March?");
        assert!(kws.contains("fed"));
        assert!(kws.contains("rates"));
        assert!(kws.contains("march"));
        assert!(!kws.contains("will"));
        assert!(!kws.contains("in"));
    }

    #[test]
    fn contains_word_matches_whole_words_only() {
        assert!(contains_word("The team won the final", "won"));
        assert!(!contains_word("I know the answer", "no"));
    }
}
