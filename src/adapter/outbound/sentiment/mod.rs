//! Sentiment scorers.
//!
//! Both scorers share the same preprocessing: strip URLs, mentions and
//! hashtags, collapse whitespace, drop texts of [`MIN_TEXT_CHARS`]
//! characters or fewer and truncate the rest to [`MAX_TEXT_CHARS`].

pub mod huggingface;
pub mod lexicon;

pub use huggingface::HuggingFaceScorer;
pub use lexicon::LexiconScorer;

use crate::domain::text;

/// Cleaned texts must be longer than this to be scored.
pub const MIN_TEXT_CHARS: usize = 10;

/// Cleaned texts are truncated to this many characters.
pub const MAX_TEXT_CHARS: usize = 512;

/// Texts per upstream scoring request.
pub const BATCH_SIZE: usize = 10;

/// Clean, filter and truncate texts for scoring.
#[must_use]
pub fn prepare_texts(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .map(|t| text::clean_for_scoring(t))
        .filter(|t| t.chars().count() > MIN_TEXT_CHARS)
        .map(|t| text::truncate_chars(&t, MAX_TEXT_CHARS).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_drops_short_and_truncates_long() {
        let long = "word ".repeat(200);
        let texts = vec![
            "@bob #tag https://x.io".to_string(),
            "short one".to_string(),
            "This launch looks amazing https://t.co/x".to_string(),
            long,
        ];
        let prepared = prepare_texts(&texts);

        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0], "This launch looks amazing");
        assert_eq!(prepared[1].chars().count(), MAX_TEXT_CHARS);
    }
}
