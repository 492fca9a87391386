use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

use crate::types::Word;

/// Stop recording rejected entries once there are this many; the rest are still skipped.
pub const MAX_RECORDED_ERRORS: usize = 100;

/// Given a raw word from a dictionary, turn it into the normalized form we'll use in the actual
/// generator.
#[must_use]
pub fn normalize_word(canonical: &str) -> String {
    canonical
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordListError {
    #[error("Word list contains invalid word: “{0}”")]
    InvalidWord(String),
}

/// The dictionary a generator draws from: words bucketed by exact length and split into
/// "common" (preferred) and "obscure" tiers. Each word appears in at most one tier, and excluded
/// words appear in neither.
#[derive(Debug, Clone)]
pub struct WordList {
    /// Preferred words bucketed by length, so `common[5]` holds the five-letter ones. Every
    /// length up to the longest loaded word has a (possibly empty) bucket.
    pub common: Vec<Vec<Word>>,

    /// Obscure words, bucketed the same way as `common`.
    pub obscure: Vec<Vec<Word>>,

    /// The maximum word length provided when configuring the list, if any.
    pub max_length: Option<usize>,

    /// Entries that were dropped because they can't appear in a grid.
    pub errors: Vec<WordListError>,

    index: HashSet<Word>,
}

impl WordList {
    /// Build a word list from raw common, obscure, and excluded entries, omitting anything longer
    /// than `max_length`. Words present in both tiers are kept as common only.
    #[must_use]
    pub fn new(
        common: &[impl AsRef<str>],
        obscure: &[impl AsRef<str>],
        excluded: &[impl AsRef<str>],
        max_length: Option<usize>,
    ) -> WordList {
        let mut errors = vec![];
        let mut seen: HashSet<Word> = excluded
            .iter()
            .map(|word| Word::from(normalize_word(word.as_ref())))
            .collect();

        let mut instance = WordList {
            common: vec![vec![]],
            obscure: vec![vec![]],
            max_length,
            errors: vec![],
            index: HashSet::new(),
        };

        let common = common.iter().map(|raw| (raw.as_ref(), true));
        let obscure = obscure.iter().map(|raw| (raw.as_ref(), false));
        for (raw, is_common) in common.chain(obscure) {
            let Some(word) = parse_word(raw, &mut errors) else {
                continue;
            };
            if max_length.is_some_and(|max| word.len() > max) || seen.contains(&word) {
                continue;
            }
            seen.insert(word.clone());
            instance.add_word(word, is_common);
        }

        instance.errors = errors;
        instance
    }

    /// Build a word list with no exclusions and no length limit.
    #[must_use]
    pub fn from_words(common: &[impl AsRef<str>], obscure: &[impl AsRef<str>]) -> WordList {
        WordList::new(common, obscure, &[] as &[&str], None)
    }

    fn add_word(&mut self, word: Word, is_common: bool) {
        let length = word.len();
        while self.common.len() < length + 1 {
            self.common.push(vec![]);
            self.obscure.push(vec![]);
        }
        self.index.insert(word.clone());
        if is_common {
            self.common[length].push(word);
        } else {
            self.obscure[length].push(word);
        }
    }

    /// The preferred words of exactly this length.
    #[must_use]
    pub fn common_words(&self, length: usize) -> &[Word] {
        self.common.get(length).map_or(&[], Vec::as_slice)
    }

    /// The obscure words of exactly this length.
    #[must_use]
    pub fn obscure_words(&self, length: usize) -> &[Word] {
        self.obscure.get(length).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    /// Total number of usable words across both tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Normalize a raw entry, returning `None` (and recording an error) if it contains anything other
/// than the letters `a`-`z` once normalized.
fn parse_word(raw: &str, errors: &mut Vec<WordListError>) -> Option<Word> {
    let normalized = normalize_word(raw);
    if !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_lowercase()) {
        return Some(Word::from(normalized));
    }

    warn!(word = raw, "skipping invalid word list entry");
    if errors.len() < MAX_RECORDED_ERRORS {
        errors.push(WordListError::InvalidWord(raw.into()));
    }
    None
}

#[cfg(test)]
pub mod tests {
    use crate::word_list::{WordList, WordListError, MAX_RECORDED_ERRORS};

    #[test]
    fn test_buckets_words_by_length() {
        let word_list = WordList::from_words(&["cab", "ore", "skate"], &["aa", "wed"]);

        assert_eq!(word_list.common.len(), 6);
        assert_eq!(word_list.common_words(3).len(), 2);
        assert_eq!(word_list.common_words(5)[0].as_ref(), "skate");
        assert_eq!(word_list.obscure_words(2)[0].as_ref(), "aa");
        assert!(word_list.common_words(4).is_empty());
        assert!(word_list.obscure_words(40).is_empty());
        assert_eq!(word_list.len(), 5);
    }

    #[test]
    fn test_common_words_win_over_obscure_and_excluded_words_are_dropped() {
        let word_list = WordList::new(
            &["cab", "ore", "ore"],
            &["cab", "wed", "bed"],
            &["BED"],
            None,
        );

        assert_eq!(
            word_list
                .common_words(3)
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>(),
            vec!["cab", "ore"]
        );
        assert_eq!(
            word_list
                .obscure_words(3)
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>(),
            vec!["wed"]
        );
        assert!(!word_list.contains("bed"));
    }

    #[test]
    fn test_loads_words_up_to_max_length() {
        let word_list = WordList::new(&["cab", "skate", "skates"], &["on"], &[] as &[&str], Some(5));

        assert_eq!(word_list.max_length, Some(5));
        assert_eq!(word_list.common.len(), 6);
        assert!(word_list.contains("skate"));
        assert!(!word_list.contains("skates"));
    }

    #[test]
    fn test_normalizes_and_rejects_words() {
        let word_list = WordList::from_words(&["Cab", " O re ", "hélen", "it's", ""], &[] as &[&str]);

        assert!(word_list.contains("cab"));
        assert!(word_list.contains("ore"));
        assert_eq!(
            word_list.errors,
            vec![
                WordListError::InvalidWord("hélen".into()),
                WordListError::InvalidWord("it's".into()),
                WordListError::InvalidWord(String::new()),
            ]
        );
    }

    #[test]
    fn test_caps_recorded_errors() {
        let bad: Vec<String> = (0..MAX_RECORDED_ERRORS * 2).map(|i| format!("{i}")).collect();
        let word_list = WordList::from_words(&bad, &["cab"]);

        assert_eq!(word_list.errors.len(), MAX_RECORDED_ERRORS);
        assert_eq!(word_list.len(), 1);
    }
}
