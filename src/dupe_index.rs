use std::collections::HashSet;

use crate::possible_lines::{ConcreteLine, PossibleLines};
use crate::types::Word;

/// A struct used to track which words have already been placed somewhere in a grid, so that we
/// can enforce the rule against using a word twice.
#[derive(Debug, Clone, Default)]
pub struct DupeIndex {
    /// Every word recorded so far.
    pub words: HashSet<Word>,
}

impl DupeIndex {
    #[must_use]
    pub fn new() -> DupeIndex {
        DupeIndex::default()
    }

    /// Record a word, returning `false` if it was already present.
    pub fn add_word(&mut self, word: &str) -> bool {
        if self.words.contains(word) {
            return false;
        }
        self.words.insert(Word::from(word));
        true
    }

    /// Record several words, returning `false` as soon as one of them is a repeat.
    pub fn add_words(&mut self, words: &[impl AsRef<str>]) -> bool {
        words.iter().all(|word| self.add_word(word.as_ref()))
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

/// Do any of the words that are already certain in these lines appear more than once? Lines that
/// are still open contribute only the words they're guaranteed to contain.
pub fn has_duplicate_definite_words<'a>(lines: impl IntoIterator<Item = &'a PossibleLines>) -> bool {
    let mut index = DupeIndex::new();
    lines
        .into_iter()
        .any(|line| !index.add_words(line.definite_words().as_slice()))
}

/// Does any word appear more than once across these concrete lines?
pub fn has_duplicate_words<'a>(lines: impl IntoIterator<Item = &'a ConcreteLine>) -> bool {
    let mut index = DupeIndex::new();
    lines
        .into_iter()
        .any(|line| !index.add_words(line.words.as_slice()))
}

/// The first word that appears more than once in `words`, if any.
pub fn find_duplicate<'a>(words: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut index = DupeIndex::new();
    words.into_iter().find(|word| !index.add_word(word))
}
