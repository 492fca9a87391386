use smallvec::SmallVec;
use std::fmt;
use std::fmt::{Debug, Formatter};

use crate::types::Word;
use crate::MAX_WORDS_PER_LINE;

/// The character used for a blocked cell in every rendered line and template.
pub const BLOCK: char = '#';

const BLOCK_BIT: u32 = 1;
const LETTER_BITS: u32 = ((1 << 26) - 1) << 1;

/// A set of cell values: the block plus the 26 lowercase letters, packed into a bitmask. This is
/// what gets accumulated from one axis (via `chars_at`) and pushed into the crossing axis (via
/// `filter`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharSet {
    bits: u32,
}

fn bit_for_char(ch: char) -> Option<u32> {
    match ch {
        BLOCK => Some(BLOCK_BIT),
        'a'..='z' => Some(1 << (ch as u32 - 'a' as u32 + 1)),
        _ => None,
    }
}

impl CharSet {
    /// A set with nothing in it.
    #[must_use]
    pub const fn empty() -> CharSet {
        CharSet { bits: 0 }
    }

    /// A set containing every letter and the block.
    #[must_use]
    pub const fn full() -> CharSet {
        CharSet {
            bits: LETTER_BITS | BLOCK_BIT,
        }
    }

    /// A set containing every letter but not the block.
    #[must_use]
    pub const fn letters() -> CharSet {
        CharSet { bits: LETTER_BITS }
    }

    #[must_use]
    pub fn single(ch: char) -> CharSet {
        let mut set = CharSet::empty();
        set.add(ch);
        set
    }

    /// Add a character to the set. Characters outside of the block and `a`-`z` are ignored, since
    /// no line can ever contain them.
    pub fn add(&mut self, ch: char) {
        if let Some(bit) = bit_for_char(ch) {
            self.bits |= bit;
        }
    }

    pub fn add_all(&mut self, other: CharSet) {
        self.bits |= other.bits;
    }

    #[must_use]
    pub fn contains(self, ch: char) -> bool {
        bit_for_char(ch).is_some_and(|bit| self.bits & bit != 0)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[must_use]
    pub fn is_full(self) -> bool {
        self.bits == CharSet::full().bits
    }

    /// Does the set contain all 26 letters (whether or not it contains the block)?
    #[must_use]
    pub fn has_all_letters(self) -> bool {
        self.bits & LETTER_BITS == LETTER_BITS
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate over the members of the set, block first.
    pub fn iter(self) -> impl Iterator<Item = char> {
        std::iter::once(BLOCK)
            .chain('a'..='z')
            .filter(move |&ch| self.contains(ch))
    }
}

impl Debug for CharSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CharSet({})", self.iter().collect::<String>())
    }
}

impl FromIterator<char> for CharSet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        let mut set = CharSet::empty();
        for ch in iter {
            set.add(ch);
        }
        set
    }
}

/// Split a rendered line into the words it contains, i.e. its maximal runs of non-block cells.
#[must_use]
pub fn split_words(line: &str) -> SmallVec<[Word; MAX_WORDS_PER_LINE]> {
    line.split(BLOCK)
        .filter(|segment| !segment.is_empty())
        .map(Word::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::util::{split_words, CharSet, BLOCK};

    #[test]
    fn test_char_set_membership() {
        let mut set = CharSet::empty();
        assert!(set.is_empty());

        set.add('q');
        set.add(BLOCK);
        set.add('!');
        assert!(set.contains('q'));
        assert!(set.contains(BLOCK));
        assert!(!set.contains('r'));
        assert!(!set.contains('!'));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<String>(), "#q");
    }

    #[test]
    fn test_char_set_saturation() {
        let mut set: CharSet = ('a'..='z').collect();
        assert!(set.has_all_letters());
        assert!(!set.is_full());
        assert_eq!(set, CharSet::letters());

        set.add(BLOCK);
        assert!(set.is_full());
        assert_eq!(set, CharSet::full());
    }

    #[test]
    fn test_split_words() {
        let words = split_words("#cab#ore##");
        assert_eq!(
            words.iter().map(AsRef::as_ref).collect::<Vec<&str>>(),
            vec!["cab", "ore"]
        );
        assert!(split_words("###").is_empty());
    }
}
