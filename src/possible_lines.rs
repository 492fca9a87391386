//! This module implements a lazy, structurally-shared representation of every way a single line
//! of the grid (one row or one column) can be filled. Rather than materializing the full set of
//! strings, which grows combinatorially with line length, a `PossibleLines` value is a small tree
//! of variants:
//!
//! - `Words`: a leaf holding literal dictionary words that span the whole line.
//! - `BlockBefore` / `BlockAfter`: a block on one end of a shorter line.
//! - `BlockBetween`: two shorter lines joined by a block, where the two sides may not reuse a word.
//! - `Compound`: the union of several alternatives of the same length.
//! - `Definite`: a single concrete line.
//! - `Impossible`: nothing fits.
//!
//! Values are immutable. Every narrowing operation returns a new value that shares unchanged
//! subtrees with the old one through `Arc`s, so keeping old values around for backtracking is
//! cheap.

use smallvec::smallvec;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::ops::Range;
use std::sync::Arc;

use crate::types::Word;
use crate::util::{split_words, CharSet, BLOCK};
use crate::MAX_WORDS_PER_LINE;

/// A `BlockBetween` that has been narrowed below this many possibilities is expanded into a flat
/// `Compound` of `Definite` lines.
pub const MATERIALIZE_BLOCK_BETWEEN_BELOW: u64 = 50;

/// A `Compound` that has been narrowed to at most this many possibilities is flattened the same
/// way, unless all of its alternatives are already `Definite`.
pub const MATERIALIZE_COMPOUND_AT_MOST: u64 = 20;

/// The words making up a concrete line, in order.
pub type LineWords = smallvec::SmallVec<[Word; MAX_WORDS_PER_LINE]>;

/// A lazy iterator over concrete lines. It owns everything it needs, so it can outlive the value
/// that produced it.
pub type LineIter = Box<dyn Iterator<Item = ConcreteLine> + Send>;

/// One fully-resolved line: its rendered string (letters and `#` blocks) plus the words it's made
/// of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteLine {
    pub line: String,
    pub words: LineWords,
}

impl ConcreteLine {
    /// Build a concrete line from its rendered string, deriving the words from the runs of letters.
    #[must_use]
    pub fn new(line: impl Into<String>) -> ConcreteLine {
        let line = line.into();
        let words = split_words(&line);
        ConcreteLine { line, words }
    }

    fn from_word(word: &Word) -> ConcreteLine {
        ConcreteLine {
            line: word.to_string(),
            words: smallvec![word.clone()],
        }
    }

    #[must_use]
    pub fn num_letters(&self) -> usize {
        self.line.len()
    }

    #[must_use]
    pub fn char_at(&self, index: usize) -> char {
        self.line.as_bytes()[index] as char
    }

    /// Does any word occur more than once within this line?
    #[must_use]
    pub fn has_duplicate_words(&self) -> bool {
        self.words
            .iter()
            .enumerate()
            .any(|(i, word)| self.words[..i].contains(word))
    }

    #[must_use]
    pub fn shares_word_with(&self, other: &ConcreteLine) -> bool {
        self.words.iter().any(|word| other.words.contains(word))
    }

    fn with_block_before(mut self) -> ConcreteLine {
        self.line.insert(0, BLOCK);
        self
    }

    fn with_block_after(mut self) -> ConcreteLine {
        self.line.push(BLOCK);
        self
    }

    fn joined(first: &ConcreteLine, second: ConcreteLine) -> ConcreteLine {
        let mut line = String::with_capacity(first.line.len() + second.line.len() + 1);
        line.push_str(&first.line);
        line.push(BLOCK);
        line.push_str(&second.line);

        ConcreteLine {
            line,
            words: first.words.iter().cloned().chain(second.words).collect(),
        }
    }
}

/// A window into a shared, immutable list of words. Splitting a list in half for bisection just
/// narrows the window; only filtering allocates a new list.
#[derive(Clone)]
pub struct WordSlice {
    words: Arc<[Word]>,
    range: Range<usize>,
}

impl WordSlice {
    #[must_use]
    pub fn new(words: Vec<Word>) -> WordSlice {
        let range = 0..words.len();
        WordSlice {
            words: words.into(),
            range,
        }
    }

    fn empty() -> WordSlice {
        WordSlice::new(vec![])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Word] {
        &self.words[self.range.clone()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    fn split_half(&self) -> (WordSlice, WordSlice) {
        let mid = self.range.start + self.len() / 2;
        (
            WordSlice {
                words: self.words.clone(),
                range: self.range.start..mid,
            },
            WordSlice {
                words: self.words.clone(),
                range: mid..self.range.end,
            },
        )
    }

    /// Keep only the words matching `keep`, or return `None` if that would keep all of them.
    fn retain(&self, keep: impl Fn(&Word) -> bool) -> Option<WordSlice> {
        if self.as_slice().iter().all(&keep) {
            return None;
        }
        Some(WordSlice::new(
            self.as_slice().iter().filter(|word| keep(word)).cloned().collect(),
        ))
    }

    fn into_words(self) -> impl Iterator<Item = Word> {
        let WordSlice { words, range } = self;
        range.map(move |i| words[i].clone())
    }
}

/// Two sub-lines separated by a single block.
pub struct BlockBetween {
    first: PossibleLines,
    second: PossibleLines,
    max: u64,
}

impl BlockBetween {
    #[must_use]
    pub fn first(&self) -> &PossibleLines {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &PossibleLines {
        &self.second
    }
}

/// A union of at least two same-length alternatives, none of which are themselves `Compound` or
/// `Impossible`.
pub struct Compound {
    options: Vec<PossibleLines>,
    num_letters: usize,
    max: u64,
}

impl Compound {
    #[must_use]
    pub fn options(&self) -> &[PossibleLines] {
        &self.options
    }
}

/// The set of candidate fills for one line.
#[derive(Clone)]
pub enum PossibleLines {
    Impossible(usize),
    Words {
        num_letters: usize,
        preferred: WordSlice,
        obscure: WordSlice,
    },
    BlockBefore(Arc<PossibleLines>),
    BlockAfter(Arc<PossibleLines>),
    BlockBetween(Arc<BlockBetween>),
    Compound(Arc<Compound>),
    Definite(Arc<ConcreteLine>),
}

/// The result of `make_choice`: two disjoint parts that together cover the original set.
#[derive(Debug, Clone)]
pub struct ChoiceStep {
    pub choice: PossibleLines,
    pub remaining: PossibleLines,
}

impl Debug for PossibleLines {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PossibleLines::Impossible(num_letters) => write!(f, "Impossible({num_letters})"),
            PossibleLines::Words {
                num_letters,
                preferred,
                obscure,
            } => f
                .debug_struct("Words")
                .field("num_letters", num_letters)
                .field("preferred", &preferred.len())
                .field("obscure", &obscure.len())
                .finish(),
            PossibleLines::BlockBefore(inner) => f.debug_tuple("BlockBefore").field(inner).finish(),
            PossibleLines::BlockAfter(inner) => f.debug_tuple("BlockAfter").field(inner).finish(),
            PossibleLines::BlockBetween(block_between) => f
                .debug_tuple("BlockBetween")
                .field(&block_between.first)
                .field(&block_between.second)
                .finish(),
            PossibleLines::Compound(compound) => f
                .debug_struct("Compound")
                .field("num_letters", &compound.num_letters)
                .field("max", &compound.max)
                .field("options", &compound.options.len())
                .finish(),
            PossibleLines::Definite(line) => write!(f, "Definite({:?})", line.line),
        }
    }
}

impl PossibleLines {
    /// Build a `Words` leaf, collapsing it to `Impossible` or `Definite` if it holds zero or one
    /// words. All words must be exactly `num_letters` long.
    #[must_use]
    pub fn words(num_letters: usize, preferred: Vec<Word>, obscure: Vec<Word>) -> PossibleLines {
        PossibleLines::from_word_slices(
            num_letters,
            WordSlice::new(preferred),
            WordSlice::new(obscure),
        )
    }

    fn from_word_slices(
        num_letters: usize,
        preferred: WordSlice,
        obscure: WordSlice,
    ) -> PossibleLines {
        let total = preferred.len() + obscure.len();
        if total == 0 {
            return PossibleLines::Impossible(num_letters);
        }
        if total == 1 {
            let only = preferred.as_slice().iter().chain(obscure.as_slice()).next();
            if let Some(word) = only {
                return PossibleLines::definite(ConcreteLine::from_word(word));
            }
        }
        PossibleLines::Words {
            num_letters,
            preferred,
            obscure,
        }
    }

    #[must_use]
    pub fn definite(line: ConcreteLine) -> PossibleLines {
        PossibleLines::Definite(Arc::new(line))
    }

    #[must_use]
    pub fn block_before(inner: PossibleLines) -> PossibleLines {
        if inner.is_impossible() {
            return PossibleLines::Impossible(inner.num_letters() + 1);
        }
        PossibleLines::BlockBefore(Arc::new(inner))
    }

    #[must_use]
    pub fn block_after(inner: PossibleLines) -> PossibleLines {
        if inner.is_impossible() {
            return PossibleLines::Impossible(inner.num_letters() + 1);
        }
        PossibleLines::BlockAfter(Arc::new(inner))
    }

    #[must_use]
    pub fn block_between(first: PossibleLines, second: PossibleLines) -> PossibleLines {
        if first.is_impossible() || second.is_impossible() {
            return PossibleLines::Impossible(first.num_letters() + second.num_letters() + 1);
        }
        let max = first
            .max_possibilities()
            .saturating_mul(second.max_possibilities());
        PossibleLines::BlockBetween(Arc::new(BlockBetween { first, second, max }))
    }

    /// Build the union of `options`, all of which must be `num_letters` long. Nested compounds are
    /// flattened and impossible options dropped; if fewer than two options remain, the result is
    /// the single remaining option (or `Impossible`).
    #[must_use]
    pub fn compound(
        num_letters: usize,
        options: impl IntoIterator<Item = PossibleLines>,
    ) -> PossibleLines {
        let mut flattened = vec![];
        for option in options {
            match option {
                PossibleLines::Compound(inner) => flattened.extend(inner.options.iter().cloned()),
                option if option.is_impossible() => {}
                option => flattened.push(option),
            }
        }

        if flattened.len() <= 1 {
            return flattened
                .pop()
                .unwrap_or(PossibleLines::Impossible(num_letters));
        }

        let max = flattened
            .iter()
            .fold(0u64, |sum, option| sum.saturating_add(option.max_possibilities()));
        PossibleLines::Compound(Arc::new(Compound {
            options: flattened,
            num_letters,
            max,
        }))
    }

    #[must_use]
    pub fn num_letters(&self) -> usize {
        match self {
            PossibleLines::Impossible(num_letters) => *num_letters,
            PossibleLines::Words { num_letters, .. } => *num_letters,
            PossibleLines::BlockBefore(inner) | PossibleLines::BlockAfter(inner) => {
                inner.num_letters() + 1
            }
            PossibleLines::BlockBetween(block_between) => {
                block_between.first.num_letters() + block_between.second.num_letters() + 1
            }
            PossibleLines::Compound(compound) => compound.num_letters,
            PossibleLines::Definite(line) => line.num_letters(),
        }
    }

    /// An upper bound on the number of distinct lines this value can produce. `Compound` sums its
    /// alternatives even where they overlap, and `BlockBetween` ignores its no-shared-word rule,
    /// so this can over-count, but it never increases as a value is narrowed.
    #[must_use]
    pub fn max_possibilities(&self) -> u64 {
        match self {
            PossibleLines::Impossible(_) => 0,
            PossibleLines::Words {
                preferred, obscure, ..
            } => (preferred.len() + obscure.len()) as u64,
            PossibleLines::BlockBefore(inner) | PossibleLines::BlockAfter(inner) => {
                inner.max_possibilities()
            }
            PossibleLines::BlockBetween(block_between) => block_between.max,
            PossibleLines::Compound(compound) => compound.max,
            PossibleLines::Definite(_) => 1,
        }
    }

    #[must_use]
    pub fn is_impossible(&self) -> bool {
        self.max_possibilities() == 0
    }

    /// Add every character that can appear at `index` to `chars`. This stops early once `chars`
    /// can't grow any further.
    pub fn chars_at(&self, chars: &mut CharSet, index: usize) {
        if chars.is_full() {
            return;
        }

        match self {
            PossibleLines::Impossible(_) => {}
            PossibleLines::Words {
                preferred, obscure, ..
            } => {
                // Words never contain blocks, so once every letter is present we're done.
                if chars.has_all_letters() {
                    return;
                }
                for word in preferred.as_slice().iter().chain(obscure.as_slice()) {
                    chars.add(word.as_bytes()[index] as char);
                    if chars.has_all_letters() {
                        return;
                    }
                }
            }
            PossibleLines::BlockBefore(inner) => {
                if index == 0 {
                    chars.add(BLOCK);
                } else {
                    inner.chars_at(chars, index - 1);
                }
            }
            PossibleLines::BlockAfter(inner) => {
                if index == inner.num_letters() {
                    chars.add(BLOCK);
                } else {
                    inner.chars_at(chars, index);
                }
            }
            PossibleLines::BlockBetween(block_between) => {
                let split = block_between.first.num_letters();
                match index.cmp(&split) {
                    Ordering::Less => block_between.first.chars_at(chars, index),
                    Ordering::Equal => chars.add(BLOCK),
                    Ordering::Greater => block_between.second.chars_at(chars, index - split - 1),
                }
            }
            PossibleLines::Compound(compound) => {
                for option in &compound.options {
                    option.chars_at(chars, index);
                    if chars.is_full() {
                        return;
                    }
                }
            }
            PossibleLines::Definite(line) => chars.add(line.char_at(index)),
        }
    }

    /// Is the cell at `index` a block in every line this value can produce?
    #[must_use]
    pub fn definitely_blocked_at(&self, index: usize) -> bool {
        match self {
            PossibleLines::Impossible(_) | PossibleLines::Words { .. } => false,
            PossibleLines::BlockBefore(inner) => {
                index == 0 || inner.definitely_blocked_at(index - 1)
            }
            PossibleLines::BlockAfter(inner) => {
                index == inner.num_letters() || inner.definitely_blocked_at(index)
            }
            PossibleLines::BlockBetween(block_between) => {
                let split = block_between.first.num_letters();
                match index.cmp(&split) {
                    Ordering::Less => block_between.first.definitely_blocked_at(index),
                    Ordering::Equal => true,
                    Ordering::Greater => block_between
                        .second
                        .definitely_blocked_at(index - split - 1),
                }
            }
            PossibleLines::Compound(compound) => compound
                .options
                .iter()
                .all(|option| option.definitely_blocked_at(index)),
            PossibleLines::Definite(line) => line.char_at(index) == BLOCK,
        }
    }

    /// Words that are known to appear in every line this value can produce. This is exact for
    /// `Definite` and conservative elsewhere (a `Compound` reports none).
    #[must_use]
    pub fn definite_words(&self) -> LineWords {
        match self {
            PossibleLines::Impossible(_)
            | PossibleLines::Words { .. }
            | PossibleLines::Compound(_) => LineWords::new(),
            PossibleLines::BlockBefore(inner) | PossibleLines::BlockAfter(inner) => {
                inner.definite_words()
            }
            PossibleLines::BlockBetween(block_between) => {
                let mut words = block_between.first.definite_words();
                words.extend(block_between.second.definite_words());
                words
            }
            PossibleLines::Definite(line) => line.words.clone(),
        }
    }

    /// Keep only the lines whose character at `index` is in `allowed`.
    #[must_use]
    pub fn filter(&self, allowed: CharSet, index: usize) -> PossibleLines {
        self.narrow(allowed, index)
            .unwrap_or_else(|| self.clone())
    }

    /// Keep only the lines with `ch` at `index`.
    #[must_use]
    pub fn filter_char(&self, ch: char, index: usize) -> PossibleLines {
        self.filter(CharSet::single(ch), index)
    }

    /// The workhorse behind `filter`; returns `None` if nothing would be removed.
    fn narrow(&self, allowed: CharSet, index: usize) -> Option<PossibleLines> {
        if allowed.is_full() {
            return None;
        }

        match self {
            PossibleLines::Impossible(_) => None,
            PossibleLines::Words {
                num_letters,
                preferred,
                obscure,
            } => {
                if allowed.has_all_letters() {
                    return None;
                }
                retain_words(*num_letters, preferred, obscure, |word| {
                    allowed.contains(word.as_bytes()[index] as char)
                })
            }
            PossibleLines::BlockBefore(inner) => {
                if index == 0 {
                    self.block_survives(allowed)
                } else {
                    inner
                        .narrow(allowed, index - 1)
                        .map(PossibleLines::block_before)
                }
            }
            PossibleLines::BlockAfter(inner) => {
                if index == inner.num_letters() {
                    self.block_survives(allowed)
                } else {
                    inner.narrow(allowed, index).map(PossibleLines::block_after)
                }
            }
            PossibleLines::BlockBetween(block_between) => {
                let split = block_between.first.num_letters();
                let narrowed = match index.cmp(&split) {
                    Ordering::Equal => return self.block_survives(allowed),
                    Ordering::Less => PossibleLines::block_between(
                        block_between.first.narrow(allowed, index)?,
                        block_between.second.clone(),
                    ),
                    Ordering::Greater => PossibleLines::block_between(
                        block_between.first.clone(),
                        block_between.second.narrow(allowed, index - split - 1)?,
                    ),
                };
                Some(narrowed.settle())
            }
            PossibleLines::Compound(compound) => {
                let mut changed = false;
                let options: Vec<PossibleLines> = compound
                    .options
                    .iter()
                    .map(|option| match option.narrow(allowed, index) {
                        Some(narrowed) => {
                            changed = true;
                            narrowed
                        }
                        None => option.clone(),
                    })
                    .collect();
                if !changed {
                    return None;
                }
                Some(PossibleLines::compound(compound.num_letters, options).settle())
            }
            PossibleLines::Definite(line) => {
                if allowed.contains(line.char_at(index)) {
                    None
                } else {
                    Some(PossibleLines::Impossible(line.num_letters()))
                }
            }
        }
    }

    fn block_survives(&self, allowed: CharSet) -> Option<PossibleLines> {
        if allowed.contains(BLOCK) {
            None
        } else {
            Some(PossibleLines::Impossible(self.num_letters()))
        }
    }

    /// Once a structured value has been narrowed far enough, enumerating it outright is cheaper
    /// than carrying the structure around.
    fn settle(self) -> PossibleLines {
        let should_materialize = match &self {
            PossibleLines::BlockBetween(block_between) => {
                block_between.max < MATERIALIZE_BLOCK_BETWEEN_BELOW
            }
            PossibleLines::Compound(compound) => {
                compound.max <= MATERIALIZE_COMPOUND_AT_MOST
                    && compound
                        .options
                        .iter()
                        .any(|option| !matches!(option, PossibleLines::Definite(_)))
            }
            _ => false,
        };

        if should_materialize {
            self.materialize()
        } else {
            self
        }
    }

    /// Expand into a flat `Compound` of the distinct concrete lines this value produces.
    fn materialize(&self) -> PossibleLines {
        let mut seen = HashSet::new();
        let lines: Vec<PossibleLines> = self
            .iterate()
            .filter(|line| seen.insert(line.line.clone()))
            .map(PossibleLines::definite)
            .collect();
        PossibleLines::compound(self.num_letters(), lines)
    }

    /// Drop every line that uses `word`.
    #[must_use]
    pub fn remove_word_option(&self, word: &str) -> PossibleLines {
        self.without_word(word).unwrap_or_else(|| self.clone())
    }

    /// Drop every line that uses any of `words`.
    #[must_use]
    pub fn remove_word_options(&self, words: &[impl AsRef<str>]) -> PossibleLines {
        let mut current = self.clone();
        for word in words {
            if let Some(narrowed) = current.without_word(word.as_ref()) {
                current = narrowed;
            }
        }
        current
    }

    fn without_word(&self, word: &str) -> Option<PossibleLines> {
        match self {
            PossibleLines::Impossible(_) => None,
            PossibleLines::Words {
                num_letters,
                preferred,
                obscure,
            } => {
                if word.len() != *num_letters {
                    return None;
                }
                retain_words(*num_letters, preferred, obscure, |candidate| {
                    &**candidate != word
                })
            }
            PossibleLines::BlockBefore(inner) => {
                inner.without_word(word).map(PossibleLines::block_before)
            }
            PossibleLines::BlockAfter(inner) => {
                inner.without_word(word).map(PossibleLines::block_after)
            }
            PossibleLines::BlockBetween(block_between) => {
                let first = block_between.first.without_word(word);
                let second = block_between.second.without_word(word);
                if first.is_none() && second.is_none() {
                    return None;
                }
                Some(PossibleLines::block_between(
                    first.unwrap_or_else(|| block_between.first.clone()),
                    second.unwrap_or_else(|| block_between.second.clone()),
                ))
            }
            PossibleLines::Compound(compound) => {
                if word.len() > compound.num_letters {
                    return None;
                }
                let mut changed = false;
                let options: Vec<PossibleLines> = compound
                    .options
                    .iter()
                    .map(|option| match option.without_word(word) {
                        Some(narrowed) => {
                            changed = true;
                            narrowed
                        }
                        None => option.clone(),
                    })
                    .collect();
                if !changed {
                    return None;
                }
                Some(PossibleLines::compound(compound.num_letters, options))
            }
            PossibleLines::Definite(line) => {
                if line.words.iter().any(|candidate| &**candidate == word) {
                    Some(PossibleLines::Impossible(line.num_letters()))
                } else {
                    None
                }
            }
        }
    }

    /// Lazily enumerate the concrete lines this value produces. `Words` yields preferred words
    /// before obscure ones, and `BlockBetween` skips pairs that would use a word twice.
    #[must_use]
    pub fn iterate(&self) -> LineIter {
        match self {
            PossibleLines::Impossible(_) => Box::new(std::iter::empty()),
            PossibleLines::Words {
                preferred, obscure, ..
            } => Box::new(
                preferred
                    .clone()
                    .into_words()
                    .chain(obscure.clone().into_words())
                    .map(|word| ConcreteLine::from_word(&word)),
            ),
            PossibleLines::BlockBefore(inner) => {
                Box::new(inner.iterate().map(ConcreteLine::with_block_before))
            }
            PossibleLines::BlockAfter(inner) => {
                Box::new(inner.iterate().map(ConcreteLine::with_block_after))
            }
            PossibleLines::BlockBetween(block_between) => {
                let rest = block_between.second.clone();
                Box::new(block_between.first.iterate().flat_map(move |first| {
                    rest.iterate().filter_map(move |second| {
                        if first.shares_word_with(&second) {
                            None
                        } else {
                            Some(ConcreteLine::joined(&first, second))
                        }
                    })
                }))
            }
            PossibleLines::Compound(compound) => {
                let options = compound.options.clone();
                Box::new(options.into_iter().flat_map(|option| option.iterate()))
            }
            PossibleLines::Definite(line) => Box::new(std::iter::once(line.as_ref().clone())),
        }
    }

    /// The first line `iterate` would produce, if any.
    #[must_use]
    pub fn first(&self) -> Option<ConcreteLine> {
        self.iterate().next()
    }

    /// Split this value into two non-empty parts whose `max_possibilities` sum to ours, so that a
    /// search can explore one part and keep the other for later.
    ///
    /// # Panics
    ///
    /// Panics if there's at most one possibility left, since there's nothing to split.
    #[must_use]
    pub fn make_choice(&self) -> ChoiceStep {
        let max = self.max_possibilities();
        assert!(
            max > 1,
            "make_choice needs more than one possibility, {self:?} has {max}"
        );

        match self {
            PossibleLines::Impossible(_) | PossibleLines::Definite(_) => {
                unreachable!("{self:?} can't have more than one possibility")
            }
            PossibleLines::Words {
                num_letters,
                preferred,
                obscure,
            } => {
                // Halving both lists would leave an empty half here.
                if preferred.len() == 1 && obscure.len() == 1 {
                    return ChoiceStep {
                        choice: PossibleLines::from_word_slices(
                            *num_letters,
                            preferred.clone(),
                            WordSlice::empty(),
                        ),
                        remaining: PossibleLines::from_word_slices(
                            *num_letters,
                            WordSlice::empty(),
                            obscure.clone(),
                        ),
                    };
                }
                let (preferred_choice, preferred_remaining) = preferred.split_half();
                let (obscure_choice, obscure_remaining) = obscure.split_half();
                ChoiceStep {
                    choice: PossibleLines::from_word_slices(
                        *num_letters,
                        preferred_choice,
                        obscure_choice,
                    ),
                    remaining: PossibleLines::from_word_slices(
                        *num_letters,
                        preferred_remaining,
                        obscure_remaining,
                    ),
                }
            }
            PossibleLines::BlockBefore(inner) => {
                let step = inner.make_choice();
                ChoiceStep {
                    choice: PossibleLines::block_before(step.choice),
                    remaining: PossibleLines::block_before(step.remaining),
                }
            }
            PossibleLines::BlockAfter(inner) => {
                let step = inner.make_choice();
                ChoiceStep {
                    choice: PossibleLines::block_after(step.choice),
                    remaining: PossibleLines::block_after(step.remaining),
                }
            }
            PossibleLines::BlockBetween(block_between) => {
                let first = &block_between.first;
                let second = &block_between.second;
                if first.max_possibilities() > 1 {
                    let step = first.make_choice();
                    ChoiceStep {
                        choice: PossibleLines::block_between(step.choice, second.clone()),
                        remaining: PossibleLines::block_between(step.remaining, second.clone()),
                    }
                } else {
                    let step = second.make_choice();
                    ChoiceStep {
                        choice: PossibleLines::block_between(first.clone(), step.choice),
                        remaining: PossibleLines::block_between(first.clone(), step.remaining),
                    }
                }
            }
            PossibleLines::Compound(compound) => {
                let mid = compound.options.len() / 2;
                ChoiceStep {
                    choice: PossibleLines::compound(
                        compound.num_letters,
                        compound.options[..mid].to_vec(),
                    ),
                    remaining: PossibleLines::compound(
                        compound.num_letters,
                        compound.options[mid..].to_vec(),
                    ),
                }
            }
        }
    }
}

fn retain_words(
    num_letters: usize,
    preferred: &WordSlice,
    obscure: &WordSlice,
    keep: impl Fn(&Word) -> bool,
) -> Option<PossibleLines> {
    let narrowed_preferred = preferred.retain(&keep);
    let narrowed_obscure = obscure.retain(&keep);
    if narrowed_preferred.is_none() && narrowed_obscure.is_none() {
        return None;
    }
    Some(PossibleLines::from_word_slices(
        num_letters,
        narrowed_preferred.unwrap_or_else(|| preferred.clone()),
        narrowed_obscure.unwrap_or_else(|| obscure.clone()),
    ))
}
