//! Builds, for each line length, the `PossibleLines` value describing every legal way to fill an
//! unconstrained line of that length. A line is legal if every maximal run of letters in it is a
//! dictionary word, no word appears twice, and it contains at least one word.
//!
//! The universe for length `L` is the union of:
//!
//! - the dictionary words of length `L`;
//! - a block before or after any legal line of length `L - 1`;
//! - two legal lines of lengths `i` and `L - 1 - i` joined by a block.
//!
//! Results are memoized per length, so the recursive structure is shared rather than rebuilt.
//! Word order and the order of alternatives are shuffled once per length, which is what gives
//! different generator runs different grids.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::grid_config::WordLengthBounds;
use crate::possible_lines::PossibleLines;
use crate::word_list::WordList;

/// Memoized builder for unconstrained line values.
#[derive(Debug)]
pub struct LineUniverse {
    word_list: Arc<WordList>,
    word_lengths: WordLengthBounds,
    memo: HashMap<usize, PossibleLines>,
}

impl LineUniverse {
    #[must_use]
    pub fn new(word_list: Arc<WordList>, word_lengths: WordLengthBounds) -> LineUniverse {
        LineUniverse {
            word_list,
            word_lengths,
            memo: HashMap::new(),
        }
    }

    /// A `Words` leaf with every usable dictionary word of exactly `length`, in shuffled order.
    pub fn words_of_length(&self, length: usize, rng: &mut impl Rng) -> PossibleLines {
        if !self.word_lengths.contains(length) {
            return PossibleLines::Impossible(length);
        }

        let mut preferred = self.word_list.common_words(length).to_vec();
        let mut obscure = self.word_list.obscure_words(length).to_vec();
        preferred.shuffle(rng);
        obscure.shuffle(rng);
        PossibleLines::words(length, preferred, obscure)
    }

    /// Every legal fill of an unconstrained line of `length` cells.
    pub fn all_possible_lines(&mut self, length: usize, rng: &mut impl Rng) -> PossibleLines {
        if let Some(lines) = self.memo.get(&length) {
            return lines.clone();
        }

        let lines = self.build(length, rng);
        debug!(
            length,
            max_possibilities = lines.max_possibilities(),
            "built line universe"
        );
        self.memo.insert(length, lines.clone());
        lines
    }

    fn build(&mut self, length: usize, rng: &mut impl Rng) -> PossibleLines {
        let min = self.word_lengths.min;
        if length < min {
            return PossibleLines::Impossible(length);
        }

        let mut options = vec![self.words_of_length(length, rng)];

        if length > 2 * min {
            let mut splits: Vec<PossibleLines> = (min..=length - 1 - min)
                .map(|split| {
                    let first = self.all_possible_lines(split, rng);
                    let second = self.all_possible_lines(length - 1 - split, rng);
                    PossibleLines::block_between(first, second)
                })
                .collect();
            splits.shuffle(rng);
            options.extend(splits);
        }

        if length > min {
            let shorter = self.all_possible_lines(length - 1, rng);
            let mut ends = [
                PossibleLines::block_before(shorter.clone()),
                PossibleLines::block_after(shorter),
            ];
            ends.shuffle(rng);
            options.extend(ends);
        }

        PossibleLines::compound(length, options)
    }
}
