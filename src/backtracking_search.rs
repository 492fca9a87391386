//! This module implements the grid search: a depth-first walk over grid states, where each state
//! holds a `PossibleLines` value for every row and column. At each node we propagate constraints
//! between the two axes, prune branches that are dead or malformed, and then split the most
//! constrained line, either by bisecting it with `make_choice` or by trying its candidates one
//! at a time.
//!
//! The search is exposed as a lazy iterator (`PossibleGrids`), driven by an explicit stack of
//! frames rather than recursion, so callers can take as many grids as they want and stop
//! whenever they like.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use tracing::trace;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::arc_consistency::{blocked_count, is_board_definitely_divided, is_divided, prefilter};
use crate::dupe_index::{find_duplicate, has_duplicate_definite_words, has_duplicate_words};
use crate::error::GridViolation;
use crate::grid_config::{max_blocks, GeneratorConfig};
use crate::possible_lines::{ChoiceStep, ConcreteLine, LineIter, PossibleLines};
use crate::types::Direction;
use crate::util::BLOCK;
use crate::{CHECK_INVARIANTS, LOG_FILL_PROCESS};

/// A struct tracking stats about the search process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Search nodes expanded.
    pub states: usize,
    /// Nodes, halves, and candidates abandoned.
    pub dead_ends: usize,
    pub bisections: usize,
    pub candidates: usize,
    pub grids_emitted: usize,
    /// Complete grids skipped because they'd already been emitted.
    pub duplicates_skipped: usize,
}

/// The parts of `GeneratorConfig` that the search itself needs.
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub max_blocks: usize,
    pub max_block_ratio: f64,
    pub bisect_threshold: u64,
}

impl From<&GeneratorConfig> for SearchSettings {
    fn from(config: &GeneratorConfig) -> Self {
        SearchSettings {
            max_blocks: config.max_blocks(),
            max_block_ratio: config.max_block_ratio,
            // Bisecting needs at least two possibilities to split.
            bisect_threshold: config.bisect_threshold.max(2),
        }
    }
}

/// The candidate sets for every row and column of a square grid. Across line `i` is row `i`;
/// down line `j` is column `j`, so across line `i` cell `j` is the same square as down line `j`
/// cell `i`.
#[derive(Debug, Clone)]
pub struct GridState {
    pub across: Vec<PossibleLines>,
    pub down: Vec<PossibleLines>,
}

impl GridState {
    #[must_use]
    pub fn new(across: Vec<PossibleLines>, down: Vec<PossibleLines>) -> GridState {
        GridState { across, down }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.across.len()
    }

    #[must_use]
    pub fn lines(&self, direction: Direction) -> &[PossibleLines] {
        match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        }
    }

    fn lines_mut(&mut self, direction: Direction) -> &mut [PossibleLines] {
        match direction {
            Direction::Across => &mut self.across,
            Direction::Down => &mut self.down,
        }
    }

    pub fn all_lines(&self) -> impl Iterator<Item = &PossibleLines> {
        self.across.iter().chain(&self.down)
    }

    #[must_use]
    pub fn has_dead_line(&self) -> bool {
        self.all_lines().any(PossibleLines::is_impossible)
    }

    /// Is every line down to at most one possibility?
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.all_lines().all(|line| line.max_possibilities() <= 1)
    }

    /// Are row `index` and column `index` both settled, and on the same string? That would put
    /// the same words in the grid twice.
    #[must_use]
    pub fn decided_pair_matches(&self, index: usize) -> bool {
        let across = &self.across[index];
        let down = &self.down[index];
        across.max_possibilities() == 1
            && down.max_possibilities() == 1
            && across.first().map(|line| line.line) == down.first().map(|line| line.line)
    }
}

/// A completed grid, stored as its rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FinalGrid {
    across: Vec<String>,
}

impl FinalGrid {
    /// Wrap a list of rows. Rows are expected to be `a`-`z` and `#` only, and there should be as
    /// many rows as each row has cells; `down()` and `words()` panic otherwise. Use `try_new` for
    /// rows that haven't been checked.
    #[must_use]
    pub fn new(across: Vec<String>) -> FinalGrid {
        FinalGrid { across }
    }

    /// Wrap a list of rows, rejecting them unless they form a square.
    pub fn try_new(across: Vec<String>) -> Result<FinalGrid, GridViolation> {
        check_square(&across)?;
        Ok(FinalGrid { across })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.across.len()
    }

    /// The rows, top to bottom.
    #[must_use]
    pub fn across(&self) -> &[String] {
        &self.across
    }

    /// The columns, left to right.
    #[must_use]
    pub fn down(&self) -> Vec<String> {
        (0..self.size())
            .map(|col| {
                self.across
                    .iter()
                    .map(|row| row.as_bytes()[col] as char)
                    .collect()
            })
            .collect()
    }

    /// The rows joined by newlines. Two grids are the same grid exactly when their `repr`s match.
    #[must_use]
    pub fn repr(&self) -> String {
        self.across.join("\n")
    }

    /// Every word in the grid: across words top to bottom, then down words left to right.
    #[must_use]
    pub fn words(&self) -> Vec<String> {
        let down = self.down();
        self.across
            .iter()
            .chain(&down)
            .flat_map(|line| line.split(BLOCK))
            .filter(|word| !word.is_empty())
            .map(String::from)
            .collect()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.across
            .iter()
            .map(|row| row.chars().filter(|&ch| ch == BLOCK).count())
            .sum()
    }

    /// Check the structural rules every generated grid follows: square shape, no repeated words,
    /// block density, and connected open cells. Dictionary membership isn't checked here, since
    /// constrained rows can contain any words.
    pub fn check(&self, max_block_ratio: f64) -> Result<(), GridViolation> {
        let size = self.size();
        check_square(&self.across)?;

        let words = self.words();
        if let Some(word) = find_duplicate(words.iter().map(String::as_str)) {
            return Err(GridViolation::DuplicateWord(word.to_string()));
        }

        let limit = max_blocks(size, max_block_ratio);
        let blocks = self.block_count();
        if blocks > limit {
            return Err(GridViolation::TooManyBlocks { blocks, limit });
        }

        let mask: Vec<Vec<bool>> = self
            .across
            .iter()
            .map(|row| row.chars().map(|ch| ch == BLOCK).collect())
            .collect();
        if is_divided(&mask) {
            return Err(GridViolation::Disconnected);
        }

        Ok(())
    }
}

fn check_square(across: &[String]) -> Result<(), GridViolation> {
    let size = across.len();
    match across
        .iter()
        .enumerate()
        .find(|(_, line)| line.len() != size)
    {
        Some((row, line)) => Err(GridViolation::NotSquare {
            row,
            expected: size,
            actual: line.len(),
        }),
        None => Ok(()),
    }
}

impl Display for FinalGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

/// A line chosen for branching, along with the state it was chosen from.
#[derive(Debug)]
struct Branch {
    state: GridState,
    direction: Direction,
    index: usize,
    /// Definitely-blocked cell count in `state`, after propagation.
    blocked: usize,
}

enum Frame {
    /// A state that hasn't been propagated or checked yet.
    Expand {
        state: GridState,
        parent_blocked: usize,
    },
    /// A line being split in half repeatedly; `remaining` is the part not yet explored.
    Bisect {
        branch: Branch,
        remaining: PossibleLines,
    },
    /// A line whose candidates are being tried one by one.
    Enumerate {
        branch: Branch,
        candidates: LineIter,
    },
}

/// A lazy iterator over the distinct grids reachable from an initial state.
pub struct PossibleGrids {
    stack: Vec<Frame>,
    rng: SmallRng,
    settings: SearchSettings,
    seen: HashSet<String>,
    statistics: Statistics,
}

impl Debug for PossibleGrids {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PossibleGrids")
            .field("depth", &self.stack.len())
            .field("settings", &self.settings)
            .field("seen", &format!("({} grids)", self.seen.len()))
            .field("statistics", &self.statistics)
            .finish()
    }
}

impl PossibleGrids {
    #[must_use]
    pub fn new(initial: GridState, settings: SearchSettings, rng: SmallRng) -> PossibleGrids {
        PossibleGrids {
            stack: vec![Frame::Expand {
                state: initial,
                parent_blocked: 0,
            }],
            rng,
            settings,
            seen: HashSet::new(),
            statistics: Statistics::default(),
        }
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    fn dead_end<T>(&mut self, reason: &str) -> Option<T> {
        self.statistics.dead_ends += 1;
        if LOG_FILL_PROCESS {
            trace!(depth = self.stack.len(), reason, "dead end");
        }
        None
    }

    /// Propagate and check a state. If it's a complete grid, return it; otherwise push a frame
    /// for its most constrained line.
    fn expand(&mut self, mut state: GridState, parent_blocked: usize) -> Option<FinalGrid> {
        self.statistics.states += 1;

        if state.has_dead_line() {
            return self.dead_end("impossible line");
        }

        if let Err(failure) = prefilter(&mut state.across, &mut state.down) {
            if LOG_FILL_PROCESS {
                trace!(?failure, "prefilter wiped out a line");
            }
            return self.dead_end("prefilter");
        }

        if has_duplicate_definite_words(state.all_lines()) {
            return self.dead_end("duplicate word");
        }

        let blocked = blocked_count(&state.across, &state.down);
        if blocked > self.settings.max_blocks {
            return self.dead_end("too many blocks");
        }
        if blocked > parent_blocked && is_board_definitely_divided(&state.across, &state.down) {
            return self.dead_end("divided board");
        }

        if state.is_resolved() {
            return self.finish(&state);
        }

        if (0..state.size()).any(|index| state.decided_pair_matches(index)) {
            return self.dead_end("row matches column");
        }

        let (direction, index) = self.choose_branch(&state)?;
        let line = state.lines(direction)[index].clone();
        if LOG_FILL_PROCESS {
            trace!(
                depth = self.stack.len(),
                ?direction,
                index,
                max_possibilities = line.max_possibilities(),
                blocked,
                "branching"
            );
        }

        let branch = Branch {
            state,
            direction,
            index,
            blocked,
        };
        if line.max_possibilities() >= self.settings.bisect_threshold {
            self.stack.push(Frame::Bisect {
                branch,
                remaining: line,
            });
        } else {
            self.stack.push(Frame::Enumerate {
                branch,
                candidates: line.iterate(),
            });
        }
        None
    }

    /// Turn a resolved state into a grid, if it really is a valid one we haven't emitted yet.
    fn finish(&mut self, state: &GridState) -> Option<FinalGrid> {
        let across: Option<Vec<ConcreteLine>> = state.across.iter().map(PossibleLines::first).collect();
        let down: Option<Vec<ConcreteLine>> = state.down.iter().map(PossibleLines::first).collect();
        let (Some(across), Some(down)) = (across, down) else {
            return self.dead_end("empty line");
        };

        if across.iter().zip(&down).any(|(row, column)| row.line == column.line) {
            return self.dead_end("row matches column");
        }

        let crossings_agree = across.iter().enumerate().all(|(row, across_line)| {
            down.iter()
                .enumerate()
                .all(|(col, down_line)| across_line.char_at(col) == down_line.char_at(row))
        });
        if !crossings_agree {
            return self.dead_end("crossing mismatch");
        }

        if has_duplicate_words(across.iter().chain(&down)) {
            return self.dead_end("duplicate word");
        }

        let grid = FinalGrid::new(across.into_iter().map(|line| line.line).collect());

        if CHECK_INVARIANTS {
            if let Err(violation) = grid.check(self.settings.max_block_ratio) {
                panic!("Search produced an invalid grid ({violation}):\n{grid}");
            }
        }

        if !self.seen.insert(grid.repr()) {
            self.statistics.duplicates_skipped += 1;
            return None;
        }

        self.statistics.grids_emitted += 1;
        Some(grid)
    }

    /// Pick the unresolved line with the fewest possibilities, breaking ties at random. Down lines
    /// win ties between the axes.
    fn choose_branch(&mut self, state: &GridState) -> Option<(Direction, usize)> {
        let down = self.narrowest_line(&state.down);
        let across = self.narrowest_line(&state.across);

        match (down, across) {
            (Some((down_index, down_max)), Some((across_index, across_max))) => {
                if down_max <= across_max {
                    Some((Direction::Down, down_index))
                } else {
                    Some((Direction::Across, across_index))
                }
            }
            (Some((index, _)), None) => Some((Direction::Down, index)),
            (None, Some((index, _))) => Some((Direction::Across, index)),
            (None, None) => None,
        }
    }

    fn narrowest_line(&mut self, lines: &[PossibleLines]) -> Option<(usize, u64)> {
        let min = lines
            .iter()
            .map(PossibleLines::max_possibilities)
            .filter(|&max| max > 1)
            .min()?;
        let tied: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.max_possibilities() == min)
            .map(|(index, _)| index)
            .collect();
        tied.choose(&mut self.rng).map(|&index| (index, min))
    }

    fn step_bisect(&mut self, branch: Branch, remaining: PossibleLines) {
        match remaining.max_possibilities() {
            0 => {}
            1 => self.stack.push(Frame::Enumerate {
                candidates: remaining.iterate(),
                branch,
            }),
            _ => {
                self.statistics.bisections += 1;
                let ChoiceStep { choice, remaining } = remaining.make_choice();
                let child = self.substitute(&branch, choice);
                let parent_blocked = branch.blocked;
                self.stack.push(Frame::Bisect { branch, remaining });
                if let Some(state) = child {
                    self.stack.push(Frame::Expand {
                        state,
                        parent_blocked,
                    });
                }
            }
        }
    }

    /// Replace the branch line with one half of it.
    fn substitute(&mut self, branch: &Branch, half: PossibleLines) -> Option<GridState> {
        let mut state = branch.state.clone();
        state.lines_mut(branch.direction)[branch.index] = half;

        if state.decided_pair_matches(branch.index) {
            return self.dead_end("row matches column");
        }
        if blocked_count(&state.across, &state.down) > branch.blocked
            && is_board_definitely_divided(&state.across, &state.down)
        {
            return self.dead_end("divided board");
        }

        Some(state)
    }

    fn step_enumerate(&mut self, branch: Branch, mut candidates: LineIter) {
        let Some(candidate) = candidates.next() else {
            return;
        };

        let child = self.apply_candidate(&branch, &candidate);
        let parent_blocked = branch.blocked;
        self.stack.push(Frame::Enumerate { branch, candidates });
        if let Some(state) = child {
            self.stack.push(Frame::Expand {
                state,
                parent_blocked,
            });
        }
    }

    /// Fix the branch line to `candidate`, pushing its letters and words into every other line.
    fn apply_candidate(&mut self, branch: &Branch, candidate: &ConcreteLine) -> Option<GridState> {
        self.statistics.candidates += 1;

        if candidate.has_duplicate_words() {
            return self.dead_end("candidate repeats a word");
        }

        let (direction, index) = (branch.direction, branch.index);
        let words = candidate.words.as_slice();
        let mut state = branch.state.clone();

        for (position, line) in state.lines_mut(direction.opposite()).iter_mut().enumerate() {
            let narrowed = line
                .remove_word_options(words)
                .filter_char(candidate.char_at(position), index);
            if narrowed.is_impossible() {
                return self.dead_end("candidate wipes out a crossing line");
            }
            if narrowed.max_possibilities() == 1
                && narrowed
                    .first()
                    .is_some_and(|line| line.line == candidate.line)
            {
                return self.dead_end("crossing line repeats candidate");
            }
            *line = narrowed;
        }

        for (position, line) in state.lines_mut(direction).iter_mut().enumerate() {
            *line = if position == index {
                PossibleLines::definite(candidate.clone())
            } else {
                line.remove_word_options(words)
            };
        }

        if (0..state.size()).any(|position| state.decided_pair_matches(position)) {
            return self.dead_end("row matches column");
        }

        Some(state)
    }
}

impl Iterator for PossibleGrids {
    type Item = FinalGrid;

    fn next(&mut self) -> Option<FinalGrid> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Expand {
                    state,
                    parent_blocked,
                } => {
                    if let Some(grid) = self.expand(state, parent_blocked) {
                        return Some(grid);
                    }
                }
                Frame::Bisect { branch, remaining } => self.step_bisect(branch, remaining),
                Frame::Enumerate { branch, candidates } => {
                    self.step_enumerate(branch, candidates);
                }
            }
        }
        None
    }
}
