//! This module contains the grid-level constraint propagation used at every node of the search.
//! For our purposes, propagation means:
//!
//! - For every cell, collecting the characters the crossing line could still put there (via
//!   `chars_at`) and filtering the line on the other axis down to the lines that agree. We
//!   alternate axes for a bounded number of passes, stopping early once a pass changes nothing.
//!
//! - Counting the cells that are a block in every remaining fill of their row or column, so that
//!   branches with too many blocks, or whose blocks already cut the grid into pieces, can be
//!   abandoned early.

use std::collections::VecDeque;

use crate::possible_lines::PossibleLines;
use crate::types::{Direction, GridCoord};
use crate::util::CharSet;

/// The most passes `prefilter` will make. Propagation usually settles well before this; the cap
/// keeps a single search node cheap when it doesn't.
pub const MAX_PREFILTER_PASSES: usize = 4;

/// Result from a failed call to `prefilter`, identifying the line that was wiped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefilterFailure {
    pub direction: Direction,
    pub index: usize,
}

/// Result from a call to `prefilter`: the number of passes made, or the line that became
/// impossible.
pub type PrefilterResult = Result<usize, PrefilterFailure>;

/// Narrow each axis against the characters its crossing axis allows, alternating axes and starting
/// with the across lines.
pub fn prefilter(across: &mut [PossibleLines], down: &mut [PossibleLines]) -> PrefilterResult {
    let mut direction = Direction::Across;

    for pass in 0..MAX_PREFILTER_PASSES {
        let (targets, changed) = match direction {
            Direction::Across => {
                let changed = filter_axis(across, down);
                (&*across, changed)
            }
            Direction::Down => {
                let changed = filter_axis(down, across);
                (&*down, changed)
            }
        };

        if let Some(index) = targets.iter().position(PossibleLines::is_impossible) {
            return Err(PrefilterFailure { direction, index });
        }

        if !changed && pass > 0 {
            return Ok(pass + 1);
        }
        direction = direction.opposite();
    }

    Ok(MAX_PREFILTER_PASSES)
}

/// Filter every line in `targets` by the characters allowed at each of its cells by `sources`.
/// Line `i` of `targets` crosses cell `i` of every line in `sources`. Returns whether any line's
/// possibility count went down.
fn filter_axis(targets: &mut [PossibleLines], sources: &[PossibleLines]) -> bool {
    let mut changed = false;

    for (target_index, target) in targets.iter_mut().enumerate() {
        for (cell_index, source) in sources.iter().enumerate() {
            let mut allowed = CharSet::empty();
            source.chars_at(&mut allowed, target_index);

            let before = target.max_possibilities();
            let filtered = target.filter(allowed, cell_index);
            if filtered.max_possibilities() != before {
                changed = true;
            }
            *target = filtered;

            if target.is_impossible() {
                return true;
            }
        }
    }

    changed
}

/// Count the cells that are a block in every remaining fill of their row or of their column.
#[must_use]
pub fn blocked_count(across: &[PossibleLines], down: &[PossibleLines]) -> usize {
    blocked_cells(across, down)
        .iter()
        .map(|row| row.iter().filter(|&&cell| cell).count())
        .sum()
}

/// Build a row-major mask of the cells that are definitely blocked. A cell counts if either the
/// row or the column crossing it is sure to put a block there, since the two axes may not have
/// been filtered against each other yet.
#[must_use]
pub fn blocked_cells(across: &[PossibleLines], down: &[PossibleLines]) -> Vec<Vec<bool>> {
    across
        .iter()
        .enumerate()
        .map(|(row, across_line)| {
            down.iter()
                .enumerate()
                .map(|(col, down_line)| {
                    down_line.definitely_blocked_at(row) || across_line.definitely_blocked_at(col)
                })
                .collect()
        })
        .collect()
}

/// Do the definitely-blocked cells already make a well-formed grid impossible?
#[must_use]
pub fn is_board_definitely_divided(across: &[PossibleLines], down: &[PossibleLines]) -> bool {
    is_divided(&blocked_cells(across, down))
}

/// Given a square, row-major block mask, is any row or column entirely blocked, or are the open
/// cells split into more than one 4-connected region?
#[must_use]
pub fn is_divided(blocked: &[Vec<bool>]) -> bool {
    let size = blocked.len();

    if blocked.iter().any(|row| row.iter().all(|&cell| cell)) {
        return true;
    }
    if (0..size).any(|col| blocked.iter().all(|row| row[col])) {
        return true;
    }

    let open_count = blocked
        .iter()
        .map(|row| row.iter().filter(|&&cell| !cell).count())
        .sum::<usize>();

    let start = (0..size)
        .flat_map(|row| (0..size).map(move |col| (row, col)))
        .find(|&(row, col)| !blocked[row][col]);
    let Some(start) = start else {
        return true;
    };

    let mut visited = vec![vec![false; size]; size];
    let mut queue: VecDeque<GridCoord> = VecDeque::from([start]);
    visited[start.0][start.1] = true;
    let mut reached = 0;

    while let Some((row, col)) = queue.pop_front() {
        reached += 1;

        let neighbors = [
            (row.wrapping_sub(1), col),
            (row + 1, col),
            (row, col.wrapping_sub(1)),
            (row, col + 1),
        ];
        for (next_row, next_col) in neighbors {
            if next_row >= size || next_col >= size {
                continue;
            }
            if blocked[next_row][next_col] || visited[next_row][next_col] {
                continue;
            }
            visited[next_row][next_col] = true;
            queue.push_back((next_row, next_col));
        }
    }

    reached < open_count
}
