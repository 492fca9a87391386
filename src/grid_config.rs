//! This module implements code for configuring a generator run, independent of the search itself:
//! the tunable parameters, and compiling per-line templates (from constrained rows and columns)
//! into `PossibleLines` values.

use rand::Rng;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::error::{GenerateError, GenerateResult};
use crate::line_universe::LineUniverse;
use crate::possible_lines::{ConcreteLine, PossibleLines};
use crate::util::BLOCK;
use crate::MAX_GRID_SIZE;

/// The shortest word allowed in a grid unless configured otherwise.
pub const DEFAULT_MIN_WORD_LENGTH: usize = 3;

/// The largest share of a grid's cells that may be blocks unless configured otherwise.
pub const DEFAULT_MAX_BLOCK_RATIO: f64 = 0.35;

/// Lines with at least this many possibilities are bisected with `make_choice`; smaller ones are
/// enumerated one candidate at a time.
pub const DEFAULT_BISECT_THRESHOLD: u64 = 10;

/// The grid size used by `GeneratorConfig::default()`.
pub const DEFAULT_GRID_SIZE: usize = 5;

/// Inclusive bounds on the length of words placed in a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WordLengthBounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl Default for WordLengthBounds {
    fn default() -> Self {
        WordLengthBounds {
            min: DEFAULT_MIN_WORD_LENGTH,
            max: None,
        }
    }
}

impl WordLengthBounds {
    #[must_use]
    pub fn contains(&self, length: usize) -> bool {
        length >= self.min && self.max.map_or(true, |max| length <= max)
    }

    pub fn validate(&self) -> GenerateResult<()> {
        if self.min == 0 || self.max.is_some_and(|max| max < self.min) {
            return Err(GenerateError::InvalidWordLengthBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Everything that shapes a generator run besides the word list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Width and height of the (square) grid.
    pub grid_size: usize,

    pub word_lengths: WordLengthBounds,

    /// Branches where more than this share of cells are known to be blocks are abandoned.
    pub max_block_ratio: f64,

    /// See `DEFAULT_BISECT_THRESHOLD`.
    pub bisect_threshold: u64,

    /// Seed for the generator's random number generator. Runs with the same seed, config, and
    /// word list produce the same grids in the same order; `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig::new(DEFAULT_GRID_SIZE)
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn new(grid_size: usize) -> GeneratorConfig {
        GeneratorConfig {
            grid_size,
            word_lengths: WordLengthBounds::default(),
            max_block_ratio: DEFAULT_MAX_BLOCK_RATIO,
            bisect_threshold: DEFAULT_BISECT_THRESHOLD,
            seed: None,
        }
    }

    /// The largest number of blocks a grid may contain.
    #[must_use]
    pub fn max_blocks(&self) -> usize {
        max_blocks(self.grid_size, self.max_block_ratio)
    }

    pub fn validate(&self) -> GenerateResult<()> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(GenerateError::InvalidGridSize {
                size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        self.word_lengths.validate()
    }
}

/// The largest number of blocks allowed in a `grid_size` x `grid_size` grid.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn max_blocks(grid_size: usize, max_block_ratio: f64) -> usize {
    ((grid_size * grid_size) as f64 * max_block_ratio).floor() as usize
}

/// One cell of a line template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCell {
    Unknown,
    Block,
    Letter(char),
}

impl TemplateCell {
    /// Parse a template character: a space or `.` is unknown, `#` is a block, and an ASCII
    /// letter (in either case) is that letter.
    pub fn from_char(ch: char) -> GenerateResult<TemplateCell> {
        match ch {
            ' ' | '.' => Ok(TemplateCell::Unknown),
            BLOCK => Ok(TemplateCell::Block),
            ch if ch.is_ascii_alphabetic() => Ok(TemplateCell::Letter(ch.to_ascii_lowercase())),
            ch => Err(GenerateError::InvalidTemplateChar(ch)),
        }
    }

    /// The character this cell is fixed to, if any.
    #[must_use]
    pub fn fixed_char(self) -> Option<char> {
        match self {
            TemplateCell::Unknown => None,
            TemplateCell::Block => Some(BLOCK),
            TemplateCell::Letter(ch) => Some(ch),
        }
    }
}

/// Parse a line template, which must have exactly `expected_len` cells.
pub fn parse_template(template: &str, expected_len: usize) -> GenerateResult<Vec<TemplateCell>> {
    let cells = template
        .chars()
        .map(TemplateCell::from_char)
        .collect::<GenerateResult<Vec<_>>>()?;

    if cells.len() != expected_len {
        return Err(GenerateError::InvalidLineLength {
            template: template.to_string(),
            expected: expected_len,
            actual: cells.len(),
        });
    }
    Ok(cells)
}

/// Compile a parsed template into the set of lines matching it.
///
/// If `allow_extra_blocks` is true, any legal line agreeing with the template's fixed cells
/// matches, so blocks may appear in unknown cells. Otherwise the template's blocks are the only
/// ones allowed, and each run of non-block cells must be a single word.
///
/// A template with no unknown cells always compiles to exactly that line, whether or not its words
/// are in the dictionary.
pub fn compile_template(
    cells: &[TemplateCell],
    allow_extra_blocks: bool,
    universe: &mut LineUniverse,
    rng: &mut impl Rng,
) -> PossibleLines {
    if let Some(line) = fixed_line(cells) {
        return PossibleLines::definite(line);
    }

    if allow_extra_blocks {
        let mut lines = universe.all_possible_lines(cells.len(), rng);
        for (index, cell) in cells.iter().enumerate() {
            if let Some(ch) = cell.fixed_char() {
                lines = lines.filter_char(ch, index);
            }
        }
        lines
    } else {
        compile_fixed_blocks(cells, universe, rng)
    }
}

fn fixed_line(cells: &[TemplateCell]) -> Option<ConcreteLine> {
    cells
        .iter()
        .map(|cell| cell.fixed_char())
        .collect::<Option<String>>()
        .map(ConcreteLine::new)
}

fn compile_fixed_blocks(
    cells: &[TemplateCell],
    universe: &mut LineUniverse,
    rng: &mut impl Rng,
) -> PossibleLines {
    if let Some(line) = fixed_line(cells) {
        return PossibleLines::definite(line);
    }

    let leading = cells
        .iter()
        .take_while(|&&cell| cell == TemplateCell::Block)
        .count();
    let trailing = cells[leading..]
        .iter()
        .rev()
        .take_while(|&&cell| cell == TemplateCell::Block)
        .count();
    let core = &cells[leading..cells.len() - trailing];

    let mut lines = match core.iter().position(|&cell| cell == TemplateCell::Block) {
        Some(split) => PossibleLines::block_between(
            compile_fixed_blocks(&core[..split], universe, rng),
            compile_fixed_blocks(&core[split + 1..], universe, rng),
        ),
        None => {
            let mut words = universe.words_of_length(core.len(), rng);
            for (index, cell) in core.iter().enumerate() {
                if let TemplateCell::Letter(ch) = cell {
                    words = words.filter_char(*ch, index);
                }
            }
            words
        }
    };

    for _ in 0..trailing {
        lines = PossibleLines::block_after(lines);
    }
    for _ in 0..leading {
        lines = PossibleLines::block_before(lines);
    }
    lines
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::error::GenerateError;
    use crate::grid_config::{
        compile_template, max_blocks, parse_template, GeneratorConfig, TemplateCell,
        WordLengthBounds,
    };
    use crate::line_universe::LineUniverse;
    use crate::possible_lines::PossibleLines;
    use crate::word_list::WordList;

    fn compile(template: &str, allow_extra_blocks: bool) -> PossibleLines {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut universe = LineUniverse::new(
            Arc::new(WordList::from_words(&["cab", "ore"], &["wed"])),
            WordLengthBounds::default(),
        );
        let cells = parse_template(template, template.chars().count()).unwrap();
        compile_template(&cells, allow_extra_blocks, &mut universe, &mut rng)
    }

    fn line_set(lines: &PossibleLines) -> HashSet<String> {
        lines.iterate().map(|line| line.line).collect()
    }

    fn set_of(lines: &[&str]) -> HashSet<String> {
        lines.iter().map(|&line| line.to_string()).collect()
    }

    #[test]
    fn test_parse_template() {
        assert_eq!(
            parse_template("C.#", 3),
            Ok(vec![
                TemplateCell::Letter('c'),
                TemplateCell::Unknown,
                TemplateCell::Block,
            ])
        );
        assert_eq!(
            parse_template("ab!", 3),
            Err(GenerateError::InvalidTemplateChar('!'))
        );
        assert_eq!(
            parse_template("ab", 3),
            Err(GenerateError::InvalidLineLength {
                template: "ab".into(),
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_fully_fixed_template_is_definite() {
        let lines = compile("cab#xyz", false);
        assert!(matches!(lines, PossibleLines::Definite(_)));
        assert_eq!(line_set(&lines), set_of(&["cab#xyz"]));

        let lines = compile("cab#xyz", true);
        assert_eq!(line_set(&lines), set_of(&["cab#xyz"]));
    }

    #[test]
    fn test_fixed_blocks_mode() {
        assert_eq!(line_set(&compile("   ", false)), set_of(&["cab", "ore", "wed"]));
        assert_eq!(
            line_set(&compile("#   ", false)),
            set_of(&["#cab", "#ore", "#wed"])
        );
        assert_eq!(
            line_set(&compile("  b##", false)),
            set_of(&["cab##"])
        );
        assert_eq!(
            line_set(&compile("   #   ", false)),
            set_of(&["cab#ore", "cab#wed", "ore#cab", "ore#wed", "wed#cab", "wed#ore"])
        );
        assert_eq!(line_set(&compile("c  #o  ", false)), set_of(&["cab#ore"]));

        // No blocks beyond the template's own.
        assert!(compile("    ", false).is_impossible());
        // A two-letter slot can't hold a word.
        assert!(compile("  #   ", false).is_impossible());
    }

    #[test]
    fn test_extra_blocks_mode() {
        let lines = compile("       ", true);
        let unconstrained = line_set(&lines);
        assert!(unconstrained.contains("cab#ore"));
        assert!(unconstrained.contains("##wed##"));

        let lines = line_set(&compile("c      ", true));
        assert!(lines.iter().all(|line| line.starts_with('c')));
        assert!(lines.contains("cab#ore"));
        assert!(lines.contains("cab####"));
        assert!(!lines.contains("##wed##"));

        assert_eq!(
            line_set(&compile("#   ", true)),
            set_of(&["#cab", "#ore", "#wed"])
        );
        assert_eq!(line_set(&compile("    ", true)).len(), 6);
    }

    #[test]
    fn test_config_validation() {
        assert!(GeneratorConfig::new(5).validate().is_ok());
        assert_eq!(
            GeneratorConfig::new(0).validate(),
            Err(GenerateError::InvalidGridSize { size: 0, max: 25 })
        );

        let mut config = GeneratorConfig::new(5);
        config.word_lengths = WordLengthBounds {
            min: 4,
            max: Some(3),
        };
        assert_eq!(
            config.validate(),
            Err(GenerateError::InvalidWordLengthBounds {
                min: 4,
                max: Some(3),
            })
        );
    }

    #[test]
    fn test_max_blocks() {
        assert_eq!(max_blocks(5, 0.35), 8);
        assert_eq!(max_blocks(4, 0.35), 5);
        assert_eq!(GeneratorConfig::new(15).max_blocks(), 78);
    }
}
