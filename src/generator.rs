//! The public entry point: a `Generator` owns a word list, a memoized line universe, and a seeded
//! random number generator, and hands out lazy iterators over filled grids.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info};

use crate::backtracking_search::{GridState, PossibleGrids, SearchSettings};
use crate::error::{GenerateError, GenerateResult};
use crate::grid_config::{compile_template, parse_template, GeneratorConfig, TemplateCell};
use crate::line_universe::LineUniverse;
use crate::possible_lines::PossibleLines;
use crate::word_list::WordList;

/// A crossword grid generator for one grid size and dictionary.
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    word_list: Arc<WordList>,
    universe: LineUniverse,
    rng: SmallRng,
}

impl Generator {
    /// Build a generator, validating the config.
    pub fn new(config: GeneratorConfig, word_list: WordList) -> GenerateResult<Generator> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let word_list = Arc::new(word_list);
        let universe = LineUniverse::new(word_list.clone(), config.word_lengths);

        info!(
            grid_size = config.grid_size,
            words = word_list.len(),
            rejected = word_list.errors.len(),
            seed = ?config.seed,
            "created generator"
        );

        Ok(Generator {
            config,
            word_list,
            universe,
            rng,
        })
    }

    /// Build a generator with default settings from raw common and obscure word lists.
    pub fn create(
        grid_size: usize,
        common: &[impl AsRef<str>],
        obscure: &[impl AsRef<str>],
    ) -> GenerateResult<Generator> {
        let word_list = WordList::new(common, obscure, &[] as &[&str], Some(grid_size));
        Generator::new(GeneratorConfig::new(grid_size), word_list)
    }

    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[must_use]
    pub fn word_list(&self) -> &WordList {
        &self.word_list
    }

    /// Every legal fill of an unconstrained line of `length` cells, which must be between 1 and
    /// the grid size.
    pub fn all_possible_lines(&mut self, length: usize) -> GenerateResult<PossibleLines> {
        let grid_size = self.config.grid_size;
        if length == 0 || length > grid_size {
            return Err(GenerateError::LineLengthOutOfRange { length, grid_size });
        }
        Ok(self.universe.all_possible_lines(length, &mut self.rng))
    }

    /// Iterate over every distinct grid the dictionary allows.
    pub fn possible_grids(&mut self) -> PossibleGrids {
        let size = self.config.grid_size;
        let lines = self.universe.all_possible_lines(size, &mut self.rng);
        self.search(GridState::new(vec![lines.clone(); size], vec![lines; size]))
    }

    /// Iterate over the grids whose rows match the given templates. Each template has one
    /// character per cell: a letter fixes that cell, `#` makes it a block, and a space or `.`
    /// leaves it open. The column templates are read off the same cells.
    ///
    /// With `allow_extra_blocks`, open cells may also become blocks; otherwise every block in the
    /// result comes from the templates.
    pub fn possible_grids_with_constraints(
        &mut self,
        rows: &[impl AsRef<str>],
        allow_extra_blocks: bool,
    ) -> GenerateResult<PossibleGrids> {
        let size = self.config.grid_size;
        if rows.len() != size {
            return Err(GenerateError::ConstraintRowCount {
                expected: size,
                actual: rows.len(),
            });
        }

        let cells = rows
            .iter()
            .map(|row| parse_template(row.as_ref(), size))
            .collect::<GenerateResult<Vec<Vec<TemplateCell>>>>()?;

        let across: Vec<PossibleLines> = cells
            .iter()
            .map(|row| self.compile(row, allow_extra_blocks))
            .collect();
        let down: Vec<PossibleLines> = (0..size)
            .map(|col| {
                let column: Vec<TemplateCell> = cells.iter().map(|row| row[col]).collect();
                self.compile(&column, allow_extra_blocks)
            })
            .collect();

        debug!(
            across = ?across.iter().map(PossibleLines::max_possibilities).collect::<Vec<_>>(),
            down = ?down.iter().map(PossibleLines::max_possibilities).collect::<Vec<_>>(),
            "compiled constraints"
        );

        Ok(self.search(GridState::new(across, down)))
    }

    /// Iterate over the legal full-width lines matching a single template, with blocks allowed in
    /// its open cells.
    pub fn compatible_lines(
        &mut self,
        template: &str,
    ) -> GenerateResult<impl Iterator<Item = String>> {
        let cells = parse_template(template, self.config.grid_size)?;
        Ok(self.compile(&cells, true).iterate().map(|line| line.line))
    }

    fn compile(&mut self, cells: &[TemplateCell], allow_extra_blocks: bool) -> PossibleLines {
        compile_template(cells, allow_extra_blocks, &mut self.universe, &mut self.rng)
    }

    fn search(&mut self, state: GridState) -> PossibleGrids {
        let rng = SmallRng::seed_from_u64(self.rng.gen());
        PossibleGrids::new(state, SearchSettings::from(&self.config), rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    use crate::error::GenerateError;
    use crate::generator::Generator;
    use crate::grid_config::{GeneratorConfig, WordLengthBounds};
    use crate::word_list::WordList;

    const SMALL: [&str; 6] = ["cab", "ore", "wed", "cow", "are", "bed"];
    const LARGE: [&str; 8] = ["abc", "defg", "hijk", "lmn", "dhl", "aeim", "bfjn", "cgk"];

    fn seeded(grid_size: usize, words: &[&str], seed: u64) -> Generator {
        let config = GeneratorConfig {
            seed: Some(seed),
            ..GeneratorConfig::new(grid_size)
        };
        Generator::new(config, WordList::from_words(words, &[] as &[&str])).unwrap()
    }

    fn reprs(grids: impl Iterator<Item = crate::backtracking_search::FinalGrid>) -> HashSet<String> {
        grids.map(|grid| grid.repr()).collect()
    }

    /// Every 3x3 grid with dictionary rows and columns and no repeated words, found by trying
    /// every combination of rows.
    fn brute_force_3x3(words: &[&str]) -> HashSet<String> {
        let dictionary: HashSet<&str> = words.iter().copied().filter(|w| w.len() == 3).collect();
        let mut found = HashSet::new();
        for &a in &dictionary {
            for &b in &dictionary {
                for &c in &dictionary {
                    let rows = [a, b, c];
                    let columns: Vec<String> = (0..3)
                        .map(|col| rows.iter().map(|row| row.as_bytes()[col] as char).collect())
                        .collect();
                    if !columns.iter().all(|column| dictionary.contains(column.as_str())) {
                        continue;
                    }
                    let all: HashSet<&str> = rows
                        .iter()
                        .copied()
                        .chain(columns.iter().map(String::as_str))
                        .collect();
                    if all.len() == 6 {
                        found.insert(rows.join("\n"));
                    }
                }
            }
        }
        found
    }

    #[test]
    fn test_no_grids_for_incompatible_words() {
        let mut generator = Generator::create(3, &["cat", "dog", "ant"], &[] as &[&str]).unwrap();
        assert_eq!(generator.possible_grids().count(), 0);
    }

    #[test]
    fn test_small_grid_matches_brute_force() {
        let mut generator = seeded(3, &SMALL, 1);
        let found = reprs(generator.possible_grids());

        assert_eq!(found, brute_force_3x3(&SMALL));
        assert_eq!(
            found,
            HashSet::from(["cab\nore\nwed".to_string(), "cow\nare\nbed".to_string()])
        );
    }

    #[test]
    fn test_grid_with_blocks() {
        let mut generator = seeded(4, &LARGE, 2);
        let grids: Vec<_> = generator.possible_grids().collect();

        assert!(grids.iter().all(|grid| grid.check(0.35).is_ok()));
        assert_eq!(
            reprs(grids.into_iter()),
            HashSet::from([
                "#abc\ndefg\nhijk\nlmn#".to_string(),
                "#dhl\naeim\nbfjn\ncgk#".to_string(),
            ])
        );
    }

    #[test]
    fn test_obscure_words_are_still_used() {
        let mut generator = Generator::create(3, &SMALL[..3], &SMALL[3..]).unwrap();
        assert_eq!(reprs(generator.possible_grids()), brute_force_3x3(&SMALL));
    }

    #[test]
    fn test_constrained_row() {
        let mut generator = seeded(3, &SMALL, 3);
        let grids: Vec<_> = generator
            .possible_grids_with_constraints(&["cab", "   ", "..."], true)
            .unwrap()
            .collect();

        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].across(), &["cab", "ore", "wed"]);
        assert_eq!(grids[0].down(), vec!["cow", "are", "bed"]);
    }

    /// Every three-letter word over `a`-`f`, plus random four- and five-letter words over the same
    /// letters until there are `count` entries.
    fn dense_dictionary(seed: u64, count: usize) -> Vec<String> {
        let letters = ['a', 'b', 'c', 'd', 'e', 'f'];
        let mut words = vec![];
        for a in letters {
            for b in letters {
                for c in letters {
                    words.push(String::from_iter([a, b, c]));
                }
            }
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        while words.len() < count {
            let length = rng.gen_range(4..=5);
            words.push((0..length).map(|_| letters[rng.gen_range(0..6)]).collect());
        }
        words
    }

    #[test]
    fn test_constrained_row_larger_grid() {
        let words = dense_dictionary(12, 1500);
        let fixed = words
            .iter()
            .find(|word| word.len() == 5)
            .unwrap()
            .clone();

        let mut generator = Generator::create(5, &words, &[] as &[&str]).unwrap();
        let rows = [fixed.as_str(), "     ", "     ", "     ", "     "];
        let grids: Vec<_> = generator
            .possible_grids_with_constraints(&rows, true)
            .unwrap()
            .take(5)
            .collect();

        assert!(!grids.is_empty());
        for grid in &grids {
            assert_eq!(grid.across()[0], fixed);
            assert_eq!(grid.check(0.35), Ok(()));
            assert!(grid.words().iter().all(|word| generator.word_list().contains(word)));
        }

        let grids: Vec<_> = generator.possible_grids().take(5).collect();
        assert!(!grids.is_empty());
        assert!(grids.iter().all(|grid| grid.check(0.35).is_ok()));
    }

    #[test]
    fn test_constrained_blocks() {
        let mut generator = seeded(4, &LARGE, 4);
        let found = reprs(
            generator
                .possible_grids_with_constraints(&["#   ", "    ", "    ", "   #"], false)
                .unwrap(),
        );

        assert_eq!(
            found,
            HashSet::from([
                "#abc\ndefg\nhijk\nlmn#".to_string(),
                "#dhl\naeim\nbfjn\ncgk#".to_string(),
            ])
        );

        // Without extra blocks, no grid can have a block where the templates don't.
        let mut generator = seeded(4, &LARGE, 4);
        assert_eq!(
            generator
                .possible_grids_with_constraints(&["    "; 4], false)
                .unwrap()
                .count(),
            0
        );
    }

    #[test]
    fn test_constraint_errors() {
        let mut generator = seeded(3, &SMALL, 5);

        assert_eq!(
            generator
                .possible_grids_with_constraints(&["cab", "   "], true)
                .unwrap_err(),
            GenerateError::ConstraintRowCount {
                expected: 3,
                actual: 2,
            }
        );
        assert_eq!(
            generator
                .possible_grids_with_constraints(&["c?b", "   ", "   "], true)
                .unwrap_err(),
            GenerateError::InvalidTemplateChar('?')
        );
        assert!(matches!(
            generator.possible_grids_with_constraints(&["cabs", "   ", "   "], true),
            Err(GenerateError::InvalidLineLength { .. })
        ));
    }

    #[test]
    fn test_config_errors() {
        assert_eq!(
            Generator::create(0, &SMALL, &[] as &[&str]).unwrap_err(),
            GenerateError::InvalidGridSize { size: 0, max: 25 }
        );

        let config = GeneratorConfig {
            word_lengths: WordLengthBounds {
                min: 4,
                max: Some(3),
            },
            ..GeneratorConfig::new(3)
        };
        assert!(matches!(
            Generator::new(config, WordList::from_words(&SMALL, &[] as &[&str])),
            Err(GenerateError::InvalidWordLengthBounds { .. })
        ));
    }

    #[test]
    fn test_all_possible_lines_bounds() {
        let mut generator = Generator::create(5, &["cab", "ore"], &[] as &[&str]).unwrap();

        assert_eq!(
            generator.all_possible_lines(0).unwrap_err(),
            GenerateError::LineLengthOutOfRange {
                length: 0,
                grid_size: 5,
            }
        );
        assert_eq!(
            generator.all_possible_lines(9).unwrap_err(),
            GenerateError::LineLengthOutOfRange {
                length: 9,
                grid_size: 5,
            }
        );

        assert!(generator.all_possible_lines(1).unwrap().is_impossible());
        let lines: HashSet<String> = generator
            .all_possible_lines(5)
            .unwrap()
            .iterate()
            .map(|line| line.line)
            .collect();
        assert!(lines.contains("#cab#"));
        assert!(lines.iter().all(|line| line.len() == 5));
    }

    #[test]
    fn test_compatible_lines() {
        let mut generator = seeded(4, &LARGE, 6);

        let lines: HashSet<String> = generator.compatible_lines("d   ").unwrap().collect();
        assert_eq!(
            lines,
            HashSet::from(["defg".to_string(), "dhl#".to_string()])
        );

        let lines: HashSet<String> = generator.compatible_lines("#   ").unwrap().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|line| line.starts_with('#')));

        assert!(generator.compatible_lines("abcde").is_err());
    }

    #[test]
    fn test_grids_are_distinct() {
        let mut generator = seeded(5, &LARGE, 7);
        let grids: Vec<String> = generator.possible_grids().take(50).map(|g| g.repr()).collect();
        let distinct: HashSet<&String> = grids.iter().collect();
        assert_eq!(grids.len(), distinct.len());
    }

    #[test]
    fn test_same_seed_same_grids() {
        let run = |seed| -> Vec<String> {
            let mut generator = seeded(4, &LARGE, seed);
            generator.possible_grids().map(|grid| grid.repr()).collect()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_statistics() {
        let mut generator = seeded(3, &SMALL, 8);
        let mut grids = generator.possible_grids();
        let count = grids.by_ref().count();

        let statistics = grids.statistics();
        assert_eq!(statistics.grids_emitted, count);
        assert!(statistics.states >= count);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let mut generator = seeded(3, &SMALL, 10);
        let grid = generator.possible_grids().next().unwrap();

        let json = serde_json::to_string(&grid).unwrap();
        let parsed: crate::backtracking_search::FinalGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, grid);

        let config = generator.config().clone();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
