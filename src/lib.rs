#![allow(clippy::module_name_repetitions)]

//! `crossgen_core` generates filled crossword grids from a word list. Every row and column is
//! described by a lazily evaluated set of possible lines (`possible_lines`), built once per length
//! and shared (`line_universe`), optionally narrowed by per-line templates (`grid_config`), and
//! then searched with propagation and pruning (`arc_consistency`, `backtracking_search`). The
//! `generator` module ties these together behind a small API.

pub mod arc_consistency;
pub mod backtracking_search;
pub mod dupe_index;
pub mod error;
pub mod generator;
pub mod grid_config;
pub mod line_universe;
pub mod possible_lines;
pub mod types;
pub mod util;
pub mod word_list;

pub use backtracking_search::{FinalGrid, PossibleGrids, Statistics};
pub use error::{GenerateError, GenerateResult};
pub use generator::Generator;
pub use grid_config::GeneratorConfig;
pub use word_list::WordList;

pub const LOG_FILL_PROCESS: bool = cfg!(feature = "log_fill_process");
pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The largest grid size a generator accepts.
pub const MAX_GRID_SIZE: usize = 25;

/// The expected maximum number of words in a single line. This only sizes inline storage; longer
/// lines spill to the heap.
pub const MAX_WORDS_PER_LINE: usize = 4;
