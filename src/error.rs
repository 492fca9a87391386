//! Error types for the generator's public entry points.

use thiserror::Error;

/// Errors raised when the caller hands the generator input of the wrong shape. Running out of
/// grids is never an error; the grid iterator just ends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("grid size must be between 1 and {max}, got {size}")]
    InvalidGridSize { size: usize, max: usize },

    #[error("expected {expected} constraint rows, got {actual}")]
    ConstraintRowCount { expected: usize, actual: usize },

    #[error("template “{template}” has {actual} cells, expected {expected}")]
    InvalidLineLength {
        template: String,
        expected: usize,
        actual: usize,
    },

    #[error("line length must be between 1 and the grid size {grid_size}, got {length}")]
    LineLengthOutOfRange { length: usize, grid_size: usize },

    #[error("unsupported template character {0:?}")]
    InvalidTemplateChar(char),

    #[error("invalid word length bounds: min {min}, max {max:?}")]
    InvalidWordLengthBounds { min: usize, max: Option<usize> },
}

/// Result type for generator entry points.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Ways a finished grid can fail validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridViolation {
    #[error("grid is not square: row {row} has {actual} cells, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("word “{0}” appears more than once")]
    DuplicateWord(String),

    #[error("grid has {blocks} blocks, the limit is {limit}")]
    TooManyBlocks { blocks: usize, limit: usize },

    #[error("open cells are split into disconnected regions")]
    Disconnected,
}
