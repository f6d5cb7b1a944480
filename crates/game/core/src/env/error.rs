//! Tile grid construction errors.
//!
//! Queries against a built grid never fail; only malformed level data is
//! rejected, and only at construction time.

use crate::error::{ErrorSeverity, GameError};

/// Errors raised while building a [`TileGrid`](super::TileGrid).
///
/// A grid must be rectangular and use a positive tile size. Anything else
/// would make out-of-range handling ambiguous, so it is refused up front.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridError {
    /// The grid has no columns or no rows.
    #[error("tile grid is empty")]
    Empty,

    /// A column is shorter or longer than the first one.
    #[error("column {column} has {found} rows (expected {expected})")]
    RaggedColumn {
        column: usize,
        expected: usize,
        found: usize,
    },

    /// A row is shorter or longer than the first one.
    #[error("row {row} has {found} columns (expected {expected})")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Tile size is zero, negative, or not finite.
    #[error("tile size {0} must be positive and finite")]
    InvalidTileSize(f64),
}

impl GameError for GridError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use GridError::*;
        match self {
            Empty => "GRID_EMPTY",
            RaggedColumn { .. } => "GRID_RAGGED_COLUMN",
            RaggedRow { .. } => "GRID_RAGGED_ROW",
            InvalidTileSize(_) => "GRID_INVALID_TILE_SIZE",
        }
    }
}
