//! Error type shared by the grid, tiling, cross-number and worker modules.
//!
//! Only malformed input and broken state invariants are errors. A search
//! branch that does not pan out is ordinary control flow and is reported
//! as `false` by the solvers.

use crate::geometry::MirrorKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("a grid needs at least one cell per side")]
    EmptyGrid,

    #[error("all sides must have the same length (left={left}, top={top}, right={right}, bottom={bottom})")]
    MismatchedSides {
        left: usize,
        top: usize,
        right: usize,
        bottom: usize,
    },

    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: i32, col: i32 },

    #[error("cell ({row}, {col}) already holds a {existing} mirror")]
    Occupied {
        row: i32,
        col: i32,
        existing: MirrorKind,
    },

    #[error("cell ({row}, {col}) touches another mirror")]
    AdjacentMirror { row: i32, col: i32 },

    #[error("cell ({row}, {col}) does not hold a {expected} mirror")]
    MissingMirror {
        row: i32,
        col: i32,
        expected: MirrorKind,
    },

    #[error("tile of side {side} at ({row}, {col}) does not fit in the square")]
    InvalidTile { side: u32, row: i32, col: i32 },

    #[error("tile of side {side} at ({row}, {col}) overlaps a placed tile")]
    TileOverlap { side: u32, row: i32, col: i32 },

    #[error("all {side} tiles of side {side} are already placed")]
    TileExhausted { side: u32 },

    #[error("expected {expected} rows, found {found}")]
    RowCount { found: usize, expected: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("cell ({row}, {col}) has an unknown mark {mark:?}")]
    InvalidCellMark { row: usize, col: usize, mark: char },

    #[error("{found} region digits given for {expected} regions")]
    RegionDigitCount { found: usize, expected: usize },

    #[error("digit {digit} is not allowed in region {region}")]
    InvalidRegionDigit { region: usize, digit: u8 },

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}
