//! Published puzzle instances.
//!
//! - `MIRRORS_5` and `MIRRORS_10`: the Hall of Mirrors example and full grids
//! - `ONES_CONFIGS`: the nine partial partridge tilings of "some ones
//!   somewhere", laid out as a 3x3 board of 45x45 squares
//! - `CROSS_5` and `CROSS_11`: the cross-number example and full grids

use log::info;

use crate::cross_grid::CrossGrid;
use crate::cross_predicates::RowPredicate;
use crate::error::PuzzleError;
use crate::grid::{MirrorGrid, Number};
use crate::tiling::{Partridge9, SquareTile};
use crate::tiling_solver::TilingSolver;
use crate::workers::{fan_out, WorkerId};

/// The four boundary sides of a mirror puzzle, 0 for unknown.
#[derive(Clone, Copy, Debug)]
pub struct MirrorInstance {
    pub left: &'static [Number],
    pub top: &'static [Number],
    pub right: &'static [Number],
    pub bottom: &'static [Number],
}

impl MirrorInstance {
    pub fn grid(&self) -> Result<MirrorGrid, PuzzleError> {
        MirrorGrid::new(self.left, self.top, self.right, self.bottom)
    }
}

pub const MIRRORS_5: MirrorInstance = MirrorInstance {
    left: &[0, 0, 0, 16, 0],
    top: &[0, 0, 9, 0, 0],
    right: &[0, 75, 0, 0, 0],
    bottom: &[0, 0, 36, 0, 0],
};

pub const MIRRORS_10: MirrorInstance = MirrorInstance {
    left: &[0, 0, 0, 27, 0, 0, 0, 12, 225, 0],
    top: &[0, 0, 112, 0, 48, 3087, 9, 0, 0, 1],
    right: &[0, 4, 27, 0, 0, 0, 16, 0, 0, 0],
    bottom: &[2025, 0, 0, 12, 64, 5, 0, 405, 0, 0],
};

/// Row rules, region marks and highlighted cells of a cross-number grid.
#[derive(Clone, Copy, Debug)]
pub struct CrossInstance {
    pub predicates: &'static [RowPredicate],
    pub regions: &'static [&'static str],
    pub highlighted: &'static [&'static str],
    /// Known region digits, which skip the region search.
    pub region_digits: Option<&'static [u8]>,
}

impl CrossInstance {
    pub fn grid(&self) -> Result<CrossGrid, PuzzleError> {
        CrossGrid::new(self.predicates, self.regions, self.highlighted)
    }
}

pub const CROSS_5: CrossInstance = CrossInstance {
    predicates: &[
        RowPredicate::MultipleOf(11),
        RowPredicate::MultipleOf(14),
        RowPredicate::MultipleOf(28),
        RowPredicate::MultipleOf(101),
        RowPredicate::MultipleOf(2025),
    ],
    regions: &["00000", "10000", "11000", "21100", "22110"],
    highlighted: &["@@...", "@....", ".....", "....@", "...@@"],
    region_digits: None,
};

pub const CROSS_11: CrossInstance = CrossInstance {
    predicates: &[
        RowPredicate::PerfectSquare,
        RowPredicate::DigitProduct(20),
        RowPredicate::MultipleOf(13),
        RowPredicate::MultipleOf(32),
        RowPredicate::DivisibleByDigits,
        RowPredicate::DigitProduct(25),
        RowPredicate::DivisibleByDigits,
        RowPredicate::OddPalindrome,
        RowPredicate::Fibonacci,
        RowPredicate::DigitProduct(2025),
        RowPredicate::Prime,
    ],
    regions: &[
        "00000000000",
        "01000000000",
        "11333344404",
        "13313544444",
        "13313554454",
        "11111555554",
        "12661155655",
        "12666666677",
        "22226267777",
        "22222222222",
        "22888888222",
    ],
    highlighted: &[
        "...........",
        "...@@......",
        "....@....@.",
        "........@@.",
        "...........",
        ".....@.....",
        ".@@..@@....",
        ".@...@.....",
        "....@@.....",
        "....@......",
        "...........",
    ],
    region_digits: Some(&[2, 4, 3, 3, 4, 1, 6, 7, 7]),
};

const fn tile(side: u32, row: i32, col: i32) -> SquareTile {
    SquareTile::new(side, row, col)
}

/// Board layout of `ONES_CONFIGS`.
pub const BOARD_ROWS: usize = 3;
pub const BOARD_COLS: usize = 3;

/// Given tiles of the nine squares, row by row across the board.
#[rustfmt::skip]
pub const ONES_CONFIGS: [&[SquareTile]; BOARD_ROWS * BOARD_COLS] = [
    &[
        tile(9, 9, 0), tile(9, 18, 0), tile(9, 27, 0), tile(9, 36, 0), tile(8, 37, 9),
        tile(8, 29, 9), tile(5, 24, 9), tile(5, 19, 9), tile(6, 13, 9), tile(7, 38, 31),
        tile(7, 38, 38), tile(8, 30, 37), tile(8, 30, 29), tile(8, 22, 37), tile(9, 13, 29),
        tile(7, 15, 38), tile(7, 8, 38), tile(8, 0, 37), tile(4, 0, 33), tile(4, 4, 33),
        tile(5, 8, 33), tile(9, 0, 24), tile(9, 0, 15), tile(4, 0, 11), tile(3, 4, 12),
    ],
    &[
        tile(9, 36, 0), tile(9, 36, 9), tile(9, 36, 18), tile(9, 36, 27), tile(9, 36, 36),
        tile(7, 29, 0), tile(7, 29, 7), tile(7, 29, 14), tile(8, 28, 21), tile(8, 28, 29),
        tile(8, 28, 37), tile(5, 24, 16), tile(3, 25, 21), tile(9, 19, 36), tile(9, 19, 27),
        tile(9, 10, 36), tile(5, 0, 40), tile(5, 5, 40), tile(8, 0, 32), tile(6, 0, 26),
        tile(7, 0, 19), tile(7, 0, 12), tile(4, 0, 0), tile(4, 0, 4), tile(4, 0, 8),
        tile(9, 4, 0), tile(3, 4, 9), tile(8, 13, 0), tile(8, 13, 8),
    ],
    &[
        tile(9, 0, 0), tile(9, 9, 0), tile(9, 18, 0), tile(9, 27, 0), tile(9, 36, 0),
        tile(8, 0, 9), tile(8, 8, 9), tile(7, 16, 9), tile(7, 38, 9), tile(9, 0, 17),
        tile(7, 9, 17), tile(5, 0, 26), tile(4, 5, 26), tile(2, 5, 30), tile(9, 0, 36),
        tile(6, 39, 16), tile(6, 39, 22), tile(7, 32, 16), tile(3, 29, 20), tile(5, 34, 23),
        tile(5, 29, 23), tile(9, 36, 28), tile(9, 27, 28), tile(3, 24, 28), tile(6, 21, 31),
        tile(6, 15, 31), tile(4, 41, 37), tile(4, 41, 41), tile(8, 33, 37), tile(8, 25, 37),
        tile(8, 17, 37),
    ],
    &[
        tile(9, 0, 0), tile(9, 0, 9), tile(9, 36, 0), tile(9, 36, 9), tile(9, 36, 18),
        tile(9, 27, 0), tile(6, 0, 18), tile(6, 6, 18), tile(3, 9, 15), tile(7, 9, 8),
        tile(8, 9, 0), tile(5, 17, 0), tile(5, 22, 0), tile(7, 20, 5), tile(3, 17, 5),
        tile(4, 16, 8), tile(7, 0, 31), tile(7, 0, 38), tile(8, 7, 37), tile(8, 15, 37),
        tile(8, 23, 37), tile(8, 31, 37), tile(6, 39, 39), tile(6, 39, 33), tile(4, 35, 33),
        tile(2, 33, 35), tile(5, 28, 32), tile(9, 19, 28), tile(4, 15, 33),
    ],
    &[
        tile(9, 36, 0), tile(9, 36, 9), tile(8, 28, 0), tile(8, 28, 8), tile(8, 28, 16),
        tile(8, 20, 0), tile(8, 20, 8), tile(7, 13, 0), tile(7, 6, 0), tile(9, 11, 7),
        tile(5, 6, 7), tile(5, 6, 12), tile(4, 2, 0), tile(9, 36, 36), tile(7, 29, 31),
        tile(7, 29, 38), tile(8, 21, 37), tile(4, 25, 33), tile(6, 15, 39), tile(3, 12, 42),
        tile(9, 0, 36), tile(7, 0, 29), tile(7, 0, 22), tile(5, 7, 31),
    ],
    &[
        tile(9, 0, 0), tile(9, 9, 0), tile(9, 18, 0), tile(9, 27, 0), tile(9, 36, 0),
        tile(7, 0, 17), tile(7, 0, 24), tile(7, 0, 31), tile(7, 0, 38), tile(4, 0, 9),
        tile(4, 0, 13), tile(6, 7, 33), tile(6, 7, 39), tile(8, 7, 25), tile(9, 13, 36),
        tile(2, 20, 34), tile(6, 22, 39), tile(6, 28, 39), tile(6, 34, 39), tile(5, 40, 35),
        tile(5, 40, 40), tile(7, 22, 32), tile(8, 37, 9), tile(8, 29, 9), tile(3, 26, 9),
        tile(9, 36, 17), tile(7, 29, 17),
    ],
    &[
        tile(9, 0, 0), tile(9, 9, 0), tile(9, 18, 0), tile(9, 27, 0), tile(9, 36, 0),
        tile(8, 7, 9), tile(7, 15, 9), tile(7, 22, 9), tile(8, 37, 9), tile(8, 29, 9),
        tile(7, 0, 9), tile(7, 15, 16), tile(3, 12, 17), tile(9, 36, 17), tile(7, 29, 17),
        tile(5, 40, 26), tile(5, 40, 31), tile(4, 36, 26), tile(2, 38, 34), tile(9, 36, 36),
        tile(8, 28, 37), tile(8, 20, 37), tile(4, 16, 41), tile(8, 0, 37), tile(9, 0, 28),
        tile(6, 0, 22),
    ],
    &[
        tile(9, 0, 0), tile(9, 0, 9), tile(9, 0, 18), tile(9, 9, 0), tile(9, 18, 0),
        tile(9, 0, 36), tile(9, 27, 0), tile(4, 0, 27), tile(5, 0, 31), tile(2, 5, 34),
        tile(7, 9, 38), tile(7, 16, 38), tile(8, 23, 37), tile(7, 9, 9), tile(7, 16, 9),
        tile(6, 9, 16), tile(6, 15, 16), tile(8, 21, 16), tile(5, 9, 22), tile(7, 14, 22),
        tile(8, 37, 37), tile(8, 37, 29), tile(4, 41, 25), tile(3, 34, 42),
    ],
    &[
        tile(9, 36, 0), tile(9, 36, 9), tile(9, 36, 18), tile(9, 36, 27), tile(9, 36, 36),
        tile(9, 27, 36), tile(9, 18, 36), tile(7, 22, 0), tile(7, 29, 0), tile(8, 28, 7),
        tile(8, 28, 15), tile(8, 28, 23), tile(5, 31, 31), tile(5, 26, 31), tile(5, 21, 31),
        tile(7, 21, 24), tile(4, 24, 20), tile(3, 25, 7), tile(6, 0, 0), tile(6, 0, 6),
        tile(6, 0, 12), tile(5, 0, 18), tile(4, 0, 23), tile(8, 6, 0), tile(8, 6, 8),
    ],
];

/// Outcome of completing one configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnesReport {
    pub config: usize,
    pub solutions: usize,
    /// The 1x1 tile, when the completion is unique.
    pub one: Option<SquareTile>,
}

impl OnesReport {
    /// Letters for the 1x1 tile: the board is lettered `A..Z` repeating
    /// along each axis, 45 letters per square.
    pub fn letters(&self) -> Option<(char, char)> {
        let one = self.one?;
        let side = Partridge9::side_len();
        let board_row = self.config / BOARD_COLS;
        let board_col = self.config % BOARD_COLS;
        Some((
            letter(board_row * side + one.row as usize),
            letter(board_col * side + one.col as usize),
        ))
    }
}

fn letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Completes every configuration on its own worker.
pub fn solve_ones_configs() -> Result<Vec<OnesReport>, PuzzleError> {
    let starts = ONES_CONFIGS
        .iter()
        .map(|tiles| Partridge9::from_tiles(tiles))
        .collect::<Result<Vec<_>, _>>()?;

    info!("{}: completing {} tilings", WorkerId::MAIN, starts.len());

    let reports = fan_out(
        starts.into_iter().enumerate().collect(),
        |id, (config, start)| {
            let (row, col) = (config / BOARD_COLS, config % BOARD_COLS);
            info!("{id}: completing tiling ({row},{col})");

            let solutions = TilingSolver::new(start).find_all();
            let one = match solutions.as_slice() {
                [solution] => solution.tiles_of(1).next(),
                _ => None,
            };

            info!("{id}: tiling ({row},{col}) has {} completions", solutions.len());
            OnesReport {
                config,
                solutions: solutions.len(),
                one,
            }
        },
    )?;

    info!("{}: all tilings done", WorkerId::MAIN);
    Ok(reports)
}
