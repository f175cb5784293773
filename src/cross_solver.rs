//! Backtracking solver for the cross-number puzzle.
//!
//! Two nested searches:
//! - region digits, region by region, adjacent regions always different
//! - shaded cells, decided cell by cell with a row/column cursor
//!
//! Shading a cell spreads its digit into the row above, so an entry of row
//! `r` is only final once the cursor on row `r + 1` has passed its end. The
//! cursor checks those entries as it goes; the last row is checked when the
//! cursor runs off the grid. Every entry must satisfy its row rule and no
//! number may appear twice in the grid.

use log::{debug, info, trace};
use rustc_hash::FxHashSet;

use crate::cross_grid::{CrossGrid, Region, RegionId};
use crate::cross_predicates::DigitSet;
use crate::error::PuzzleError;
use crate::geometry::Direction;
use crate::restore::Restorer;

/// The next cell to decide and the column of the last shaded cell in its row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cursor {
    row: usize,
    col: usize,
    last_shaded: Option<usize>,
}

impl Cursor {
    const START: Cursor = Cursor {
        row: 0,
        col: 0,
        last_shaded: None,
    };

    fn next_col(self) -> Self {
        Cursor {
            col: self.col + 1,
            ..self
        }
    }

    fn after_shade(self) -> Self {
        Cursor {
            col: self.col + 1,
            last_shaded: Some(self.col),
            ..self
        }
    }

    fn next_row(self) -> Self {
        Cursor {
            row: self.row + 1,
            ..Self::START
        }
    }
}

/// Collects the numbers of the grid while it searches; after a successful
/// solve they are the puzzle's entries.
#[derive(Debug, Default)]
pub struct CrossSolver {
    numbers: FxHashSet<u64>,
}

impl CrossSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn numbers(&self) -> &FxHashSet<u64> {
        &self.numbers
    }

    pub fn sorted_numbers(&self) -> Vec<u64> {
        let mut numbers: Vec<_> = self.numbers.iter().copied().collect();
        numbers.sort_unstable();
        numbers
    }

    /// Sum of all entries, the puzzle's answer.
    pub fn total(&self) -> u64 {
        self.numbers.iter().fold(0, |acc, &n| acc.saturating_add(n))
    }

    /// Searches region digits and shadings. On failure the grid is left
    /// as it was.
    pub fn solve(&mut self, grid: &mut CrossGrid) -> bool {
        info!("Solving a {0}x{0} cross-number grid", grid.size());
        self.numbers.clear();

        if self.assign_region(grid, 0) {
            info!("Found a solution:\n{grid}");
            return true;
        }
        info!("No solution for the {0}x{0} grid", grid.size());
        false
    }

    /// Searches shadings only, with every region digit given up front.
    pub fn solve_with_region_digits(
        &mut self,
        grid: &mut CrossGrid,
        digits: &[u8],
    ) -> Result<bool, PuzzleError> {
        let expected = grid.regions().len();
        if digits.len() != expected {
            return Err(PuzzleError::RegionDigitCount {
                found: digits.len(),
                expected,
            });
        }
        for (region, (&digit, r)) in digits.iter().zip(grid.regions()).enumerate() {
            if !r.allowed_digits().contains(digit) {
                return Err(PuzzleError::InvalidRegionDigit { region, digit });
            }
        }

        info!("Solving a {0}x{0} cross-number grid with region digits {digits:?}", grid.size());
        self.numbers.clear();

        let mut grid = Restorer::snapshot(grid);
        for (id, &digit) in digits.iter().enumerate() {
            grid.set_region_digit(id, digit);
        }

        if self.shade_from(&mut grid, Cursor::START) {
            info!("Found a solution:\n{}", *grid);
            grid.commit();
            return Ok(true);
        }
        info!("No shading fits region digits {digits:?}");
        Ok(false)
    }

    fn assign_region(&mut self, grid: &mut CrossGrid, id: RegionId) -> bool {
        if id == grid.regions().len() {
            debug!(
                "Trying region digits {:?}",
                grid.regions().iter().map(Region::digit).collect::<Vec<_>>()
            );
            return self.shade_from(grid, Cursor::START);
        }

        // later regions are still unassigned, so only earlier ones can clash
        let region = &grid.regions()[id];
        let candidates: DigitSet = region
            .allowed_digits()
            .iter()
            .filter(|&digit| {
                region
                    .neighbors()
                    .iter()
                    .all(|&other| grid.regions()[other].digit() != digit)
            })
            .collect();

        for digit in candidates.iter() {
            trace!("Region {id} <- {digit}");
            grid.set_region_digit(id, digit);
            if self.assign_region(grid, id + 1) {
                return true;
            }
        }

        grid.set_region_digit(id, 0);
        false
    }

    fn shade_from(&mut self, grid: &mut CrossGrid, at: Cursor) -> bool {
        let n = grid.size();

        if at.row == n {
            return self.check_last_row(grid);
        }

        if at.row == 0 {
            if at.col == n {
                return self.shade_from(grid, at.next_row());
            }
            return self.try_shade(grid, at) || self.shade_from(grid, at.next_col());
        }

        let above = at.row - 1;
        let closed = grid
            .entry_ending(above, at.col)
            .map(|digits| grid.predicate(above).evaluate(digits));

        match closed {
            // an entry of the row above ends here
            Some(Some(number)) => {
                if !self.numbers.insert(number) {
                    trace!("{number} appears twice");
                    return false;
                }

                let next = if at.col == n { at.next_row() } else { at.next_col() };
                if self.shade_from(grid, next) {
                    return true;
                }
                self.numbers.remove(&number);
                false
            }
            Some(None) => {
                trace!("Row {above} breaks its rule ({}) at column {}", grid.predicate(above), at.col);
                false
            }
            // shaded cells never touch, so nothing goes under a shaded cell
            None => {
                (!grid.is_shaded(above, at.col) && self.try_shade(grid, at))
                    || self.shade_from(grid, at.next_col())
            }
        }
    }

    /// Shades the cursor cell and tries every way to spread its digit.
    fn try_shade(&mut self, grid: &mut CrossGrid, at: Cursor) -> bool {
        let n = grid.size();
        let Cursor {
            row,
            col,
            last_shaded,
        } = at;

        // entries on both sides keep at least two digits
        let before = last_shaded.map_or(col, |last| col - last - 1);
        let after = n - col - 1;
        if (col != 0 && before < 2) || (col != n - 1 && after < 2) || grid.is_highlighted(row, col) {
            return false;
        }

        let digit = grid.shade(row, col);
        let mut grid = Restorer::new(grid, move |grid: &mut CrossGrid| {
            grid.unshade(row, col, digit);
        });

        let targets = Direction::SIDES.map(|dir| grid.neighbor(row, col, dir));
        for amounts in spreads(digit) {
            if !can_spread(&grid, &targets, &amounts) {
                continue;
            }

            trace!("Shading ({row}, {col}), spreading {digit} as {amounts:?}");
            spread(&mut grid, &targets, &amounts, true);
            if self.shade_from(&mut grid, at.after_shade()) {
                grid.commit();
                return true;
            }
            spread(&mut grid, &targets, &amounts, false);
        }

        false
    }

    fn check_last_row(&mut self, grid: &CrossGrid) -> bool {
        let last = grid.size() - 1;
        let rule = grid.predicate(last);

        let numbers: Option<Vec<u64>> = (0..=grid.size())
            .rev()
            .filter_map(|end| grid.entry_ending(last, end))
            .map(|digits| rule.evaluate(digits))
            .collect();
        let Some(numbers) = numbers else {
            return false;
        };

        for (i, &number) in numbers.iter().enumerate() {
            if !self.numbers.insert(number) {
                for earlier in &numbers[..i] {
                    self.numbers.remove(earlier);
                }
                return false;
            }
        }

        debug!("Completed grid:\n{grid}");
        true
    }
}

/// Ways to split `digit` over the four neighbours, amounts listed in
/// `Direction::SIDES` order.
fn spreads(digit: u8) -> impl Iterator<Item = [u8; 4]> {
    (0..=digit).flat_map(move |left| {
        (0..=digit - left).flat_map(move |top| {
            (0..=digit - left - top).map(move |right| [left, top, right, digit - left - top - right])
        })
    })
}

/// Every non-zero amount needs a neighbour that is inside the grid, plain,
/// unshaded and stays a single digit.
fn can_spread(grid: &CrossGrid, targets: &[Option<(usize, usize)>; 4], amounts: &[u8; 4]) -> bool {
    targets.iter().zip(amounts).all(|(target, &amount)| {
        amount == 0
            || target.is_some_and(|(row, col)| {
                !grid.is_highlighted(row, col)
                    && !grid.is_shaded(row, col)
                    && grid.digit(row, col) + amount < 10
            })
    })
}

fn spread(grid: &mut CrossGrid, targets: &[Option<(usize, usize)>; 4], amounts: &[u8; 4], add: bool) {
    for (&target, &amount) in targets.iter().zip(amounts) {
        let Some((row, col)) = target else {
            continue;
        };
        let digit = grid.digit(row, col);
        let digit = if add { digit + amount } else { digit - amount };
        grid.set_digit(row, col, digit);
    }
}
