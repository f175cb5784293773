//! Grid state for the Hall of Mirrors puzzle.
//!
//! An `n x n` grid of cells, each empty or holding one diagonal mirror,
//! surrounded by `4n` boundary clue slots. A clue is the product of the
//! straight run lengths of a laser fired into the grid from that slot; 0
//! marks a slot whose number is not known yet.
//!
//! Cells are stored row-major in a flat vector, boundary numbers side-major
//! (`side * n + index`, sides in `Direction::SIDES` order).

use std::fmt;

use crate::error::PuzzleError;
use crate::geometry::{Direction, LaserPosition, MirrorKind};

/// Boundary clue value. 0 means unknown.
pub type Number = u64;

/// Outcome of a successful `MirrorGrid::add_mirror`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The cell was empty and now holds the mirror. Undo with `remove_mirror`.
    Fresh,
    /// The cell already held this mirror; nothing changed and nothing must be undone.
    Shared,
}

/// Sums of the boundary numbers that were missing from the input, per side,
/// and their product.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridResult {
    pub left: u64,
    pub top: u64,
    pub right: u64,
    pub bottom: u64,
    pub product: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorGrid {
    numbers: Vec<Number>,
    /// Slots that held a non-zero clue in the input.
    given: Vec<bool>,
    mirrors: Vec<MirrorKind>,
    length: usize,
}

/// Orthogonal neighbour offsets.
const NEIGHBOURS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

impl MirrorGrid {
    /// Builds a grid from the four boundary sides, each listing its clues in
    /// row (left/right) or column (top/bottom) order.
    pub fn new(
        left: &[Number],
        top: &[Number],
        right: &[Number],
        bottom: &[Number],
    ) -> Result<Self, PuzzleError> {
        let length = left.len();
        if top.len() != length || right.len() != length || bottom.len() != length {
            return Err(PuzzleError::MismatchedSides {
                left: left.len(),
                top: top.len(),
                right: right.len(),
                bottom: bottom.len(),
            });
        }
        if length == 0 {
            return Err(PuzzleError::EmptyGrid);
        }

        let numbers: Vec<Number> = [left, top, right, bottom].concat();
        let given = numbers.iter().map(|&x| x != 0).collect();

        Ok(Self {
            numbers,
            given,
            mirrors: vec![MirrorKind::None; length * length],
            length,
        })
    }

    /// A grid of side `n` with every clue unknown.
    pub fn empty(n: usize) -> Self {
        Self {
            numbers: vec![0; 4 * n],
            given: vec![false; 4 * n],
            mirrors: vec![MirrorKind::None; n * n],
            length: n,
        }
    }

    #[inline(always)]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline(always)]
    fn cell_idx(&self, row: i32, col: i32) -> usize {
        row as usize * self.length + col as usize
    }

    #[inline(always)]
    fn slot_idx(&self, side: Direction, index: usize) -> usize {
        side.index() * self.length + index
    }

    /// Clue at slot `index` of `side`. Caller guarantees `index < n`.
    #[inline]
    pub fn boundary(&self, side: Direction, index: usize) -> Number {
        self.numbers[self.slot_idx(side, index)]
    }

    #[inline]
    pub fn boundary_mut(&mut self, side: Direction, index: usize) -> &mut Number {
        let idx = self.slot_idx(side, index);
        &mut self.numbers[idx]
    }

    /// Whether the slot held a clue in the input.
    pub fn is_given(&self, side: Direction, index: usize) -> bool {
        self.given[self.slot_idx(side, index)]
    }

    /// All boundary numbers, side-major.
    pub fn boundary_numbers(&self) -> &[Number] {
        &self.numbers
    }

    pub fn boundary_numbers_mut(&mut self) -> &mut Vec<Number> {
        &mut self.numbers
    }

    /// Clues of one side, in slot order.
    pub fn side(&self, side: Direction) -> &[Number] {
        let start = self.slot_idx(side, 0);
        &self.numbers[start..start + self.length]
    }

    /// Mirror at a cell; cells outside the grid never hold one.
    #[inline]
    pub fn mirror_at(&self, row: i32, col: i32) -> MirrorKind {
        if self.in_bounds(row, col) {
            self.mirrors[self.cell_idx(row, col)]
        } else {
            MirrorKind::None
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        let n = self.length as i32;
        (0..n).contains(&row) && (0..n).contains(&col)
    }

    /// Whether the cell lies on a square ring around the grid centre.
    ///
    /// `offset = 0` is the ring of clue cells just outside the grid, corners
    /// included; `offset = 1` is the outermost ring of real cells.
    pub fn in_border(&self, row: i32, col: i32, offset: i32) -> bool {
        let n = self.length as i32;
        let low = offset - 1;
        let high = n - offset;
        ((row == low || row == high) && (low..=high).contains(&col))
            || ((col == low || col == high) && (low..=high).contains(&row))
    }

    /// The boundary slot owning a clue cell outside the grid, or `None` for
    /// corners and cells not on the outer ring.
    pub fn border_slot(&self, row: i32, col: i32) -> Option<(Direction, usize)> {
        let n = self.length as i32;
        let outside = [col == -1, row == -1, col == n, row == n];
        if outside.iter().filter(|&&x| x).count() != 1 {
            return None;
        }
        let side = Direction::SIDES[outside.iter().position(|&x| x)?];
        let index = if side.indexes_rows() { row } else { col };
        (0..n).contains(&index).then_some((side, index as usize))
    }

    /// True when no orthogonal neighbour holds a mirror.
    pub fn can_place_any(&self, row: i32, col: i32) -> bool {
        NEIGHBOURS
            .iter()
            .all(|&(d_row, d_col)| self.mirror_at(row + d_row, col + d_col) == MirrorKind::None)
    }

    /// Whether `kind` may sit at the cell: either it is already there, or the
    /// cell is empty and isolated from other mirrors.
    pub fn can_place_mirror(&self, row: i32, col: i32, kind: MirrorKind) -> bool {
        if !self.in_bounds(row, col) || kind == MirrorKind::None {
            return false;
        }
        match self.mirror_at(row, col) {
            existing if existing == kind => true,
            MirrorKind::None => self.can_place_any(row, col),
            _ => false,
        }
    }

    /// Places `kind` at the cell.
    ///
    /// Placing a mirror on a cell already holding the same kind succeeds
    /// with `Placement::Shared` and leaves the grid untouched.
    pub fn add_mirror(
        &mut self,
        row: i32,
        col: i32,
        kind: MirrorKind,
    ) -> Result<Placement, PuzzleError> {
        if !self.in_bounds(row, col) {
            return Err(PuzzleError::OutOfBounds { row, col });
        }
        let existing = self.mirror_at(row, col);
        if existing == kind && kind != MirrorKind::None {
            return Ok(Placement::Shared);
        }
        if existing != MirrorKind::None || kind == MirrorKind::None {
            return Err(PuzzleError::Occupied { row, col, existing });
        }
        if !self.can_place_any(row, col) {
            return Err(PuzzleError::AdjacentMirror { row, col });
        }

        let idx = self.cell_idx(row, col);
        self.mirrors[idx] = kind;
        Ok(Placement::Fresh)
    }

    /// Clears a cell that holds `kind`.
    pub fn remove_mirror(&mut self, row: i32, col: i32, kind: MirrorKind) -> Result<(), PuzzleError> {
        if kind == MirrorKind::None || self.mirror_at(row, col) != kind {
            return Err(PuzzleError::MissingMirror { row, col, expected: kind });
        }
        let idx = self.cell_idx(row, col);
        self.mirrors[idx] = MirrorKind::None;
        Ok(())
    }

    /// Placed mirrors as `(row, col, kind)`, row-major.
    pub fn mirrors(&self) -> impl Iterator<Item = (i32, i32, MirrorKind)> + '_ {
        let n = self.length;
        self.mirrors
            .iter()
            .enumerate()
            .filter(|(_, &kind)| kind != MirrorKind::None)
            .map(move |(idx, &kind)| ((idx / n) as i32, (idx % n) as i32, kind))
    }

    pub fn mirror_count(&self) -> usize {
        self.mirrors().count()
    }

    /// Fires a laser from a boundary slot and follows it until it leaves the
    /// grid.
    ///
    /// Returns the product of its run lengths and the clue cell it exits on.
    /// Lengths are counted in steps from clue cell to clue cell, so an empty
    /// row of an `n`-wide grid measures `n + 1`.
    pub fn trace(&self, side: Direction, index: usize) -> (Number, LaserPosition) {
        let mut pos = LaserPosition::entry(side, index as i32, self.length as i32);
        let mut segment: Number = 0;
        let mut product: Number = 1;

        loop {
            pos = pos.advance();
            segment += 1;

            let next_dir = self.mirror_at(pos.row, pos.col).reflect(pos.dir);
            if next_dir != pos.dir {
                product = product.saturating_mul(segment);
                segment = 0;
                pos.dir = next_dir;
            }

            if !self.in_bounds(pos.row, pos.col) {
                break;
            }
        }

        if segment > 0 {
            product = product.saturating_mul(segment);
        }
        (product, pos)
    }

    /// Sums the boundary numbers of slots that were unknown in the input and
    /// multiplies the four side sums.
    pub fn compute_result(&self) -> GridResult {
        let missing_sum = |side: Direction| -> u64 {
            (0..self.length)
                .filter(|&i| !self.is_given(side, i))
                .map(|i| self.boundary(side, i))
                .fold(0, Number::saturating_add)
        };

        let left = missing_sum(Direction::Left);
        let top = missing_sum(Direction::Top);
        let right = missing_sum(Direction::Right);
        let bottom = missing_sum(Direction::Bottom);

        GridResult {
            left,
            top,
            right,
            bottom,
            product: left
                .saturating_mul(top)
                .saturating_mul(right)
                .saturating_mul(bottom),
        }
    }

    /// Compact mirror layout: one line per row, `.` for empty cells.
    pub fn layout(&self) -> String {
        self.mirrors
            .chunks(self.length)
            .map(|row| row.iter().map(|m| m.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Width of one rendered cell, excluding its left wall.
const CELL_WIDTH: usize = 5;

impl fmt::Display for MirrorGrid {
    /// Boxed rendering with clues around the border (`*` when unknown).
    /// Each cell is two lines tall so mirrors read as diagonals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.length;
        let label = |side: Direction, i: usize| match self.boundary(side, i) {
            0 => "*".to_string(),
            x => x.to_string(),
        };

        let mut lines: Vec<String> = Vec::with_capacity(3 * n + 3);

        let header = |side: Direction| {
            let mut line = " ".repeat(CELL_WIDTH);
            for i in 0..n {
                line.push_str(&format!(" {:^width$}", label(side, i), width = CELL_WIDTH));
            }
            line
        };
        let divider = format!("{}{}+", " ".repeat(CELL_WIDTH), "+-----".repeat(n));

        lines.push(header(Direction::Top));
        for row in 0..n {
            lines.push(divider.clone());
            for half in 0..2 {
                // column of the mirror glyph inside a cell for this half-line
                let offset = 1 + 2 * half;
                let left = if half == 1 { label(Direction::Left, row) } else { String::new() };
                let mut line = format!("{:>width$} ", left, width = CELL_WIDTH - 1);
                for col in 0..n {
                    let mirror = self.mirror_at(row as i32, col as i32);
                    let glyph = match mirror {
                        MirrorKind::None => ' ',
                        other => other.symbol(),
                    };
                    let pad = if mirror == MirrorKind::Slash {
                        CELL_WIDTH - 1 - offset
                    } else {
                        offset
                    };
                    line.push('|');
                    line.push_str(&" ".repeat(pad));
                    line.push(glyph);
                    line.push_str(&" ".repeat(CELL_WIDTH - 1 - pad));
                }
                line.push('|');
                if half == 1 {
                    line.push(' ');
                    line.push_str(&label(Direction::Right, row));
                }
                lines.push(line);
            }
        }
        lines.push(divider);
        lines.push(header(Direction::Bottom));

        for line in lines {
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
