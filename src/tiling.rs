//! Partridge square tilings.
//!
//! The partridge puzzle of order `N` asks for a square of side
//! `S = N(N+1)/2` covered by one 1x1 square, two 2x2 squares, ..., `N`
//! squares of side `N`. The areas add up to exactly `S^2`.
//!
//! Occupancy is kept as one `u64` bitmask per row, bit `c` for column `c`.

use std::fmt;

use crate::error::PuzzleError;

/// A square tile of side `side` whose top-left cell is `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SquareTile {
    pub side: u32,
    pub row: i32,
    pub col: i32,
}

impl SquareTile {
    pub const fn new(side: u32, row: i32, col: i32) -> Self {
        Self { side, row, col }
    }
}

impl fmt::Display for SquareTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0} at ({1}, {2})", self.side, self.row, self.col)
    }
}

/// A partially tiled partridge square.
///
/// - `N`: largest tile side
/// - `SIDE`: side of the square (must equal `N(N+1)/2`)
///
/// Tile positions are stored per side in push order, side `k` owning the
/// `k` slots starting at `k(k-1)/2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartridgeTiling<const N: usize, const SIDE: usize> {
    rows: [u64; SIDE],
    positions: [Option<(u8, u8)>; SIDE],
    counts: [u8; N],
}

/// The order of the "some ones somewhere" configurations.
pub type Partridge9 = PartridgeTiling<9, 45>;

impl<const N: usize, const SIDE: usize> PartridgeTiling<N, SIDE> {
    /// Evaluated at compile time for every instantiation used.
    const SHAPE_OK: () = {
        assert!(N >= 1, "N must be at least 1");
        assert!(SIDE == N * (N + 1) / 2, "SIDE must equal N(N+1)/2");
        assert!(SIDE <= 64, "SIDE must be <= 64 (u64 row bitmask)");
    };

    /// An empty square.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SHAPE_OK;
        Self {
            rows: [0; SIDE],
            positions: [None; SIDE],
            counts: [0; N],
        }
    }

    /// Places every tile in order, failing on the first one that does not fit.
    pub fn from_tiles(tiles: &[SquareTile]) -> Result<Self, PuzzleError> {
        let mut tiling = Self::new();
        for &tile in tiles {
            tiling.try_push_tile(tile)?;
        }
        Ok(tiling)
    }

    #[inline(always)]
    pub const fn side_len() -> usize {
        SIDE
    }

    /// Number of placed tiles of the given side.
    #[inline]
    pub fn tile_count(&self, side: u32) -> usize {
        if side == 0 || side as usize > N {
            return 0;
        }
        self.counts[side as usize - 1] as usize
    }

    #[inline]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.rows[row] >> col & 1 == 1
    }

    /// True when every cell of the square is covered.
    pub fn is_complete(&self) -> bool {
        let full = u64::MAX >> (64 - SIDE);
        self.rows.iter().all(|&row| row == full)
    }

    /// Whether `tile` would cover an already covered cell. The tile must lie
    /// inside the square.
    #[inline]
    pub fn overlaps(&self, tile: SquareTile) -> bool {
        let mask = row_mask(tile);
        self.rows[tile.row as usize..(tile.row as u32 + tile.side) as usize]
            .iter()
            .any(|&row| row & mask != 0)
    }

    /// Places `tile` after checking its side, its bounds, the number of
    /// tiles of that side already placed, and overlap.
    pub fn try_push_tile(&mut self, tile: SquareTile) -> Result<(), PuzzleError> {
        let SquareTile { side, row, col } = tile;
        let limit = SIDE as i64;
        if side == 0
            || side as usize > N
            || row < 0
            || col < 0
            || row as i64 + side as i64 > limit
            || col as i64 + side as i64 > limit
        {
            return Err(PuzzleError::InvalidTile { side, row, col });
        }
        if self.tile_count(side) >= side as usize {
            return Err(PuzzleError::TileExhausted { side });
        }
        if self.overlaps(tile) {
            return Err(PuzzleError::TileOverlap { side, row, col });
        }

        self.push_unchecked(tile);
        Ok(())
    }

    /// Places `tile` without any checks.
    #[inline]
    pub fn push_unchecked(&mut self, tile: SquareTile) {
        let mask = row_mask(tile);
        let (row, side) = (tile.row as usize, tile.side as usize);
        for bits in &mut self.rows[row..row + side] {
            *bits |= mask;
        }

        let count = &mut self.counts[side - 1];
        self.positions[slot_offset(side) + *count as usize] = Some((tile.row as u8, tile.col as u8));
        *count += 1;
    }

    /// Removes the most recently placed tile of `side`.
    pub fn pop_tile(&mut self, side: u32) -> Option<SquareTile> {
        if self.tile_count(side) == 0 {
            return None;
        }
        let side_idx = side as usize;
        self.counts[side_idx - 1] -= 1;
        let slot = slot_offset(side_idx) + self.counts[side_idx - 1] as usize;
        let (row, col) = self.positions[slot].take()?;

        let tile = SquareTile::new(side, row as i32, col as i32);
        let mask = row_mask(tile);
        for bits in &mut self.rows[row as usize..row as usize + side_idx] {
            *bits &= !mask;
        }
        Some(tile)
    }

    /// Placed tiles of one side, in push order.
    pub fn tiles_of(&self, side: u32) -> impl Iterator<Item = SquareTile> + '_ {
        let count = self.tile_count(side);
        let start = if count > 0 { slot_offset(side as usize) } else { 0 };
        self.positions[start..start + count]
            .iter()
            .flatten()
            .map(move |&(row, col)| SquareTile::new(side, row as i32, col as i32))
    }

    /// Every placed tile, smallest side first.
    pub fn tiles(&self) -> impl Iterator<Item = SquareTile> + '_ {
        (1..=N as u32).flat_map(move |side| self.tiles_of(side))
    }
}

impl<const N: usize, const SIDE: usize> Default for PartridgeTiling<N, SIDE> {
    fn default() -> Self {
        Self::new()
    }
}

/// First position slot of tiles with side `side`.
#[inline(always)]
const fn slot_offset(side: usize) -> usize {
    (side - 1) * side / 2
}

/// Columns covered by `tile` within one row.
#[inline(always)]
const fn row_mask(tile: SquareTile) -> u64 {
    (u64::MAX >> (64 - tile.side)) << tile.col
}

impl<const N: usize, const SIDE: usize> fmt::Display for PartridgeTiling<N, SIDE> {
    /// One character per cell: the side of the covering tile (base 36), or
    /// `.` when uncovered.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cells = vec![['.'; SIDE]; SIDE];
        for tile in self.tiles() {
            let label = char::from_digit(tile.side, 36).unwrap_or('#');
            let (row, col, side) = (tile.row as usize, tile.col as usize, tile.side as usize);
            for cells_row in &mut cells[row..row + side] {
                cells_row[col..col + side].fill(label);
            }
        }

        for (i, row) in cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row.iter().collect::<String>())?;
        }
        Ok(())
    }
}
