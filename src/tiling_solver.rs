//! Exhaustive completion of partridge tilings.
//!
//! Tiles are placed from the largest side down. Within one side, positions
//! are scanned row-major strictly after the previous tile of that side, so
//! each set of same-sized tiles is generated once.
//!
//! Pruning:
//! - anchor cells that are already covered are skipped
//! - a tile leaving a gap of 1 to 3 cells to a wall is skipped when the gap
//!   is too narrow for the tiles that remain (`gap^2 < side`)

use log::{debug, trace};

use crate::tiling::{PartridgeTiling, SquareTile};

pub struct TilingSolver<const N: usize, const SIDE: usize> {
    tiling: PartridgeTiling<N, SIDE>,
    solutions: Vec<PartridgeTiling<N, SIDE>>,
    nodes: u64,
}

impl<const N: usize, const SIDE: usize> TilingSolver<N, SIDE> {
    /// Prepares a search that completes `tiling`. Tiles already placed stay put.
    pub fn new(tiling: PartridgeTiling<N, SIDE>) -> Self {
        Self {
            tiling,
            solutions: Vec::new(),
            nodes: 0,
        }
    }

    /// Every completion of the starting tiling.
    pub fn find_all(mut self) -> Vec<PartridgeTiling<N, SIDE>> {
        self.place(N as u32, (0, -1));
        debug!(
            "Explored {} nodes, found {} tilings",
            self.nodes,
            self.solutions.len()
        );
        self.solutions
    }

    fn place(&mut self, side: u32, last: (i32, i32)) {
        self.nodes += 1;

        if side == 0 {
            debug!("Found a tiling:\n{}", self.tiling);
            self.solutions.push(self.tiling);
            return;
        }

        if self.tiling.tile_count(side) >= side as usize {
            self.place(side - 1, (0, -1));
            return;
        }

        let (last_row, last_col) = last;
        let max_pos = (SIDE as u32 - side) as i32;

        for row in last_row..=max_pos {
            let col_start = if row == last_row { last_col + 1 } else { 0 };
            for col in col_start..=max_pos {
                if self.tiling.is_filled(row as usize, col as usize) {
                    continue;
                }

                let gaps = [row, col, max_pos - row, max_pos - col];
                if gaps
                    .iter()
                    .any(|&gap| (1..=3).contains(&gap) && ((gap * gap) as u32) < side)
                {
                    continue;
                }

                let tile = SquareTile::new(side, row, col);
                if self.tiling.overlaps(tile) {
                    continue;
                }

                trace!("Placing {tile}");
                self.tiling.push_unchecked(tile);
                self.place(side, (row, col));
                self.tiling.pop_tile(side);
            }
        }
    }
}
