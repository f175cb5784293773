//! Backtracking solver for the Hall of Mirrors puzzle.
//!
//! Every known clue is realised as a laser path, one clue at a time:
//! - clues with the fewest factorizations go first
//! - each factorization is walked run by run, placing a mirror at every turn
//! - the path ends on the clue cell it exits through, or on a border cell
//!   where one last mirror sends it out
//!
//! Every mutation sits behind a `Restorer`, so a failed branch leaves the
//! grid exactly as it found it. Once all clues have paths, a final pass fires
//! a laser from every boundary slot: it fills the unknown clues and rejects
//! layouts where a later mirror broke an earlier path.

use log::{debug, error, trace};
use rustc_hash::FxHashMap;

use crate::factorize::{total_factors, Factor, Factorizations};
use crate::geometry::{Direction, LaserPosition, MirrorKind};
use crate::grid::{MirrorGrid, Number, Placement};
use crate::restore::Restorer;

/// A known boundary clue and the factorizations its path may follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clue {
    pub side: Direction,
    pub index: usize,
    pub value: Number,
    /// Index into `MirrorSolver::factorizations`.
    factorizations: usize,
}

/// Search plan for one grid: clue order plus the factorization tables.
pub struct MirrorSolver {
    clues: Vec<Clue>,
    factorizations: Vec<Factorizations>,
}

/// Solves `grid` in place. Returns false when no mirror layout satisfies
/// every clue, leaving the grid unchanged.
pub fn solve(grid: &mut MirrorGrid) -> bool {
    MirrorSolver::new(grid).solve(grid)
}

impl MirrorSolver {
    /// Collects the known clues of `grid` and orders them most constrained
    /// first. Ties keep boundary order (left, top, right, bottom).
    pub fn new(grid: &MirrorGrid) -> Self {
        let n = grid.length();
        // a mirror-free corridor runs clue cell to clue cell
        let cutoff = n as Number + 1;

        // equal clues share one enumeration
        let mut cache: FxHashMap<Number, usize> = FxHashMap::default();
        let mut factorizations: Vec<Factorizations> = Vec::new();
        let mut clues = Vec::new();

        for side in Direction::SIDES {
            for index in 0..n {
                let value = grid.boundary(side, index);
                if value == 0 {
                    continue;
                }
                let slot = *cache.entry(value).or_insert_with(|| {
                    factorizations.push(Factorizations::new(value, cutoff));
                    factorizations.len() - 1
                });
                clues.push(Clue {
                    side,
                    index,
                    value,
                    factorizations: slot,
                });
            }
        }

        clues.sort_by_key(|clue| factorizations[clue.factorizations].len());

        debug!(
            "Clue order: {:?}",
            clues.iter().map(|c| c.value).collect::<Vec<_>>()
        );

        Self {
            clues,
            factorizations,
        }
    }

    /// Clues in the order they are resolved.
    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn factorizations_of(&self, clue: &Clue) -> &Factorizations {
        &self.factorizations[clue.factorizations]
    }

    /// Runs the search on `grid`, which must be the grid this plan was built
    /// from. On success the grid holds the mirror layout and every boundary
    /// number; on failure it is left as it was.
    pub fn solve(&self, grid: &mut MirrorGrid) -> bool {
        self.next_clue(grid, 0)
    }

    fn next_clue(&self, grid: &mut MirrorGrid, clue_idx: usize) -> bool {
        let Some(clue) = self.clues.get(clue_idx) else {
            debug!("All clues have paths. Verifying grid:\n{grid}");
            return self.complete_grid(grid);
        };

        trace!("Current state:\n{grid}");
        debug!(
            "Clue {}/{}: {}[{}] = {}",
            clue_idx + 1,
            self.clues.len(),
            clue.side,
            clue.index,
            clue.value
        );

        // first cell inside the grid
        let start = LaserPosition::entry(clue.side, clue.index as i32, grid.length() as i32).advance();

        for candidate in self.factorizations_of(clue).iter().rev() {
            let mut factors = candidate.clone();
            let total = total_factors(&factors);

            debug!(
                "Trying {} = {} from ({}, {}) heading {}",
                clue.value,
                format_factors(&factors),
                start.row,
                start.col,
                start.dir
            );

            if self.next_factor(grid, clue_idx, &mut factors, 0, total, start) {
                return true;
            }
        }

        false
    }

    /// Chooses the run length for step `factor_idx` of the current path.
    ///
    /// Each base with a remaining count is tried in ascending order; its
    /// count is held back for the duration of the attempt.
    fn next_factor(
        &self,
        grid: &mut MirrorGrid,
        clue_idx: usize,
        factors: &mut [Factor],
        factor_idx: usize,
        total: usize,
        pos: LaserPosition,
    ) -> bool {
        if factor_idx >= total {
            return self.complete_factors(grid, clue_idx, pos);
        }

        for k in 0..factors.len() {
            if factors[k].count == 0 {
                continue;
            }
            let base = factors[k].base as i32;

            factors[k].count -= 1;
            let found = self.try_run(grid, clue_idx, factors, factor_idx, total, pos, base);
            factors[k].count += 1;

            if found {
                return true;
            }
        }

        false
    }

    /// Tries to continue the path from `pos` with one run of `base` cells:
    /// turn on a `\` here, turn on a `/` here, or (first run only) carry
    /// straight on without a mirror.
    #[allow(clippy::too_many_arguments)]
    fn try_run(
        &self,
        grid: &mut MirrorGrid,
        clue_idx: usize,
        factors: &mut [Factor],
        factor_idx: usize,
        total: usize,
        pos: LaserPosition,
        base: i32,
    ) -> bool {
        let is_last = factor_idx + 1 == total;

        // intermediate runs end on the next mirror; the last one ends on the
        // clue cell it exits through or on the border cell before it
        let lands = |grid: &MirrorGrid, next: LaserPosition| {
            if is_last {
                grid.in_border(next.row, next.col, 0) || grid.in_border(next.row, next.col, 1)
            } else {
                grid.in_bounds(next.row, next.col)
            }
        };

        for mirror in MirrorKind::BOTH {
            let next = pos.after_mirror(mirror, base);
            if !lands(grid, next)
                || !grid.can_place_mirror(pos.row, pos.col, mirror)
                || !is_path_clear(grid, pos, next)
            {
                continue;
            }

            debug!(
                "Run {base} with {mirror} at ({}, {}) -> ({}, {}) heading {}",
                pos.row, pos.col, next.row, next.col, next.dir
            );

            let found = with_mirror(grid, pos.row, pos.col, mirror, |grid| {
                self.next_factor(grid, clue_idx, factors, factor_idx + 1, total, next)
            });
            if found {
                return true;
            }
        }

        if factor_idx == 0 {
            if let Some(next) = straight_run(grid, pos, base).filter(|&next| lands(grid, next)) {
                debug!(
                    "Run {base} straight from ({}, {}) -> ({}, {}) heading {}",
                    pos.row, pos.col, next.row, next.col, next.dir
                );

                if self.next_factor(grid, clue_idx, factors, factor_idx + 1, total, next) {
                    return true;
                }
            }
        }

        false
    }

    /// Closes the current path at `end` and moves on to the next clue.
    fn complete_factors(&self, grid: &mut MirrorGrid, clue_idx: usize, end: LaserPosition) -> bool {
        let value = self.clues[clue_idx].value;

        // left through a clue cell
        if let Some((side, index)) = grid.border_slot(end.row, end.col) {
            let previous = grid.boundary(side, index);
            if previous != 0 && previous != value {
                debug!("Path exits on {side}[{index}] = {previous}, expected {value}");
                return false;
            }

            *grid.boundary_mut(side, index) = value;
            let mut guard = Restorer::new(grid, move |grid: &mut MirrorGrid| {
                *grid.boundary_mut(side, index) = previous;
            });

            if self.next_clue(&mut guard, clue_idx + 1) {
                guard.commit();
                return true;
            }
            return false;
        }

        // on a border cell: one more mirror must turn it out of the grid
        let n = grid.length() as i32;
        let on_side = [
            (Direction::Left, end.col == 0),
            (Direction::Top, end.row == 0),
            (Direction::Right, end.col == n - 1),
            (Direction::Bottom, end.row == n - 1),
        ];
        let Some(&(side, _)) = on_side
            .iter()
            .find(|&&(side, on)| on && MirrorKind::terminal(side, end.dir) != MirrorKind::None)
        else {
            debug!("Path stops at ({}, {}) heading {} with no way out", end.row, end.col, end.dir);
            return false;
        };

        let index = (if side.indexes_rows() { end.row } else { end.col }) as usize;
        let previous = grid.boundary(side, index);
        let mirror = MirrorKind::terminal(side, end.dir);

        let is_valid_endpoint = previous == 0 || previous == value;
        let can_place = grid.can_place_mirror(end.row, end.col, mirror);
        if !is_valid_endpoint || !can_place {
            debug!(
                "Path next to {side}[{index}] = {previous} needs {mirror} at ({}, {}) \
                 (valid_endpoint={is_valid_endpoint}, can_place={can_place})",
                end.row, end.col
            );
            return false;
        }

        *grid.boundary_mut(side, index) = value;
        let mut guard = Restorer::new(grid, move |grid: &mut MirrorGrid| {
            *grid.boundary_mut(side, index) = previous;
        });

        let found = with_mirror(&mut guard, end.row, end.col, mirror, |grid| {
            self.next_clue(grid, clue_idx + 1)
        });
        if found {
            guard.commit();
        }
        found
    }

    /// Fires a laser from every boundary slot, filling unknown numbers and
    /// checking known ones. Any mismatch restores all boundary numbers.
    fn complete_grid(&self, grid: &mut MirrorGrid) -> bool {
        let n = grid.length();
        let traced: Vec<Number> = Direction::SIDES
            .iter()
            .flat_map(|&side| (0..n).map(move |index| (side, index)))
            .map(|(side, index)| grid.trace(side, index).0)
            .collect();

        let mut numbers = Restorer::snapshot(grid.boundary_numbers_mut());
        for (slot, (number, &path_number)) in numbers.iter_mut().zip(&traced).enumerate() {
            if *number != 0 && *number != path_number {
                debug!(
                    "Path from {}[{}] gives {path_number}, expected {number}",
                    Direction::SIDES[slot / n],
                    slot % n
                );
                return false;
            }
            *number = path_number;
        }
        numbers.commit();

        debug!("Completed grid:\n{grid}");
        true
    }
}

/// Places `mirror`, runs `then` on the grid, and takes the mirror away again
/// unless `then` succeeds. A mirror that was already there stays either way.
fn with_mirror(
    grid: &mut MirrorGrid,
    row: i32,
    col: i32,
    mirror: MirrorKind,
    then: impl FnOnce(&mut MirrorGrid) -> bool,
) -> bool {
    let placement = match grid.add_mirror(row, col, mirror) {
        Ok(placement) => placement,
        Err(err) => invariant_broken(grid, &err),
    };

    let mut guard = Restorer::new(grid, move |grid: &mut MirrorGrid| {
        if placement == Placement::Fresh {
            if let Err(err) = grid.remove_mirror(row, col, mirror) {
                invariant_broken(grid, &err);
            }
        }
    });

    if then(&mut *guard) {
        guard.commit();
        return true;
    }
    false
}

/// End of a mirror-free first run of `base` cells starting on the entry cell
/// `pos`, or `None` when a mirror stands anywhere along it.
///
/// The laser enters on the first cell, so it has one cell less to travel.
fn straight_run(grid: &MirrorGrid, pos: LaserPosition, base: i32) -> Option<LaserPosition> {
    if grid.mirror_at(pos.row, pos.col) != MirrorKind::None {
        return None;
    }
    let next = pos.after_mirror(MirrorKind::None, base - 1);
    is_path_clear(grid, pos, next).then_some(next)
}

/// True when the straight run from `from` to `to` (heading `to.dir`) crosses
/// no mirror before reaching `to`.
fn is_path_clear(grid: &MirrorGrid, from: LaserPosition, to: LaserPosition) -> bool {
    let dist = from.distance(to);
    let mut pos = LaserPosition { dir: to.dir, ..from };

    for _ in 1..dist {
        pos = pos.advance();
        if grid.mirror_at(pos.row, pos.col) != MirrorKind::None {
            return false;
        }
    }
    pos = pos.advance();

    pos.row == to.row && pos.col == to.col
}

/// A placement the search had checked was refused: the bookkeeping is
/// broken and no result can be trusted.
fn invariant_broken(grid: &MirrorGrid, err: &crate::error::PuzzleError) -> ! {
    error!("Grid invariant broken: {err}\n{grid}");
    panic!("grid invariant broken: {err}");
}

fn format_factors(factors: &[Factor]) -> String {
    factors
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" * ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridResult;
    use crate::instances::{MIRRORS_10, MIRRORS_5};
    use proptest::prelude::*;

    fn assert_no_adjacent_mirrors(grid: &MirrorGrid) {
        for (row, col, _) in grid.mirrors() {
            for (d_row, d_col) in [(-1, 0), (0, -1), (1, 0), (0, 1)] {
                assert_eq!(
                    grid.mirror_at(row + d_row, col + d_col),
                    MirrorKind::None,
                    "mirror at ({row}, {col}) touches ({}, {})",
                    row + d_row,
                    col + d_col
                );
            }
        }
    }

    fn assert_consistent(original: &MirrorGrid, solved: &MirrorGrid) {
        let n = solved.length();
        for side in Direction::SIDES {
            for i in 0..n {
                let given = original.boundary(side, i);
                let (traced, _) = solved.trace(side, i);
                assert_eq!(solved.boundary(side, i), traced, "{side}[{i}] disagrees with its path");
                if given != 0 {
                    assert_eq!(traced, given, "known clue {side}[{i}] changed");
                }
            }
        }
        assert_no_adjacent_mirrors(solved);
    }

    #[test]
    fn test_clues_ordered_by_ambiguity() {
        let grid = MIRRORS_5.grid().unwrap();
        let solver = MirrorSolver::new(&grid);

        let counts: Vec<_> = solver
            .clues()
            .iter()
            .map(|c| solver.factorizations_of(c).len())
            .collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "counts {counts:?}");

        let values: Vec<_> = solver.clues().iter().map(|c| c.value).collect();
        // 9 = 3*3; 75 = 3*5*5; 16 = 2^4, 2^2*4, 4^2; 36 = 2^2*3^2, 2*3*6, 3^2*4, 6^2
        assert_eq!(values, vec![9, 75, 16, 36]);
    }

    #[test]
    fn test_equal_clues_share_factorizations() {
        let grid = MirrorGrid::new(&[12, 0, 0], &[0, 12, 0], &[0, 0, 4], &[0, 0, 0]).unwrap();
        let solver = MirrorSolver::new(&grid);
        assert_eq!(solver.clues().len(), 3);
        assert_eq!(solver.factorizations.len(), 2);

        // an empty 2x2 grid reads 3 everywhere: eight clues, one table
        let original = MirrorGrid::new(&[3, 3], &[3, 3], &[3, 3], &[3, 3]).unwrap();
        let solver = MirrorSolver::new(&original);
        assert_eq!(solver.clues().len(), 8);
        assert_eq!(solver.factorizations.len(), 1);

        let mut grid = original.clone();
        assert!(solver.solve(&mut grid), "shared tables must still solve");
        assert_consistent(&original, &grid);
        assert_eq!(grid.mirror_count(), 0);
    }

    #[test]
    fn test_straight_corridor_clues() {
        let original = MirrorGrid::new(&[2], &[0], &[0], &[0]).unwrap();
        let mut grid = original.clone();
        assert!(solve(&mut grid), "an empty 1x1 grid reads 2 across");
        assert_consistent(&original, &grid);
        assert_eq!(grid.side(Direction::Right), &[2]);
        assert_eq!(grid.mirror_count(), 0);

        // 4 = 2*2 = 4, and the straight reading across row 2 is the one that holds
        let original = MirrorGrid::new(&[0, 0, 4], &[0, 0, 0], &[0, 0, 4], &[0, 0, 0]).unwrap();
        let mut grid = original.clone();
        assert!(solve(&mut grid));
        assert_consistent(&original, &grid);
        assert_eq!(grid.mirror_count(), 0);
        assert_eq!(grid.side(Direction::Top), &[4, 4, 4]);
    }

    #[test]
    fn test_straight_run_needs_every_cell_empty() {
        let mut grid = MirrorGrid::empty(3);
        let start = LaserPosition::entry(Direction::Left, 0, 3).advance();
        let across = LaserPosition { row: 0, col: 3, dir: Direction::Right };
        assert_eq!(straight_run(&grid, start, 4), Some(across));

        grid.add_mirror(0, 0, MirrorKind::Backslash).unwrap();
        assert_eq!(straight_run(&grid, start, 4), None, "mirror on the entry cell");

        let mut grid = MirrorGrid::empty(3);
        grid.add_mirror(0, 1, MirrorKind::Slash).unwrap();
        assert_eq!(straight_run(&grid, start, 4), None, "mirror halfway");
        // stopping on the mirror is a turn, not a blocked run
        assert_eq!(
            straight_run(&grid, start, 2),
            Some(LaserPosition { row: 0, col: 1, dir: Direction::Right })
        );
    }

    #[test]
    fn test_solves_canonical_5x5() {
        let original = MIRRORS_5.grid().unwrap();
        let mut grid = original.clone();

        assert!(solve(&mut grid));
        assert_consistent(&original, &grid);

        insta::assert_snapshot!(grid.layout(), @r"
        .\..\
        /....
        .././
        .../.
        \....
        ");
        assert_eq!(grid.side(Direction::Left), &[10, 2, 9, 16, 1]);
        assert_eq!(grid.side(Direction::Top), &[2, 36, 9, 16, 1]);
        assert_eq!(grid.side(Direction::Right), &[1, 75, 3, 4, 75]);
        assert_eq!(grid.side(Direction::Bottom), &[1, 10, 36, 4, 3]);

        let result = grid.compute_result();
        assert_eq!(
            result,
            GridResult {
                left: 22,
                top: 55,
                right: 83,
                bottom: 18,
                product: 1_807_740,
            }
        );
    }

    #[test]
    fn test_solving_is_deterministic() {
        let mut first = MIRRORS_5.grid().unwrap();
        let mut second = first.clone();
        assert!(solve(&mut first));
        assert!(solve(&mut second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_solves_canonical_10x10() {
        let original = MIRRORS_10.grid().unwrap();
        let mut grid = original.clone();

        assert!(solve(&mut grid));
        assert_consistent(&original, &grid);
        assert_eq!(grid.side(Direction::Left), &[27, 2025, 3, 27, 112, 12, 48, 12, 225, 24]);
        assert_eq!(grid.side(Direction::Bottom), &[2025, 225, 24, 12, 64, 5, 16, 405, 4, 3087]);
        assert_eq!(grid.compute_result().product, 601_931_086_080);
    }

    #[test]
    fn test_clue_without_factorization_fails_cleanly() {
        // 7 is prime and longer than any run in a 3x3 grid
        let original = MirrorGrid::new(&[7, 0, 0], &[0, 0, 0], &[0, 0, 0], &[0, 0, 0]).unwrap();
        let mut grid = original.clone();
        assert!(!solve(&mut grid));
        assert_eq!(grid, original);
    }

    #[test]
    fn test_failed_search_leaves_grid_untouched() {
        // each clue alone is fine, but both cannot hold at once
        let original =
            MirrorGrid::new(&[1, 0, 0, 0], &[2, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]).unwrap();
        let mut grid = original.clone();
        assert!(!solve(&mut grid));
        assert_eq!(grid, original, "every placement must be rolled back");
        assert_eq!(grid.mirror_count(), 0);
    }

    #[test]
    fn test_corner_clue_of_one() {
        // / in the top-left cell joins Top[0] and Left[0] with runs 1 * 1
        let original = MirrorGrid::new(&[0, 0, 0], &[1, 0, 0], &[0, 0, 0], &[0, 0, 0]).unwrap();
        let mut grid = original.clone();
        assert!(solve(&mut grid));
        assert_consistent(&original, &grid);
        assert_eq!(grid.boundary(Direction::Left, 0), 1);
        assert_eq!(grid.mirror_at(0, 0), MirrorKind::Slash);
    }

    #[test]
    fn test_path_clear_checks_cells_between() {
        let mut grid = MirrorGrid::empty(5);
        let from = LaserPosition { row: 2, col: 0, dir: Direction::Right };
        let to = from.after_mirror(MirrorKind::None, 3);
        assert!(is_path_clear(&grid, from, to));

        grid.add_mirror(2, 2, MirrorKind::Slash).unwrap();
        assert!(!is_path_clear(&grid, from, to));
        // a mirror on the end cell is where the next turn happens
        let short = from.after_mirror(MirrorKind::None, 2);
        assert!(is_path_clear(&grid, from, short));
        // zero-length runs never line up
        assert!(!is_path_clear(&grid, from, from));
    }

    #[test]
    #[should_panic(expected = "grid invariant broken")]
    fn test_with_mirror_panics_on_refused_placement() {
        let mut grid = MirrorGrid::empty(3);
        grid.add_mirror(1, 1, MirrorKind::Slash).unwrap();
        with_mirror(&mut grid, 1, 2, MirrorKind::Slash, |_| true);
    }

    #[test]
    fn test_with_mirror_keeps_shared_mirror_on_failure() {
        let mut grid = MirrorGrid::empty(3);
        grid.add_mirror(1, 1, MirrorKind::Slash).unwrap();
        let before = grid.clone();

        assert!(!with_mirror(&mut grid, 1, 1, MirrorKind::Slash, |_| false));
        assert_eq!(grid, before);

        assert!(!with_mirror(&mut grid, 0, 0, MirrorKind::Backslash, |grid| {
            assert_eq!(grid.mirror_at(0, 0), MirrorKind::Backslash);
            false
        }));
        assert_eq!(grid, before);
    }

    /// Random mirror layout with no two mirrors touching.
    fn random_layout(n: usize, cells: &[(usize, bool)]) -> MirrorGrid {
        let mut grid = MirrorGrid::empty(n);
        for &(cell, slash) in cells {
            let (row, col) = ((cell / n) as i32, (cell % n) as i32);
            let kind = if slash { MirrorKind::Slash } else { MirrorKind::Backslash };
            if grid.can_place_mirror(row, col, kind) && grid.mirror_at(row, col) == MirrorKind::None {
                grid.add_mirror(row, col, kind).unwrap();
            }
        }
        grid
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn test_recovers_clues_of_random_layouts(
            n in 3usize..=5,
            cells in proptest::collection::vec((0usize..25, any::<bool>()), 1..6),
            keep in proptest::collection::vec(any::<bool>(), 20),
        ) {
            let cells: Vec<_> = cells.into_iter().filter(|&(c, _)| c < n * n).collect();
            let layout = random_layout(n, &cells);

            // hide some clues
            let mut sides: Vec<Vec<Number>> = vec![vec![0; n]; 4];
            for (s, side) in Direction::SIDES.into_iter().enumerate() {
                for i in 0..n {
                    if keep[s * 5 + i] {
                        sides[s][i] = layout.trace(side, i).0;
                    }
                }
            }
            let original = MirrorGrid::new(&sides[0], &sides[1], &sides[2], &sides[3]).unwrap();

            let mut grid = original.clone();
            prop_assert!(solve(&mut grid), "layout:\n{}\nclues:\n{}", layout.layout(), original);
            assert_consistent(&original, &grid);
        }

        #[test]
        fn test_failure_rolls_back_everything(
            n in 3usize..=4,
            clues in proptest::collection::vec((0usize..16, 1u64..40), 1..4),
        ) {
            let mut sides: Vec<Vec<Number>> = vec![vec![0; n]; 4];
            for (slot, value) in clues {
                let slot = slot % (4 * n);
                sides[slot / n][slot % n] = value;
            }
            let original = MirrorGrid::new(&sides[0], &sides[1], &sides[2], &sides[3]).unwrap();

            let mut grid = original.clone();
            if solve(&mut grid) {
                assert_consistent(&original, &grid);
            } else {
                prop_assert_eq!(&grid, &original);
            }
        }
    }
}
