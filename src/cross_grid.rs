//! Cross-number grid state.
//!
//! An `N x N` grid with one rule per row. The grid is split into regions,
//! and every cell of a region starts out holding the region's digit;
//! adjacent regions get different digits. Shading a cell removes its digit
//! and spreads it over its four neighbours, splitting the row into shorter
//! numbers. Highlighted cells can be neither shaded nor changed.
//!
//! Regions and highlights are read from text rows:
//! - region marks are base-36 characters, `0` to `9` then `a` to `z`
//! - highlighted cells are `@`, plain cells `.`

use std::fmt;

use crate::cross_predicates::{DigitSet, RowPredicate};
use crate::error::PuzzleError;
use crate::geometry::Direction;

pub type RegionId = usize;

/// A connected group of cells that share one digit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    cells: Vec<(usize, usize)>,
    neighbors: Vec<RegionId>,
    allowed: DigitSet,
    digit: u8,
}

impl Region {
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// Regions sharing an edge with this one.
    pub fn neighbors(&self) -> &[RegionId] {
        &self.neighbors
    }

    /// Digits compatible with the rules of every row holding a highlighted
    /// cell of the region.
    pub fn allowed_digits(&self) -> DigitSet {
        self.allowed
    }

    /// Assigned digit, 0 while unassigned.
    pub fn digit(&self) -> u8 {
        self.digit
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossGrid {
    size: usize,
    predicates: Vec<RowPredicate>,
    region_map: Vec<RegionId>,
    highlighted: Vec<bool>,
    shaded: Vec<bool>,
    digits: Vec<u8>,
    regions: Vec<Region>,
}

impl CrossGrid {
    /// Builds a grid with one row per predicate. Every region starts
    /// unassigned and no cell is shaded.
    pub fn new(
        predicates: &[RowPredicate],
        regions: &[&str],
        highlighted: &[&str],
    ) -> Result<Self, PuzzleError> {
        let size = predicates.len();
        if size == 0 {
            return Err(PuzzleError::EmptyGrid);
        }

        let region_map = parse_rows(regions, size, |row, col, mark| {
            mark.to_digit(36)
                .map(|id| id as RegionId)
                .ok_or(PuzzleError::InvalidCellMark { row, col, mark })
        })?;
        let highlighted = parse_rows(highlighted, size, |row, col, mark| match mark {
            '@' => Ok(true),
            '.' => Ok(false),
            _ => Err(PuzzleError::InvalidCellMark { row, col, mark }),
        })?;

        let mut grid = Self {
            size,
            predicates: predicates.to_vec(),
            region_map,
            highlighted,
            shaded: vec![false; size * size],
            digits: vec![0; size * size],
            regions: Vec::new(),
        };
        grid.regions = grid.collect_regions();
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn predicate(&self, row: usize) -> RowPredicate {
        self.predicates[row]
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// `(row, col)` moved one step towards `dir`, if still inside the grid.
    pub fn neighbor(&self, row: usize, col: usize, dir: Direction) -> Option<(usize, usize)> {
        let (d_row, d_col) = dir.vector();
        let row = row.checked_add_signed(d_row as isize)?;
        let col = col.checked_add_signed(d_col as isize)?;
        (row < self.size && col < self.size).then_some((row, col))
    }

    pub fn digit(&self, row: usize, col: usize) -> u8 {
        self.digits[self.index(row, col)]
    }

    pub fn set_digit(&mut self, row: usize, col: usize, digit: u8) {
        let idx = self.index(row, col);
        self.digits[idx] = digit;
    }

    pub fn row_digits(&self, row: usize) -> &[u8] {
        &self.digits[row * self.size..(row + 1) * self.size]
    }

    pub fn is_highlighted(&self, row: usize, col: usize) -> bool {
        self.highlighted[self.index(row, col)]
    }

    pub fn is_shaded(&self, row: usize, col: usize) -> bool {
        self.shaded[self.index(row, col)]
    }

    /// Shades the cell and clears its digit. Returns the digit it held.
    pub fn shade(&mut self, row: usize, col: usize) -> u8 {
        let idx = self.index(row, col);
        self.shaded[idx] = true;
        std::mem::take(&mut self.digits[idx])
    }

    /// Undoes `shade`, putting `digit` back.
    pub fn unshade(&mut self, row: usize, col: usize, digit: u8) {
        let idx = self.index(row, col);
        self.shaded[idx] = false;
        self.digits[idx] = digit;
    }

    /// True when the digit differs from the region digit because a shaded
    /// neighbour spread into it.
    pub fn is_altered(&self, row: usize, col: usize) -> bool {
        let digit = self.digit(row, col);
        !self.is_shaded(row, col) && digit != 0 && digit != self.region_of(row, col).digit
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region_id(&self, row: usize, col: usize) -> RegionId {
        self.region_map[self.index(row, col)]
    }

    pub fn region_of(&self, row: usize, col: usize) -> &Region {
        &self.regions[self.region_id(row, col)]
    }

    /// Writes `digit` into the region and all of its cells. 0 clears it.
    pub fn set_region_digit(&mut self, id: RegionId, digit: u8) {
        self.regions[id].digit = digit;
        for i in 0..self.regions[id].cells.len() {
            let (row, col) = self.regions[id].cells[i];
            self.set_digit(row, col, digit);
        }
    }

    /// Digits of the entry of `row` that ends just before column `end`.
    ///
    /// Entries end at the right edge (`end == size`, skipping a shaded last
    /// cell) or at a shaded cell strictly inside the row. Any other `end`
    /// closes no entry.
    pub fn entry_ending(&self, row: usize, end: usize) -> Option<&[u8]> {
        let n = self.size;
        let mut end = end.min(n);
        let inner_shade = end > 0 && end + 1 < n && self.is_shaded(row, end);
        if end != n && !inner_shade {
            return None;
        }
        if end == n && self.is_shaded(row, n - 1) {
            end -= 1;
        }

        let mut start = end;
        while start > 0 && !self.is_shaded(row, start - 1) {
            start -= 1;
        }
        Some(&self.row_digits(row)[start..end])
    }

    /// Every entry of `row`, left to right.
    pub fn entries(&self, row: usize) -> impl Iterator<Item = &[u8]> {
        self.row_digits(row)
            .split(move |&digit| digit == 0)
            .filter(|entry| !entry.is_empty())
    }

    /// The region marks, one line per row.
    pub fn region_layout(&self) -> String {
        self.region_map
            .chunks(self.size)
            .map(|row| {
                row.iter()
                    .map(|&id| char::from_digit(id as u32, 36).unwrap_or('?'))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Flood fills the region map into connected regions. Cells with equal
    /// marks that do not touch still share one region id.
    fn collect_regions(&self) -> Vec<Region> {
        let n = self.size;
        let count = self.region_map.iter().max().map_or(0, |&max| max + 1);
        let mut regions = vec![
            Region {
                cells: Vec::new(),
                neighbors: Vec::new(),
                allowed: DigitSet::NONZERO,
                digit: 0,
            };
            count
        ];

        let mut visited = vec![false; n * n];
        let mut stack = Vec::new();
        for start in 0..n * n {
            if visited[start] {
                continue;
            }
            let id = self.region_map[start];
            let region = &mut regions[id];

            visited[start] = true;
            stack.push((start / n, start % n));
            while let Some((row, col)) = stack.pop() {
                region.cells.push((row, col));
                if self.is_highlighted(row, col) {
                    region.allowed = region.allowed.intersect(self.predicates[row].allowed_digits());
                }

                for dir in Direction::SIDES {
                    let Some((next_row, next_col)) = self.neighbor(row, col, dir) else {
                        continue;
                    };
                    let next = self.index(next_row, next_col);
                    let next_id = self.region_map[next];
                    if next_id != id {
                        if !region.neighbors.contains(&next_id) {
                            region.neighbors.push(next_id);
                        }
                    } else if !visited[next] {
                        visited[next] = true;
                        stack.push((next_row, next_col));
                    }
                }
            }
        }

        regions
    }
}

/// Parses `rows` into a flat `size x size` table, one value per character.
fn parse_rows<T>(
    rows: &[&str],
    size: usize,
    mut parse: impl FnMut(usize, usize, char) -> Result<T, PuzzleError>,
) -> Result<Vec<T>, PuzzleError> {
    if rows.len() != size {
        return Err(PuzzleError::RowCount { found: rows.len(), expected: size });
    }

    let mut cells = Vec::with_capacity(size * size);
    for (row, line) in rows.iter().enumerate() {
        let width = line.chars().count();
        if width != size {
            return Err(PuzzleError::RowWidth { row, found: width, expected: size });
        }
        for (col, mark) in line.chars().enumerate() {
            cells.push(parse(row, col, mark)?);
        }
    }
    Ok(cells)
}

impl fmt::Display for CrossGrid {
    /// One line per row: digits, `#` for shaded cells, `_` for cells whose
    /// region has no digit yet. Highlighted cells are followed by `'`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                if col > 0 {
                    write!(f, " ")?;
                }
                let mark = match self.digit(row, col) {
                    _ if self.is_shaded(row, col) => '#',
                    0 => '_',
                    digit => char::from(b'0' + digit),
                };
                let flag = if self.is_highlighted(row, col) { "'" } else { "" };
                write!(f, "{mark}{flag}")?;
            }
            writeln!(f, "   {}", self.predicates[row])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> CrossGrid {
        CrossGrid::new(
            &[RowPredicate::MultipleOf(11), RowPredicate::DigitProduct(25), RowPredicate::Prime],
            &["001", "021", "221"],
            &["...", ".@.", "..."],
        )
        .unwrap()
    }

    #[test]
    fn test_regions_are_flood_filled() {
        let grid = small_grid();
        let regions = grid.regions();
        assert_eq!(regions.len(), 3);

        let mut cells = regions[2].cells().to_vec();
        cells.sort();
        assert_eq!(cells, vec![(1, 1), (2, 0), (2, 1)]);

        let mut neighbors = regions[0].neighbors().to_vec();
        neighbors.sort();
        assert_eq!(neighbors, vec![1, 2]);
        assert_eq!(grid.region_id(1, 2), 1);
    }

    #[test]
    fn test_highlighted_cells_narrow_region_digits() {
        let grid = small_grid();
        // (1, 1) is highlighted and its row needs a digit product of 25
        assert_eq!(grid.regions()[2].allowed_digits().iter().collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(grid.regions()[0].allowed_digits(), DigitSet::NONZERO);
    }

    #[test]
    fn test_bad_input_is_rejected() {
        let rules = [RowPredicate::Prime, RowPredicate::Prime];
        assert_eq!(
            CrossGrid::new(&rules, &["00"], &["..", ".."]),
            Err(PuzzleError::RowCount { found: 1, expected: 2 })
        );
        assert_eq!(
            CrossGrid::new(&rules, &["00", "001"], &["..", ".."]),
            Err(PuzzleError::RowWidth { row: 1, found: 3, expected: 2 })
        );
        assert_eq!(
            CrossGrid::new(&rules, &["00", "0!"], &["..", ".."]),
            Err(PuzzleError::InvalidCellMark { row: 1, col: 1, mark: '!' })
        );
        assert_eq!(
            CrossGrid::new(&rules, &["00", "00"], &["..", ".x"]),
            Err(PuzzleError::InvalidCellMark { row: 1, col: 1, mark: 'x' })
        );
        assert_eq!(CrossGrid::new(&[], &[], &[]), Err(PuzzleError::EmptyGrid));
    }

    #[test]
    fn test_shading_round_trips() {
        let mut grid = small_grid();
        grid.set_region_digit(0, 3);
        grid.set_region_digit(2, 5);
        let before = grid.clone();

        assert_eq!(grid.shade(0, 1), 3);
        assert!(grid.is_shaded(0, 1));
        assert_eq!(grid.digit(0, 1), 0);

        grid.unshade(0, 1, 3);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_altered_cells() {
        let mut grid = small_grid();
        grid.set_region_digit(0, 3);
        assert!(!grid.is_altered(0, 0));
        grid.set_digit(0, 0, 4);
        assert!(grid.is_altered(0, 0));
        grid.shade(0, 0);
        assert!(!grid.is_altered(0, 0), "shaded cells hold no digit");
    }

    #[test]
    fn test_entry_ending() {
        let rules = [RowPredicate::Prime; 6];
        let regions = ["000000"; 6];
        let mut grid = CrossGrid::new(&rules, &regions, &["......"; 6]).unwrap();
        grid.set_region_digit(0, 7);
        grid.shade(0, 2);
        grid.set_digit(0, 0, 1);

        assert_eq!(grid.entry_ending(0, 2), Some(&[1, 7][..]));
        assert_eq!(grid.entry_ending(0, 6), Some(&[7, 7, 7][..]));
        assert_eq!(grid.entry_ending(0, 3), None, "no shade at column 3");
        assert_eq!(grid.entry_ending(0, 0), None);

        grid.shade(0, 5);
        assert_eq!(grid.entry_ending(0, 5), None, "the last cell closes at the edge");
        assert_eq!(grid.entry_ending(0, 6), Some(&[7, 7][..]));
        assert_eq!(grid.entries(0).collect::<Vec<_>>(), vec![&[1, 7][..], &[7, 7][..]]);
    }

    #[test]
    fn test_neighbor_stays_inside() {
        let grid = small_grid();
        assert_eq!(grid.neighbor(0, 0, Direction::Left), None);
        assert_eq!(grid.neighbor(0, 0, Direction::Top), None);
        assert_eq!(grid.neighbor(0, 0, Direction::Right), Some((0, 1)));
        assert_eq!(grid.neighbor(2, 2, Direction::Bottom), None);
    }

    #[test]
    fn test_display_snapshot() {
        let mut grid = small_grid();
        grid.set_region_digit(0, 1);
        grid.set_region_digit(2, 5);
        grid.shade(2, 2);

        insta::assert_snapshot!(grid.to_string().trim_end(), @r"
        1 1 _   multiple of 11
        1 5' _   product of digits is 25
        5 5 #   prime
        ");
        assert_eq!(grid.region_layout(), "001\n021\n221");
    }
}
