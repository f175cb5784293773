//! Directions, mirror kinds and laser movement on a square grid.
//!
//! Rows grow downwards and columns grow to the right. A `Direction` is used
//! both as a heading (where a laser is travelling) and as a side of the grid
//! (which border a clue sits on). The two meanings are tied together by
//! `Direction::reverse`: a laser entering from the `Left` side heads `Right`.

use std::fmt;

/// Heading of a laser, or side of the grid.
///
/// The discriminants index the lookup tables below and the boundary storage
/// of `MirrorGrid` (side-major, `side * n + index`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Invalid = 4,
}

/// Kind of mirror occupying a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MirrorKind {
    #[default]
    None = 0,
    /// `\`: top-left to bottom-right.
    Backslash = 1,
    /// `/`: bottom-left to top-right.
    Slash = 2,
}

/// Unit step `(d_row, d_col)` for each heading.
const DIRECTION_VECTORS: [(i32, i32); 5] = [(0, -1), (-1, 0), (0, 1), (1, 0), (0, 0)];

const REVERSED: [Direction; 5] = [
    Direction::Right,
    Direction::Bottom,
    Direction::Left,
    Direction::Top,
    Direction::Invalid,
];

/// New heading after meeting a mirror, indexed `[mirror][heading]`.
const REFLECTIONS: [[Direction; 5]; 3] = {
    use Direction::*;
    [
        [Left, Top, Right, Bottom, Invalid], // none: keep going
        [Top, Left, Bottom, Right, Invalid], // backslash
        [Bottom, Right, Top, Left, Invalid], // slash
    ]
};

/// Mirror that turns a laser arriving with `[heading]` towards the grid
/// `[side]` it sits next to, indexed `[side][heading]`. `None` when no
/// single mirror can do it (parallel to the side, or heading straight out).
const TERMINAL_MIRRORS: [[MirrorKind; 5]; 5] = {
    use MirrorKind::*;
    [
        [None, Backslash, None, Slash, None],
        [Backslash, None, Slash, None, None],
        [None, Slash, None, Backslash, None],
        [Slash, None, Backslash, None, None],
        [None, None, None, None, None],
    ]
};

impl Direction {
    /// The four sides in boundary storage order.
    pub const SIDES: [Direction; 4] = [
        Direction::Left,
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn vector(self) -> (i32, i32) {
        DIRECTION_VECTORS[self as usize]
    }

    #[inline(always)]
    pub const fn reverse(self) -> Direction {
        REVERSED[self as usize]
    }

    /// True for `Left` and `Right`, whose boundary slots are indexed by row.
    #[inline(always)]
    pub const fn indexes_rows(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

impl MirrorKind {
    /// Both real mirror kinds, in the order the solver tries them.
    pub const BOTH: [MirrorKind; 2] = [MirrorKind::Backslash, MirrorKind::Slash];

    /// Heading after a laser travelling `heading` meets this mirror.
    #[inline(always)]
    pub const fn reflect(self, heading: Direction) -> Direction {
        REFLECTIONS[self as usize][heading as usize]
    }

    /// The mirror that sends a laser travelling `heading` out through `side`.
    #[inline(always)]
    pub const fn terminal(side: Direction, heading: Direction) -> MirrorKind {
        TERMINAL_MIRRORS[side as usize][heading as usize]
    }

    pub const fn symbol(self) -> char {
        match self {
            MirrorKind::None => '.',
            MirrorKind::Backslash => '\\',
            MirrorKind::Slash => '/',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "Left",
            Direction::Top => "Top",
            Direction::Right => "Right",
            Direction::Bottom => "Bottom",
            Direction::Invalid => "Invalid",
        };
        f.write_str(name)
    }
}

impl fmt::Display for MirrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MirrorKind::None => "none",
            MirrorKind::Backslash => "\\",
            MirrorKind::Slash => "/",
        };
        f.write_str(name)
    }
}

/// Position and heading of a simulated laser.
///
/// Positions outside the grid are meaningful: the ring just outside holds
/// the clue cells where lasers enter and leave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaserPosition {
    pub row: i32,
    pub col: i32,
    pub dir: Direction,
}

impl LaserPosition {
    /// The clue cell of slot `index` on `side`, heading into the grid.
    pub const fn entry(side: Direction, index: i32, length: i32) -> LaserPosition {
        let dir = side.reverse();
        match side {
            Direction::Left => LaserPosition { row: index, col: -1, dir },
            Direction::Top => LaserPosition { row: -1, col: index, dir },
            Direction::Right => LaserPosition { row: index, col: length, dir },
            Direction::Bottom => LaserPosition { row: length, col: index, dir },
            Direction::Invalid => LaserPosition {
                row: i32::MIN,
                col: i32::MIN,
                dir: Direction::Invalid,
            },
        }
    }

    /// One step along the current heading.
    #[inline(always)]
    pub const fn advance(self) -> LaserPosition {
        let (d_row, d_col) = self.dir.vector();
        LaserPosition {
            row: self.row + d_row,
            col: self.col + d_col,
            dir: self.dir,
        }
    }

    /// Where the laser is after turning on `mirror` at this cell and then
    /// travelling `dist` cells. `MirrorKind::None` keeps the heading.
    #[inline(always)]
    pub const fn after_mirror(self, mirror: MirrorKind, dist: i32) -> LaserPosition {
        let dir = mirror.reflect(self.dir);
        let (d_row, d_col) = dir.vector();
        LaserPosition {
            row: self.row + d_row * dist,
            col: self.col + d_col * dist,
            dir,
        }
    }

    /// Manhattan distance to another position.
    #[inline(always)]
    pub const fn distance(self, other: LaserPosition) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}
