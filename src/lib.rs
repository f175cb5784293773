//! Backtracking puzzle solvers.
//!
//! - Hall of Mirrors: recover the mirrors hidden in a square grid from the
//!   laser-path products written around its border (`grid`, `solver`)
//! - Partridge tilings: complete a partially tiled partridge square
//!   (`tiling`, `tiling_solver`), several configurations at once (`workers`)
//! - Cross-numbers: pick region digits and shade cells until every row
//!   reads as numbers obeying its rule (`cross_grid`, `cross_solver`)

pub mod cross_grid;
pub mod cross_predicates;
pub mod cross_solver;
pub mod error;
pub mod factorize;
pub mod geometry;
pub mod grid;
pub mod instances;
pub mod restore;
pub mod solver;
pub mod tiling;
pub mod tiling_solver;
pub mod workers;

pub use cross_grid::CrossGrid;
pub use cross_solver::CrossSolver;
pub use error::PuzzleError;
pub use grid::{GridResult, MirrorGrid};
pub use solver::MirrorSolver;
pub use tiling::{PartridgeTiling, SquareTile};
pub use tiling_solver::TilingSolver;
