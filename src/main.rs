//! Puzzle solver CLI
//!
//! Solves Hall of Mirrors grids given their boundary clues, completes the
//! nine partridge tilings of "some ones somewhere", and fills the
//! cross-number grids.

use clap::{Parser, Subcommand};
use log::info;

use puzzles::grid::{MirrorGrid, Number};
use puzzles::instances::{self, CrossInstance, MirrorInstance, OnesReport};
use puzzles::solver;
use puzzles::{CrossGrid, CrossSolver, PuzzleError};

/// Backtracking solvers for mirror grids, partridge tilings and cross-numbers.
#[derive(Parser)]
#[command(name = "puzzles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log search progress (`RUST_LOG` overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a Hall of Mirrors grid. Without sides, solves the 5x5 and 10x10 examples.
    Mirrors(MirrorArgs),
    /// Complete the nine partridge tilings and spell out where the ones are.
    Partridge,
    /// Fill the 5x5 cross-number example, or the full 11x11 grid.
    Cross(CrossArgs),
}

#[derive(clap::Args)]
struct CrossArgs {
    /// Solve the 11x11 grid, starting from its known region digits.
    #[arg(long)]
    large: bool,
}

#[derive(clap::Args)]
struct MirrorArgs {
    /// Left clues, top to bottom, 0 for unknown.
    #[arg(short, long, value_delimiter = ',')]
    left: Vec<Number>,
    /// Top clues, left to right.
    #[arg(short, long, value_delimiter = ',')]
    top: Vec<Number>,
    /// Right clues, top to bottom.
    #[arg(short, long, value_delimiter = ',')]
    right: Vec<Number>,
    /// Bottom clues, left to right.
    #[arg(short, long, value_delimiter = ',')]
    bottom: Vec<Number>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Some(Command::Mirrors(args)) => run_mirrors(&args),
        Some(Command::Partridge) => run_partridge(),
        Some(Command::Cross(args)) => run_cross(&args),
        None => {
            // default: both examples
            run_mirrors(&MirrorArgs {
                left: Vec::new(),
                top: Vec::new(),
                right: Vec::new(),
                bottom: Vec::new(),
            });
        }
    }
}

/// Solves the grid given on the command line, or the built-in examples.
fn run_mirrors(args: &MirrorArgs) {
    let no_sides =
        args.left.is_empty() && args.top.is_empty() && args.right.is_empty() && args.bottom.is_empty();

    let grids: Result<Vec<MirrorGrid>, _> = if no_sides {
        [instances::MIRRORS_5, instances::MIRRORS_10]
            .iter()
            .map(MirrorInstance::grid)
            .collect()
    } else {
        MirrorGrid::new(&args.left, &args.top, &args.right, &args.bottom).map(|grid| vec![grid])
    };

    let grids = match grids {
        Ok(grids) => grids,
        Err(e) => {
            eprintln!("Invalid grid: {}", e);
            std::process::exit(1);
        }
    };

    for mut grid in grids {
        info!("Solving a {0}x{0} grid", grid.length());
        println!("{}", solve_and_report(&mut grid));
    }
}

/// Solves `grid` and renders it with the result line.
fn solve_and_report(grid: &mut MirrorGrid) -> String {
    if !solver::solve(grid) {
        return format!("{grid}No solution found");
    }

    let result = grid.compute_result();
    format!(
        "{grid}Left: {}, Top: {}, Right: {}, Bottom: {}, Product: {}",
        result.left, result.top, result.right, result.bottom, result.product
    )
}

/// Completes the nine tilings in parallel and prints the letter pairs.
fn run_partridge() {
    match instances::solve_ones_configs() {
        Ok(reports) => println!("{}", format_reports(&reports)),
        Err(e) => {
            eprintln!("Failed to complete the tilings: {}", e);
            std::process::exit(1);
        }
    }
}

/// Solves the chosen cross-number grid and prints its entries.
fn run_cross(args: &CrossArgs) {
    let instance = if args.large { instances::CROSS_11 } else { instances::CROSS_5 };
    match solve_cross(&instance) {
        Ok(report) => println!("{report}"),
        Err(e) => {
            eprintln!("Failed to solve the cross-number grid: {}", e);
            std::process::exit(1);
        }
    }
}

fn solve_cross(instance: &CrossInstance) -> Result<String, PuzzleError> {
    let mut grid: CrossGrid = instance.grid()?;
    let mut solver = CrossSolver::new();
    info!("Solving a {0}x{0} cross-number grid", grid.size());

    let solved = match instance.region_digits {
        Some(digits) => solver.solve_with_region_digits(&mut grid, digits)?,
        None => solver.solve(&mut grid),
    };
    if !solved {
        return Ok(format!("{grid}No solution found"));
    }

    let numbers: Vec<String> = solver.sorted_numbers().iter().map(u64::to_string).collect();
    Ok(format!("{grid}Numbers: {}\nSum: {}", numbers.join(", "), solver.total()))
}

fn format_reports(reports: &[OnesReport]) -> String {
    let mut output = String::new();
    for report in reports {
        let (row, col) = (report.config / instances::BOARD_COLS, report.config % instances::BOARD_COLS);
        output.push_str(&format!("Tiling ({row},{col}): {} completions", report.solutions));
        if let Some(one) = report.one {
            output.push_str(&format!(", one at ({}, {})", one.row, one.col));
        }
        output.push('\n');
    }

    let pairs: Vec<String> = reports
        .iter()
        .map(|report| match report.letters() {
            Some((a, b)) => format!("{a}{b}"),
            None => "--".to_string(),
        })
        .collect();
    output.push_str(&format!("The solution is: {}", pairs.join(" ")));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzles::tiling::SquareTile;

    #[test]
    fn test_mirrors_report_snapshot() {
        let mut grid = instances::MIRRORS_5.grid().unwrap();
        let report = solve_and_report(&mut grid);
        let last = report.lines().last().unwrap();

        insta::assert_snapshot!(last, @"Left: 22, Top: 55, Right: 83, Bottom: 18, Product: 1807740");
    }

    #[test]
    fn test_unsolvable_report() {
        let mut grid = MirrorGrid::new(&[7, 0, 0], &[0, 0, 0], &[0, 0, 0], &[0, 0, 0]).unwrap();
        assert!(solve_and_report(&mut grid).ends_with("No solution found"));
    }

    #[test]
    fn test_cli_parses_comma_lists() {
        let cli = Cli::try_parse_from([
            "puzzles", "mirrors", "-l", "0,0,0,16,0", "-t", "0,0,9,0,0", "-r", "0,75,0,0,0", "-b",
            "0,0,36,0,0",
        ])
        .unwrap();
        let Some(Command::Mirrors(args)) = cli.command else {
            panic!("expected the mirrors subcommand");
        };
        assert_eq!(args.left, instances::MIRRORS_5.left);
        assert_eq!(args.bottom, instances::MIRRORS_5.bottom);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_mismatched_sides_rejected() {
        assert!(MirrorGrid::new(&[0, 0], &[0, 0, 0], &[0, 0], &[0, 0]).is_err());
    }

    #[test]
    fn test_cross_report() {
        let report = solve_cross(&instances::CROSS_5).unwrap();
        let tail: Vec<&str> = report.lines().rev().take(2).collect();

        insta::assert_snapshot!(tail.join("\n"), @r"
        Sum: 107639
        Numbers: 55, 56, 84, 88, 2576, 5555, 99225
        ");
    }

    #[test]
    fn test_cli_parses_cross() {
        let cli = Cli::try_parse_from(["puzzles", "cross", "--large", "-v"]).unwrap();
        let Some(Command::Cross(args)) = cli.command else {
            panic!("expected the cross subcommand");
        };
        assert!(args.large);
        assert!(cli.verbose);
    }

    #[test]
    fn test_partridge_report_format() {
        let reports = [
            OnesReport {
                config: 0,
                solutions: 1,
                one: Some(SquareTile::new(1, 2, 30)),
            },
            OnesReport {
                config: 1,
                solutions: 3,
                one: None,
            },
        ];

        insta::assert_snapshot!(format_reports(&reports), @r"
        Tiling (0,0): 1 completions, one at (2, 30)
        Tiling (0,1): 3 completions
        The solution is: CE --
        ");
    }
}
