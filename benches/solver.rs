//! Benchmarks for the mirror, tiling and cross-number solvers.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use puzzles::factorize::Factorizations;
use puzzles::geometry::Direction;
use puzzles::instances::{CROSS_5, MIRRORS_10, MIRRORS_5, ONES_CONFIGS};
use puzzles::solver;
use puzzles::tiling::Partridge9;
use puzzles::{CrossSolver, TilingSolver};

/// Benchmark solving the 5x5 example from scratch.
fn bench_solve_5x5(c: &mut Criterion) {
    let grid = MIRRORS_5.grid().unwrap();

    c.bench_function("solve_mirrors_5x5", |b| {
        b.iter(|| {
            let mut grid = black_box(&grid).clone();
            solver::solve(&mut grid)
        })
    });
}

/// Benchmark solving the full 10x10 puzzle.
fn bench_solve_10x10(c: &mut Criterion) {
    let grid = MIRRORS_10.grid().unwrap();

    let mut group = c.benchmark_group("mirrors_10x10");
    group.sample_size(20);
    group.bench_function("solve", |b| {
        b.iter(|| {
            let mut grid = black_box(&grid).clone();
            solver::solve(&mut grid)
        })
    });
    group.finish();
}

/// Benchmark enumerating factorizations of a highly composite clue.
fn bench_factorizations(c: &mut Criterion) {
    c.bench_function("factorizations_2025", |b| {
        b.iter(|| Factorizations::new(black_box(2025), black_box(10)))
    });
}

/// Benchmark tracing every laser through a solved grid.
fn bench_trace(c: &mut Criterion) {
    let mut grid = MIRRORS_10.grid().unwrap();
    solver::solve(&mut grid);

    c.bench_function("trace_all_10x10", |b| {
        b.iter(|| {
            Direction::SIDES
                .iter()
                .flat_map(|&side| (0..10).map(move |i| (side, i)))
                .map(|(side, i)| black_box(&grid).trace(side, i).0)
                .sum::<u64>()
        })
    });
}

/// Benchmark completing the partridge configuration with a unique tiling.
fn bench_complete_tiling(c: &mut Criterion) {
    let start = Partridge9::from_tiles(ONES_CONFIGS[2]).unwrap();

    let mut group = c.benchmark_group("partridge");
    group.sample_size(10);
    group.bench_function("complete_config_3", |b| {
        b.iter(|| TilingSolver::new(black_box(start)).find_all())
    });
    group.finish();
}

/// Benchmark filling the 5x5 cross-number example.
fn bench_cross_5x5(c: &mut Criterion) {
    let grid = CROSS_5.grid().unwrap();

    c.bench_function("solve_cross_5x5", |b| {
        b.iter(|| {
            let mut grid = black_box(&grid).clone();
            CrossSolver::new().solve(&mut grid)
        })
    });
}

criterion_group!(
    benches,
    bench_solve_5x5,
    bench_solve_10x10,
    bench_factorizations,
    bench_trace,
    bench_complete_tiling,
    bench_cross_5x5
);
criterion_main!(benches);
