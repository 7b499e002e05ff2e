//! Benchmarks for the two-phase cube solver.

use std::str::FromStr;
use std::sync::OnceLock;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use twophase::coord::CoordCube;
use twophase::facelet::FaceCube;
use twophase::{solve_cubie, verify, CubieCube, Face, SolveOptions, Tables};

const SUPERFLIP: &str = "UBULURUFURURFRBRDRFUFLFRFDFDFDLDRDBDLULBLFLDLBUBRBLBDB";

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| Tables::generate().expect("table generation must succeed"))
}

/// Scramble used by the solve benchmarks.
fn scrambled_cube() -> CubieCube {
    let mut cube = CubieCube::solved();
    for &(face, turns) in &[
        (Face::R, 1),
        (Face::U, 2),
        (Face::F, 3),
        (Face::L, 1),
        (Face::D, 2),
        (Face::B, 1),
        (Face::R, 3),
        (Face::U, 1),
        (Face::F, 2),
        (Face::D, 3),
    ] {
        cube.apply_move(face, turns);
    }
    cube
}

/// Benchmark validating a facelet string down to the cubie level.
fn bench_verify(c: &mut Criterion) {
    c.bench_function("verify_superflip", |b| {
        b.iter(|| verify(black_box(SUPERFLIP)))
    });
}

/// Benchmark parsing a facelet string into a cubie cube.
fn bench_facelet_to_cubie(c: &mut Criterion) {
    let face_cube = FaceCube::from_str(SUPERFLIP).unwrap();
    c.bench_function("facelet_to_cubie", |b| {
        b.iter(|| black_box(&face_cube).to_cubie())
    });
}

/// Benchmark computing the full coordinate vector of a cube.
fn bench_coordinates(c: &mut Criterion) {
    let cube = scrambled_cube();
    c.bench_function("coordinates_from_cubie", |b| {
        b.iter(|| CoordCube::from_cubie(black_box(&cube)))
    });
}

/// Benchmark a complete two-phase solve (tables prebuilt).
fn bench_solve(c: &mut Criterion) {
    let tables = tables();
    let cube = scrambled_cube();
    let options = SolveOptions::default();

    let mut group = c.benchmark_group("solve");
    group.sample_size(20);
    group.bench_function("ten_move_scramble", |b| {
        b.iter(|| solve_cubie(black_box(&cube), tables, &options))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_verify,
    bench_facelet_to_cubie,
    bench_coordinates,
    bench_solve
);
criterion_main!(benches);
