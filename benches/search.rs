//! Benchmarks for the chain, the metrics and the full search.
//!
//! - `Cube::walk_to_valid`: one chain repair cycle
//! - `rectangle_imbalance`: scoring a full square
//! - `search`: one target with a small cycle budget

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use latin_balance::{Cube, Grid, SearchParams, Target, rectangle_imbalance, search};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const ORDERS: &[usize] = &[4, 7, 10];

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk_to_valid");
    for &n in ORDERS {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut cube = Cube::from_grid(&Grid::new_cyclic(n)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(cube.walk_to_valid(&mut rng).unwrap()))
        });
    }
    group.finish();
}

fn bench_imbalance(c: &mut Criterion) {
    let mut group = c.benchmark_group("rectangle_imbalance");
    for &n in ORDERS {
        let sq = Grid::new_cyclic(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &sq, |b, sq| {
            b.iter(|| black_box(rectangle_imbalance(sq).unwrap()))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let params = SearchParams {
        outer_cycles: 10,
        ..Default::default()
    };
    c.bench_function("search_k4_n7", |b| {
        b.iter(|| {
            let mut rng = ChaCha20Rng::seed_from_u64(42);
            let outcome = search(Target { rows: 4, symbols: 7 }, &mut rng, &params).unwrap();
            black_box(outcome.score)
        })
    });
}

criterion_group!(benches, bench_walk, bench_imbalance, bench_search);
criterion_main!(benches);
