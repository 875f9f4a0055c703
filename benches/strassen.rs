//! Strassen Multiplication Benchmark Comparison
//!
//! Compares the naive triple loop against sequential and Rayon-parallel
//! Strassen across power-of-two matrix sizes.
//!
//! # Usage:
//! ```bash
//! # Run all benchmarks
//! cargo bench --bench strassen
//!
//! # Run a single size group
//! cargo bench --bench strassen -- strassen_256
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

use strassen_task::algebra::naive_multiply;
use strassen_task::generate::generate_random_matrix_with;
use strassen_task::{strassen_with, StrassenConfig};

/// Benchmark all implementations for a specific size - one group per size
fn bench_strassen_by_size(c: &mut Criterion) {
    let sizes = [64usize, 128, 256, 512];

    for n in sizes {
        let mut group = c.benchmark_group(format!("strassen_{n}"));
        group.sample_size(10);

        let mut rng = StdRng::seed_from_u64(42);
        let a = generate_random_matrix_with(n, &mut rng);
        let b = generate_random_matrix_with(n, &mut rng);

        let sequential = StrassenConfig::sequential().with_leaf_size(32);
        let parallel = StrassenConfig::default().with_leaf_size(32);

        if n <= 256 {
            group.bench_function("naive", |bench| {
                bench.iter(|| black_box(naive_multiply(black_box(&a), black_box(&b), n)));
            });
        }

        group.bench_function("strassen_sequential", |bench| {
            bench.iter(|| black_box(strassen_with(black_box(&a), black_box(&b), n, &sequential)));
        });

        group.bench_function("strassen_rayon", |bench| {
            bench.iter(|| black_box(strassen_with(black_box(&a), black_box(&b), n, &parallel)));
        });

        group.finish();
    }
}

/// Effect of the leaf size on parallel Strassen at a fixed dimension
fn bench_leaf_size(c: &mut Criterion) {
    let n = 256;
    let mut group = c.benchmark_group("strassen_leaf_size");
    group.sample_size(10);

    let mut rng = StdRng::seed_from_u64(7);
    let a = generate_random_matrix_with(n, &mut rng);
    let b = generate_random_matrix_with(n, &mut rng);

    for leaf_size in [2usize, 8, 32, 64] {
        let config = StrassenConfig::default().with_leaf_size(leaf_size);
        group.bench_function(format!("leaf_{leaf_size}"), |bench| {
            bench.iter(|| black_box(strassen_with(black_box(&a), black_box(&b), n, &config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strassen_by_size, bench_leaf_size);
criterion_main!(benches);
