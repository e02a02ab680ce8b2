//! Benchmarks for the mutation hot path.
//!
//! Run with: cargo bench -p detective --bench tracking_bench

use criterion::{Criterion, criterion_group, criterion_main};
use detective::{Config, Object, Options, Value};
use std::hint::black_box;

fn nested(depth: usize) -> Object {
    let mut object = Object::new().with("leaf", 0);
    for _ in 0..depth {
        object = Object::new().with("child", object);
    }
    object
}

// =============================================================================
// Root-level writes
// =============================================================================

fn bench_root_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking/root");

    group.bench_function("set_unchanged", |b| {
        let tracked = Config::new().track(Object::new().with("a", 1));
        b.iter(|| black_box(tracked.set("a", 1)));
    });

    group.bench_function("set_changed", |b| {
        let tracked = Config::new().track(Object::new().with("a", 0));
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            black_box(tracked.set("a", n));
        });
    });

    group.bench_function("set_with_adding", |b| {
        let options = Options::default().with_property_adding(true);
        let tracked = Config::new().with_options(options).track(Object::new());
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            black_box(tracked.set("a", n));
        });
    });

    group.finish();
}

// =============================================================================
// Deep writes
// =============================================================================

fn bench_deep_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking/deep");

    for depth in [1usize, 4, 16] {
        group.bench_function(format!("depth_{depth}"), |b| {
            let tracked = Config::new().track(nested(depth));
            let mut n = 0i64;
            b.iter(|| {
                let mut cursor = tracked.clone();
                for _ in 0..depth {
                    if let Some(child) = cursor.at("child") {
                        cursor = child;
                    }
                }
                n += 1;
                black_box(cursor.set("leaf", n));
            });
        });
    }

    group.finish();
}

// =============================================================================
// Loose comparison
// =============================================================================

fn bench_loose_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking/loose");

    let wide = |n: usize| (0..n).map(|i| (i.to_string(), Value::from(i))).collect::<Object>();
    let options = Options::default().with_strict_comparison(false);

    group.bench_function("structurally_equal_64", |b| {
        let tracked = Config::new()
            .with_options(options)
            .track(Object::new().with("a", wide(64)));
        b.iter(|| black_box(tracked.set("a", wide(64))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_root_writes,
    bench_deep_writes,
    bench_loose_comparison
);
criterion_main!(benches);
