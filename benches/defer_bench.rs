use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use deferstack::{Defer, DeferPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn benchmark_acquire_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("AcquireRelease");

    // Warm pool: every iteration reuses the same registry
    group.bench_function("local_pool_empty_scope", |b| {
        let pool = DeferPool::new();
        b.iter(|| black_box(pool.scope()));
    });

    group.bench_function("global_pool_empty_scope", |b| {
        b.iter(|| black_box(Defer::new()));
    });

    group.finish();
}

fn benchmark_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("Drain");
    let pool = DeferPool::new();
    let counter = Arc::new(AtomicUsize::new(0));

    for count in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::new("register_and_drain", count), &count, |b, &count| {
            b.iter(|| {
                let mut scope = pool.scope();
                for _ in 0..count {
                    let counter = counter.clone();
                    scope.register(move || {
                        counter.fetch_add(1, Ordering::Relaxed);
                    });
                }
            });
        });
    }

    // Every action panics; measures the cost of the failure boundary
    group.bench_function("drain_panicking_8", |b| {
        std::panic::set_hook(Box::new(|_| {}));
        b.iter(|| {
            let mut scope = pool.scope();
            for _ in 0..8 {
                scope.register(|| panic!("bench"));
            }
        });
        let _ = std::panic::take_hook();
    });

    group.finish();
}

criterion_group!(benches, benchmark_acquire_release, benchmark_drain);
criterion_main!(benches);
