//! # Resolver Benchmarks
//!
//! Per-frame cost of engine commands and slot resolution.
//!
//! Run with: `cargo bench -p stagewise-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use stagewise_core::{StageStatusResolver, TransitionEngine, stage_status};
use std::hint::black_box;
use std::time::Duration;

/// Walk an engine of `size` stages to the end and back, one commit per step.
fn walk_flow(size: usize) -> TransitionEngine {
    let mut engine = TransitionEngine::new(size, Duration::from_millis(600)).expect("engine");
    let mut now = 0u64;

    while engine.go_forward(now).is_accepted() {
        now += 600;
        engine.tick(now);
    }
    while engine.go_backward(now).is_accepted() {
        now += 600;
        engine.tick(now);
    }

    engine
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_engine_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_walk");

    for size in [4, 64, 1024].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(walk_flow(size)));
        });
    }

    group.finish();
}

fn bench_resolve_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_frame");

    for size in [4, 64, 1024].iter() {
        let mut engine = TransitionEngine::new(*size, Duration::from_millis(600)).expect("engine");
        engine.go_forward(0);
        let state = engine.state();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut resolver = StageStatusResolver::new(size);
            b.iter(|| black_box(resolver.resolve(&state)));
        });
    }

    group.finish();
}

fn bench_stage_status(c: &mut Criterion) {
    let mut engine = TransitionEngine::new(8, Duration::from_millis(600)).expect("engine");
    engine.go_to(5, 0);
    let state = engine.state();

    c.bench_function("stage_status_8", |b| {
        b.iter(|| {
            for idx in 0..8 {
                black_box(stage_status(black_box(idx), &state));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_engine_walk,
    bench_resolve_frame,
    bench_stage_status
);
criterion_main!(benches);
