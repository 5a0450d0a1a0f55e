//! Criterion benchmarks for the per-tick coupling pass.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use morpho_bench::{reference_config, reference_tissue};
use morpho_core::{TickContext, TickId};
use morpho_coupler::Coupler;
use morpho_engine::LockstepSimulation;
use morpho_test_utils::StaticTissue;

fn attached(parallel_threshold: usize) -> (Coupler, StaticTissue) {
    let mut tissue = reference_tissue(42);
    let mut coupler = Coupler::builder()
        .seed(42)
        .parallel_threshold(parallel_threshold)
        .build()
        .unwrap();
    coupler.attach(&mut tissue, 0.0).unwrap();
    (coupler, tissue)
}

/// Benchmark: one coupling pass over 2500 agents, integrating on one thread.
fn bench_couple_2500_sequential(c: &mut Criterion) {
    let (mut coupler, mut tissue) = attached(usize::MAX);
    let mut tick = TickId(0);

    c.bench_function("couple_2500_sequential", |b| {
        b.iter(|| {
            tick = tick.next();
            let ctx = TickContext::at(tick, 0.0, 0.01);
            black_box(coupler.couple(&mut tissue, &ctx).unwrap());
        });
    });
}

/// Benchmark: the same pass with integration on the rayon pool.
fn bench_couple_2500_parallel(c: &mut Criterion) {
    let (mut coupler, mut tissue) = attached(0);
    let mut tick = TickId(0);

    c.bench_function("couple_2500_parallel", |b| {
        b.iter(|| {
            tick = tick.next();
            let ctx = TickContext::at(tick, 0.0, 0.01);
            black_box(coupler.couple(&mut tissue, &ctx).unwrap());
        });
    });
}

/// Benchmark: a full lockstep run of 100 ticks without export.
fn bench_lockstep_100_ticks(c: &mut Criterion) {
    c.bench_function("lockstep_100_ticks", |b| {
        b.iter(|| {
            let mut sim =
                LockstepSimulation::new(reference_config(42), reference_tissue(42)).unwrap();
            while !sim.is_finished() {
                sim.step().unwrap();
            }
            black_box(sim.coupler().state_hash());
        });
    });
}

criterion_group!(
    benches,
    bench_couple_2500_sequential,
    bench_couple_2500_parallel,
    bench_lockstep_100_ticks
);
criterion_main!(benches);
