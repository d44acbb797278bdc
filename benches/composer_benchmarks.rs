use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use cim_flow::{compose, decompose, AlgorithmInstance, AlgorithmRegistry};

fn wrapping_chain(registry: &AlgorithmRegistry, depth: usize) -> AlgorithmInstance {
    let mut current = registry.instantiate("learn.tree.RepTree").unwrap();
    for level in 0..depth {
        let mut wrapper = registry.instantiate("learn.meta.Bagging").unwrap();
        wrapper.set_option("I", (level + 2).to_string()).unwrap();
        wrapper.set_slot("W", current).unwrap();
        current = wrapper;
    }
    current
}

fn benchmark_compose(c: &mut Criterion) {
    let registry = AlgorithmRegistry::with_catalog();

    let mut group = c.benchmark_group("compose");
    for depth in [1usize, 4, 16, 64] {
        let instance = wrapping_chain(&registry, depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &instance, |b, instance| {
            b.iter(|| compose(black_box(instance), &[]).unwrap());
        });
    }
    group.finish();
}

fn benchmark_decompose(c: &mut Criterion) {
    let registry = AlgorithmRegistry::with_catalog();

    let mut group = c.benchmark_group("decompose");
    for depth in [1usize, 4, 16, 64] {
        let instance = wrapping_chain(&registry, depth);
        let flow = compose(&instance, &[]).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(depth), &flow, |b, flow| {
            b.iter(|| decompose(black_box(&registry), black_box(flow)).unwrap());
        });
    }
    group.finish();
}

fn benchmark_canonical_text(c: &mut Criterion) {
    let registry = AlgorithmRegistry::with_catalog();
    let flow = compose(&wrapping_chain(&registry, 16), &[]).unwrap();

    c.bench_function("canonical_text/depth_16", |b| {
        b.iter(|| black_box(&flow).canonical_text().unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_compose,
    benchmark_decompose,
    benchmark_canonical_text
);
criterion_main!(benches);
