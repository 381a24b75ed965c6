use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polylut::{FunctionContainer, LookupTable, LookupTableParameters, TableKind, TableRegistry};
use std::hint::black_box;

const MIN: f64 = -3.0;
const MAX: f64 = 3.0;

fn exp() -> FunctionContainer<f64> {
    FunctionContainer::new(f64::exp)
        .with_derivatives(7, |x, out: &mut [f64]| out.fill(x.exp()))
        .expect("Failed to attach derivatives")
}

fn arguments(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| MIN + (MAX - MIN) * (i as f64 + 0.5) / n as f64)
        .collect()
}

fn build(registry: &TableRegistry, name: &str, step: f64) -> Box<dyn LookupTable<f64>> {
    let kind: TableKind = name.parse().expect("Unknown table kind");
    registry
        .create(kind, &exp(), LookupTableParameters::new(MIN, MAX, step))
        .expect("Failed to build table")
}

fn criterion_benchmark(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();
    let registry = TableRegistry::standard();
    let xs = arguments(10_000);

    //
    // Evaluation cost per kind, same grid for all of them
    println!("Benchmarking evaluation vs kind (step=0.01, n=10_000)...");
    let mut group = c.benchmark_group("evaluate_vs_kind");
    group.throughput(Throughput::Elements(xs.len() as u64));
    for name in [
        "UniformLinearRawInterpTable",
        "UniformEqSpaceInterpTable<1>",
        "UniformEqSpaceInterpTable<3>",
        "UniformChebyInterpTable<3>",
        "UniformTaylorTable<5>",
        "UniformCubicHermiteTable",
        "UniformPadeTable<2,2>",
        "NonUniformEqSpaceInterpTable<3>",
        "NonUniformCubicHermiteTable",
    ] {
        let table = build(&registry, name, 0.01);
        group.bench_function(name, |b| {
            b.iter(|| xs.iter().map(|&x| table.evaluate(black_box(x))).sum::<f64>());
        });
    }
    group.finish();

    //
    // Reference point: the function itself
    let mut group = c.benchmark_group("evaluate_direct");
    group.throughput(Throughput::Elements(xs.len() as u64));
    group.bench_function("f64::exp", |b| {
        b.iter(|| xs.iter().map(|&x| black_box(x).exp()).sum::<f64>());
    });
    group.finish();

    //
    // Construction cost as the grid gets finer
    println!("Benchmarking construction vs step (UniformEqSpaceInterpTable<3>)...");
    let mut group = c.benchmark_group("build_vs_step");
    for step in [0.1, 0.01, 0.001] {
        group.bench_with_input(BenchmarkId::from_parameter(step), &step, |b, &step| {
            b.iter(|| build(&registry, "UniformEqSpaceInterpTable<3>", black_box(step)));
        });
    }
    group.finish();

    //
    // Construction cost per kind
    println!("Benchmarking construction vs kind (step=0.01)...");
    let mut group = c.benchmark_group("build_vs_kind");
    for name in [
        "UniformEqSpaceInterpTable<3>",
        "UniformTaylorTable<3>",
        "UniformPadeTable<2,2>",
        "NonUniformEqSpaceInterpTable<3>",
    ] {
        group.bench_function(name, |b| b.iter(|| build(&registry, name, black_box(0.01))));
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
