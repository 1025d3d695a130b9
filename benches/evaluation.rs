use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evalexpr::{build_operator_tree, DefaultNumericTypes};
use neuroeq_rs::{sweep, ExpressionCache, Parser, SweepRange};
use std::collections::HashMap;
use std::num::NonZeroUsize;

const RATE: &str = "0.01*(v+55)/(1-exp(-(v+55)/10))";

/// Benchmark constant arithmetic
fn benchmark_simple_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simple arithmetic Expression Evaluation");

    let parser = Parser::new(Vec::<String>::new());
    let context = HashMap::<String, f64>::new();

    let expr = "(10 + 20) * 3 / (4 - 1) + 5";
    let parsed = parser.parse(expr).unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();

    group.bench_function("parse_and_evaluate_arithmetic", |b| {
        b.iter(|| {
            parser
                .parse(black_box(expr))
                .unwrap()
                .evaluate(&context)
                .unwrap()
        })
    });

    group.bench_function("pre_parsed_arithmetic", |b| {
        b.iter(|| black_box(&parsed).evaluate(&context).unwrap())
    });

    group.bench_function("native_rust_arithmetic", |b| {
        b.iter(|| black_box((10.0 + 20.0) * 3.0 / (4.0 - 1.0) + 5.0))
    });

    group.bench_function("meval_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(expr)).unwrap())
    });

    group.bench_function("evalexpr_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark a channel rate formula bound to a membrane potential
fn benchmark_rate_expression(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rate Expression Evaluation");

    let parser = Parser::new(["v"]);
    let parsed = parser.parse(RATE).unwrap();
    let context = HashMap::from([("v".to_string(), -65.0)]);
    let meval_rate = RATE.parse::<meval::Expr>().unwrap().bind("v").unwrap();

    group.bench_function("parse_rate", |b| {
        b.iter(|| parser.parse(black_box(RATE)).unwrap())
    });

    group.bench_function("pre_parsed_rate", |b| {
        b.iter(|| black_box(&parsed).evaluate(&context).unwrap())
    });

    group.bench_function("native_rust_rate", |b| {
        b.iter(|| {
            let v: f64 = black_box(-65.0);
            0.01 * (v + 55.0) / (1.0 - (-(v + 55.0) / 10.0).exp())
        })
    });

    group.bench_function("meval_bound_rate", |b| {
        b.iter(|| meval_rate(black_box(-65.0)))
    });
}

/// Benchmark the parsed-tree cache
fn benchmark_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("Expression Cache");

    let capacity = NonZeroUsize::new(64).unwrap();
    let mut cache = ExpressionCache::new(Parser::new(["v"]), capacity);
    cache.get_or_parse(RATE).unwrap();

    group.bench_function("cache_hit", |b| {
        b.iter(|| cache.get_or_parse(black_box(RATE)).unwrap())
    });
}

/// Benchmark a parallel sweep over the membrane potential
fn benchmark_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sweep Evaluation");

    let parsed = Parser::new(["v"]).parse(RATE).unwrap();
    let range = SweepRange::new(-100.0, 50.0, 10_000);
    let fixed = HashMap::<String, f64>::new();

    group.bench_function("sweep_10k_points", |b| {
        b.iter(|| sweep(&parsed, "v", black_box(&range), &fixed).unwrap())
    });

    group.bench_function("sequential_10k_points", |b| {
        b.iter(|| {
            range
                .values()
                .into_iter()
                .map(|v| {
                    let context = HashMap::from([("v".to_string(), v)]);
                    parsed.evaluate(&context).unwrap()
                })
                .collect::<Vec<_>>()
        })
    });
}

/// Grouping benchmarks
criterion_group!(
    benches,
    benchmark_simple_arithmetic,
    benchmark_rate_expression,
    benchmark_cache,
    benchmark_sweep,
);
criterion_main!(benches);
