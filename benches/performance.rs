//! Performance benchmarks for aggregation, grading and export

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use network_quality_tester::{
    cli::Cli,
    export_results,
    models::{MultiEndpointResult, Sample, TestResult},
    output::OutputFormatterFactory,
    stats::StatisticsAggregator,
    Config, ExportFormat, OutputCoordinator, QualityAnalyzer,
};
use std::hint::black_box;

/// Deterministic latencies with roughly one failure in ten
fn create_samples(count: usize) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            if i % 10 == 7 {
                Sample::failed("timed out", 4)
            } else {
                Sample::success_ms(20.0 + (i % 13) as f64 * 3.5, 1)
            }
        })
        .collect()
}

fn create_results(endpoints: usize, probes: usize) -> MultiEndpointResult {
    let mut multi = MultiEndpointResult::new();
    for e in 0..endpoints {
        let mut result = TestResult::new(format!("https://endpoint-{}.test", e), probes as u32);
        for sample in create_samples(probes) {
            result.add_sample(sample);
        }
        result.finalize(false);
        // Names are unique, so insertion cannot fail
        let _ = multi.insert(result);
    }
    multi
}

fn benchmark_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for size in [10, 100, 1000].iter() {
        let samples = create_samples(*size);
        group.bench_with_input(BenchmarkId::new("aggregate", size), size, |b, _| {
            b.iter(|| black_box(StatisticsAggregator::aggregate(black_box(&samples))));
        });

        let latencies: Vec<f64> = samples.iter().filter_map(|s| s.latency_ms()).collect();
        group.bench_with_input(BenchmarkId::new("jitter", size), size, |b, _| {
            b.iter(|| black_box(StatisticsAggregator::jitter(black_box(&latencies))));
        });
    }

    group.finish();
}

fn benchmark_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("quality");
    let results = create_results(20, 100);

    group.bench_function("classify", |b| {
        let summary = &results.iter().next().map(|r| r.summary.clone()).unwrap_or_default();
        b.iter(|| black_box(QualityAnalyzer::classify(black_box(summary))));
    });

    group.bench_function("compare_20_endpoints", |b| {
        b.iter(|| black_box(QualityAnalyzer::compare(black_box(&results))));
    });

    group.finish();
}

fn benchmark_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("output");
    let results = create_results(5, 50);

    group.bench_function("export_json", |b| {
        b.iter(|| black_box(export_results(black_box(&results), ExportFormat::Json)));
    });

    group.bench_function("render_plain_report", |b| {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_formatter(false, false));
        b.iter(|| black_box(coordinator.display_results(black_box(&results))));
    });

    group.finish();
}

fn benchmark_config(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");

    group.bench_function("parse_cli_args", |b| {
        let args = ["nqt", "--url", "https://example.com", "--count", "5", "--timeout-ms", "2000"];
        b.iter(|| black_box(Cli::try_parse_from(black_box(args))));
    });

    group.bench_function("validate_config", |b| {
        let config = Config::default();
        b.iter(|| black_box(config.validate()));
    });

    group.finish();
}

criterion_group!(benches, benchmark_aggregation, benchmark_quality, benchmark_output, benchmark_config);

criterion_main!(benches);
