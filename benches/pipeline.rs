/// Pipeline Benchmarks
///
/// Measures ingestion, aggregation and report assembly on synthetic result
/// tables shaped like a real benchmark sweep (sizes 16..4096, workers 1..32,
/// several iterations per configuration).
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parscale::aggregate::{Aggregator, InvalidTimingPolicy};
use parscale::config::AnalysisConfig;
use parscale::ingest::parse_trials;
use parscale::record::{Execution, ExecutionMode, TrialRecord};
use parscale::report::{AnalysisKind, Dataset, ReportBuilder};
use std::fmt::Write;
use std::time::Duration;

const SIZES: [u64; 9] = [16, 32, 64, 128, 256, 512, 1024, 2048, 4096];
const WORKERS: [u32; 6] = [1, 2, 4, 8, 16, 32];

/// Synthetic timing: cubic in n, ideal scaling in p
fn synthetic_time(n: u64, p: u32, iteration: i64) -> f64 {
    let base = (n as f64).powi(3) * 1e-9;
    base / p as f64 * (1.0 + iteration as f64 * 0.01)
}

fn synthetic_csv(mode: ExecutionMode, iterations: i64) -> String {
    let mut csv = String::new();
    match mode.worker_column() {
        Some(column) => {
            let _ = writeln!(
                csv,
                "{},n_matrix,iteration,checksym_time,transpose_time",
                column
            );
            for &p in &WORKERS {
                for &n in &SIZES {
                    for i in 0..iterations {
                        let t = synthetic_time(n, p, i);
                        let _ = writeln!(csv, "{},{},{},{},{}", p, n, i, t, 2.0 * t);
                    }
                }
            }
        }
        None => {
            let _ = writeln!(csv, "n_matrix,iteration,checksym_time,transpose_time");
            for &n in &SIZES {
                for i in 0..iterations {
                    let t = synthetic_time(n, 1, i);
                    let _ = writeln!(csv, "{},{},{},{}", n, i, t, 2.0 * t);
                }
            }
        }
    }
    csv
}

fn synthetic_trials(iterations: i64) -> Vec<TrialRecord> {
    let mut trials = Vec::new();
    for mode in ExecutionMode::PARALLEL {
        for &p in &WORKERS {
            for &n in &SIZES {
                for i in 0..iterations {
                    let t = synthetic_time(n, p, i);
                    trials.push(TrialRecord::new(Execution::new(mode, p), n, i, t, 2.0 * t));
                }
            }
        }
    }
    trials
}

/// Benchmark: CSV parsing of one OMP table
fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    group.measurement_time(Duration::from_secs(5));

    for iterations in [1i64, 10, 50] {
        let csv = synthetic_csv(ExecutionMode::SharedMemory, iterations);
        group.throughput(Throughput::Bytes(csv.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(iterations), &csv, |b, csv| {
            b.iter(|| {
                let loaded = parse_trials(csv.as_bytes(), ExecutionMode::SharedMemory, "bench")
                    .expect("synthetic table parses");
                black_box(loaded);
            });
        });
    }

    group.finish();
}

/// Benchmark: grouping trials into mean timings
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    group.measurement_time(Duration::from_secs(5));

    for iterations in [1i64, 10, 50] {
        let trials = synthetic_trials(iterations);
        group.throughput(Throughput::Elements(trials.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &trials,
            |b, trials| {
                let aggregator = Aggregator::new(InvalidTimingPolicy::Reject);
                b.iter(|| black_box(aggregator.aggregate(black_box(trials))));
            },
        );
    }

    group.finish();
}

/// Benchmark: every analysis over all three modes
fn bench_full_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    group.measurement_time(Duration::from_secs(5));

    let tables = ExecutionMode::ALL
        .iter()
        .map(|&mode| {
            parse_trials(synthetic_csv(mode, 10).as_bytes(), mode, "bench")
                .expect("synthetic table parses")
        })
        .collect();
    let dataset = Dataset::from_tables(tables, InvalidTimingPolicy::Reject);
    let config = AnalysisConfig::default();

    group.bench_function("all_analyses", |b| {
        b.iter(|| {
            let report = ReportBuilder::new(&dataset, &config).build(&AnalysisKind::ALL);
            black_box(report);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_ingest, bench_aggregate, bench_full_report);

criterion_main!(benches);
