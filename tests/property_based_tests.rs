//! Property-based tests for aggregation and metric invariants

use parscale::aggregate::{Aggregator, InvalidTimingPolicy};
use parscale::config::AnalysisConfig;
use parscale::ingest::LoadedTable;
use parscale::json_output::JsonOutput;
use parscale::metrics::{MetricEngine, MetricPolicy};
use parscale::record::{Execution, ExecutionMode, Operation, TrialRecord};
use parscale::report::{AnalysisKind, Dataset, ReportBuilder};
use proptest::prelude::*;

fn trial(
    worker_count: u32,
    problem_size: u64,
    iteration: i64,
    checksym: f64,
    transpose: f64,
) -> TrialRecord {
    TrialRecord::new(
        Execution::new(ExecutionMode::SharedMemory, worker_count),
        problem_size,
        iteration,
        checksym,
        transpose,
    )
}

/// Equal up to summation-order rounding
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

prop_compose! {
    fn arb_trial()(
        worker_count in prop::sample::select(vec![1u32, 2, 4, 8]),
        problem_size in prop::sample::select(vec![256u64, 512, 1024]),
        iteration in 0i64..5,
        checksym in 0.0f64..100.0,
        transpose in 0.0f64..100.0,
    ) -> TrialRecord {
        trial(worker_count, problem_size, iteration, checksym, transpose)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_group_mean_is_sum_over_count(trials in prop::collection::vec(arb_trial(), 1..60)) {
        // Property: each group mean equals the plain sum divided by sample_count
        let table = Aggregator::default().aggregate(&trials);

        for record in table.iter() {
            let group: Vec<&TrialRecord> = trials
                .iter()
                .filter(|t| {
                    t.worker_count() == record.worker_count
                        && t.problem_size == record.problem_size
                })
                .collect();
            prop_assert_eq!(group.len(), record.sample_count);
            let sum: f64 = group.iter().map(|t| t.checksym_time).sum();
            let expected = sum / group.len() as f64;
            prop_assert!(close(record.mean_checksym_time, expected));
        }
    }

    #[test]
    fn prop_aggregation_is_order_independent(
        trials in prop::collection::vec(arb_trial(), 1..60),
        seed in any::<u64>(),
    ) {
        // Property: any permutation of the input yields the same groups
        let mut shuffled = trials.clone();
        let len = shuffled.len();
        let mut state = seed;
        for i in (1..len).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            shuffled.swap(i, j);
        }

        let a = Aggregator::default().aggregate(&trials);
        let b = Aggregator::default().aggregate(&shuffled);
        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            prop_assert_eq!(x.key(), y.key());
            prop_assert_eq!(x.sample_count, y.sample_count);
            prop_assert!(close(x.mean_checksym_time, y.mean_checksym_time));
            prop_assert!(close(x.mean_transpose_time, y.mean_transpose_time));
        }
    }

    #[test]
    fn prop_single_record_group_is_identity(
        checksym in 0.0f64..1e6,
        transpose in 0.0f64..1e6,
        worker_count in 1u32..64,
    ) {
        // Property: a group of one keeps the value and counts one sample
        let single = trial(worker_count, 1024, 0, checksym, transpose);
        let table = Aggregator::default().aggregate(&[single]);
        let record = table.get(ExecutionMode::SharedMemory, worker_count, 1024).unwrap();
        prop_assert_eq!(record.mean_checksym_time, checksym);
        prop_assert_eq!(record.mean_transpose_time, transpose);
        prop_assert_eq!(record.sample_count, 1);
    }

    #[test]
    fn prop_baseline_point_is_idempotent(
        baseline in 1e-6f64..1e6,
        others in prop::collection::vec((2u32..64, 1e-6f64..1e6), 0..8),
    ) {
        // Property: speedup(1) == 1 and efficiency(1) == 100 whenever a baseline exists
        let mut trials = vec![trial(1, 2048, 0, baseline, baseline)];
        trials.extend(others.iter().map(|&(p, t)| trial(p, 2048, 0, t, t)));
        let table = Aggregator::default().aggregate(&trials);

        for policy in [MetricPolicy::StrongScaling, MetricPolicy::Comparison] {
            let samples = MetricEngine::new(policy)
                .partition(&table, ExecutionMode::SharedMemory, 2048, Operation::CheckSym)
                .unwrap();
            prop_assert_eq!(samples[0].worker_count, 1);
            prop_assert_eq!(samples[0].speedup, 1.0);
            prop_assert_eq!(samples[0].efficiency, 100.0);
        }
    }

    #[test]
    fn prop_strong_zero_timing_is_infinite(baseline in 1e-6f64..1e6, p in 2u32..128) {
        // Property: a zero mean time under the strong-scaling policy is +inf
        let table = Aggregator::default().aggregate(&[
            trial(1, 512, 0, baseline, baseline),
            trial(p, 512, 0, 0.0, 0.0),
        ]);
        let samples = MetricEngine::new(MetricPolicy::StrongScaling)
            .partition(&table, ExecutionMode::SharedMemory, 512, Operation::Transpose)
            .unwrap();
        prop_assert_eq!(samples[1].speedup, f64::INFINITY);
        prop_assert_eq!(samples[1].efficiency, f64::INFINITY);
    }

    #[test]
    fn prop_comparison_without_baseline_keeps_every_point(
        workers in prop::collection::btree_set(2u32..64, 1..10),
        time in 1e-6f64..1e3,
    ) {
        // Property: no baseline means all NaN, one point per worker count
        let trials: Vec<TrialRecord> =
            workers.iter().map(|&p| trial(p, 4096, 0, time, time)).collect();
        let table = Aggregator::default().aggregate(&trials);

        let samples = MetricEngine::new(MetricPolicy::Comparison)
            .partition(&table, ExecutionMode::SharedMemory, 4096, Operation::CheckSym)
            .unwrap();
        prop_assert_eq!(samples.len(), workers.len());
        prop_assert!(samples.iter().all(|s| s.speedup.is_nan() && s.efficiency.is_nan()));

        let strong = MetricEngine::new(MetricPolicy::StrongScaling)
            .partition(&table, ExecutionMode::SharedMemory, 4096, Operation::CheckSym);
        prop_assert!(strong.is_none());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn prop_rerun_yields_identical_report(trials in prop::collection::vec(arb_trial(), 1..40)) {
        // Property: identical input twice gives equal series and equal JSON
        let build = || {
            let loaded = LoadedTable {
                mode: ExecutionMode::SharedMemory,
                source: "prop".to_string(),
                trials: trials.clone(),
                stats: Default::default(),
            };
            let dataset = Dataset::from_tables(vec![loaded], InvalidTimingPolicy::Reject);
            ReportBuilder::new(&dataset, &AnalysisConfig::default()).build(&AnalysisKind::ALL)
        };

        let first = build();
        let second = build();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            JsonOutput::from_report(&first).to_json().unwrap(),
            JsonOutput::from_report(&second).to_json().unwrap()
        );
    }
}
