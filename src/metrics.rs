//! Speedup and efficiency computation
//!
//! Two sentinel policies coexist:
//!
//! | Situation                    | `StrongScaling`       | `Comparison`     |
//! |------------------------------|-----------------------|------------------|
//! | `Tp <= 0`                    | `+inf`                | `NaN`            |
//! | no baseline for partition    | whole series skipped  | every point NaN  |
//! | valid `T1`, `Tp > 0`         | `T1 / Tp`             | `T1 / Tp`        |
//!
//! Efficiency is `speedup / p * 100` in both policies, so `+inf` and `NaN`
//! carry through unchanged.

use crate::aggregate::{AggregatedRecord, AggregatedTable};
use crate::baseline::BaselineResolver;
use crate::config::WeakScalingPoint;
use crate::record::{ExecutionMode, Operation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Divide-by-zero and missing-baseline policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricPolicy {
    /// Per-problem-size strong scaling: `Tp <= 0` gives `+inf`, no baseline skips the series
    StrongScaling,
    /// Weak scaling and cross-mode comparison: anything missing gives `NaN`
    Comparison,
}

/// Speedup and efficiency at one worker count
#[derive(Debug, Clone, Copy)]
pub struct MetricSample {
    pub worker_count: u32,
    pub speedup: f64,
    /// Percent; 100 is ideal linear scaling
    pub efficiency: f64,
}

/// Computes scaling metrics under one [`MetricPolicy`]
#[derive(Debug, Clone, Copy)]
pub struct MetricEngine {
    policy: MetricPolicy,
}

impl MetricEngine {
    pub fn new(policy: MetricPolicy) -> Self {
        Self { policy }
    }

    /// `T1 / Tp` with this engine's sentinel policy
    ///
    /// A NaN timing (poisoned by the aggregator) always yields NaN.
    pub fn speedup(&self, baseline: Option<f64>, time: Option<f64>) -> f64 {
        let (t1, tp) = match (baseline, time) {
            (Some(t1), Some(tp)) => (t1, tp),
            _ => return f64::NAN,
        };
        // A poisoned mean is "no data" under both policies, not an infinitely
        // fast run, so NaN wins over the strong-scaling `+inf` branch below.
        if t1.is_nan() || tp.is_nan() {
            return f64::NAN;
        }
        if tp > 0.0 {
            return t1 / tp;
        }
        match self.policy {
            MetricPolicy::StrongScaling => f64::INFINITY,
            MetricPolicy::Comparison => f64::NAN,
        }
    }

    /// Efficiency in percent
    pub fn efficiency(speedup: f64, worker_count: u32) -> f64 {
        (speedup / f64::from(worker_count)) * 100.0
    }

    pub fn sample(
        &self,
        worker_count: u32,
        baseline: Option<f64>,
        time: Option<f64>,
    ) -> MetricSample {
        let speedup = self.speedup(baseline, time);
        MetricSample {
            worker_count,
            speedup,
            efficiency: Self::efficiency(speedup, worker_count),
        }
    }

    /// Metrics across all worker counts of one (mode, problem size) partition
    ///
    /// Samples are ascending by worker count. Returns `None` when the
    /// partition has no single-worker baseline and the policy is
    /// [`MetricPolicy::StrongScaling`]; under [`MetricPolicy::Comparison`]
    /// the same case yields one NaN sample per worker count.
    pub fn partition(
        &self,
        table: &AggregatedTable,
        mode: ExecutionMode,
        problem_size: u64,
        operation: Operation,
    ) -> Option<Vec<MetricSample>> {
        let records = table.partition(mode, problem_size);
        let baseline = BaselineResolver::new(table)
            .strong(mode, problem_size)
            .map(|r| r.mean_time(operation));

        if baseline.is_none() {
            match self.policy {
                MetricPolicy::StrongScaling => {
                    info!(
                        %mode,
                        problem_size,
                        %operation,
                        "no single-worker baseline; skipping strong-scaling series"
                    );
                    return None;
                }
                MetricPolicy::Comparison => {
                    debug!(
                        %mode,
                        problem_size,
                        %operation,
                        "no single-worker baseline; emitting NaN points"
                    );
                }
            }
        }

        Some(self.samples_over(&records, baseline, operation))
    }

    /// Weak-scaling speedups following the plan's table order
    ///
    /// One sample per plan entry; a configuration that was never measured
    /// becomes a NaN sample under the comparison policy. Under the
    /// strong-scaling policy a missing baseline skips the series.
    pub fn weak_scaling(
        &self,
        table: &AggregatedTable,
        mode: ExecutionMode,
        plan: &[WeakScalingPoint],
        operation: Operation,
    ) -> Option<Vec<MetricSample>> {
        let baseline = BaselineResolver::new(table)
            .weak(mode, plan)
            .map(|r| r.mean_time(operation));

        if baseline.is_none() {
            if self.policy == MetricPolicy::StrongScaling {
                info!(%mode, %operation, "no weak-scaling baseline; skipping series");
                return None;
            }
            debug!(%mode, %operation, "no weak-scaling baseline; emitting NaN points");
        }

        let samples = plan
            .iter()
            .map(|point| {
                let time = table
                    .get(mode, point.worker_count, point.problem_size)
                    .map(|r| r.mean_time(operation));
                self.sample(point.worker_count, baseline, time)
            })
            .collect();
        Some(samples)
    }

    fn samples_over(
        &self,
        records: &[&AggregatedRecord],
        baseline: Option<f64>,
        operation: Operation,
    ) -> Vec<MetricSample> {
        let mut sorted: Vec<&AggregatedRecord> = records.to_vec();
        sorted.sort_by_key(|r| r.worker_count);
        debug_assert!(
            sorted.windows(2).all(|w| w[0].worker_count < w[1].worker_count),
            "duplicate worker count within one partition"
        );

        sorted
            .iter()
            .map(|r| self.sample(r.worker_count, baseline, Some(r.mean_time(operation))))
            .collect()
    }
}
