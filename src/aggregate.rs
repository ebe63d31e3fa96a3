//! Aggregation of repeated trials into mean timings
//!
//! Trials sharing (execution mode, worker count, problem size) are reduced to
//! one [`AggregatedRecord`] holding the arithmetic mean of each operation's
//! timing. The resulting [`AggregatedTable`] is keyed and ordered, so every
//! downstream lookup is deterministic.

use crate::record::{ExecutionMode, Operation, TrialRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What to do with a negative or non-finite timing
///
/// Such a value is never silently treated as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidTimingPolicy {
    /// Exclude the whole trial from its group
    #[default]
    Reject,
    /// Keep the trial; the invalid column contributes NaN to its group mean
    PropagateNan,
}

/// Unique aggregation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregationKey {
    pub mode: ExecutionMode,
    pub problem_size: u64,
    pub worker_count: u32,
}

/// Mean timings of one (mode, worker count, problem size) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub mode: ExecutionMode,
    pub worker_count: u32,
    pub problem_size: u64,
    pub mean_checksym_time: f64,
    pub mean_transpose_time: f64,
    /// Number of trials that contributed (always >= 1)
    pub sample_count: usize,
}

impl AggregatedRecord {
    pub fn key(&self) -> AggregationKey {
        AggregationKey {
            mode: self.mode,
            problem_size: self.problem_size,
            worker_count: self.worker_count,
        }
    }

    /// Mean timing of the given operation
    pub fn mean_time(&self, operation: Operation) -> f64 {
        match operation {
            Operation::CheckSym => self.mean_checksym_time,
            Operation::Transpose => self.mean_transpose_time,
        }
    }
}

/// Counters for one aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationStats {
    pub trials_seen: usize,
    /// Trials excluded under [`InvalidTimingPolicy::Reject`]
    pub rejected_trials: usize,
    /// Timing values replaced by NaN under [`InvalidTimingPolicy::PropagateNan`]
    pub nan_timings: usize,
}

/// Keyed collection of aggregated records
///
/// Invariant: one record per [`AggregationKey`]. Iteration follows key order
/// (mode, then problem size, then worker count).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedTable {
    records: BTreeMap<AggregationKey, AggregatedRecord>,
}

impl AggregatedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact lookup by key
    pub fn get(
        &self,
        mode: ExecutionMode,
        worker_count: u32,
        problem_size: u64,
    ) -> Option<&AggregatedRecord> {
        self.records.get(&AggregationKey {
            mode,
            problem_size,
            worker_count,
        })
    }

    /// All records in key order
    pub fn iter(&self) -> impl Iterator<Item = &AggregatedRecord> {
        self.records.values()
    }

    /// Records of one execution mode
    pub fn records_for_mode(&self, mode: ExecutionMode) -> impl Iterator<Item = &AggregatedRecord> {
        self.records.values().filter(move |r| r.mode == mode)
    }

    /// Records of one (mode, problem size) partition, ascending by worker count
    pub fn partition(&self, mode: ExecutionMode, problem_size: u64) -> Vec<&AggregatedRecord> {
        let start = AggregationKey {
            mode,
            problem_size,
            worker_count: 0,
        };
        let end = AggregationKey {
            mode,
            problem_size,
            worker_count: u32::MAX,
        };
        let mut records: Vec<&AggregatedRecord> =
            self.records.range(start..=end).map(|(_, r)| r).collect();
        records.sort_by_key(|r| r.worker_count);
        records
    }

    /// Distinct problem sizes of a mode, ascending
    pub fn problem_sizes(&self, mode: ExecutionMode) -> Vec<u64> {
        let mut sizes: Vec<u64> = self.records_for_mode(mode).map(|r| r.problem_size).collect();
        sizes.dedup();
        sizes
    }

    /// Distinct worker counts of a mode, ascending
    pub fn worker_counts(&self, mode: ExecutionMode) -> Vec<u32> {
        let mut counts: Vec<u32> = self.records_for_mode(mode).map(|r| r.worker_count).collect();
        counts.sort_unstable();
        counts.dedup();
        counts
    }

    /// Records of one mode at a fixed worker count, ascending by problem size
    pub fn at_worker_count(
        &self,
        mode: ExecutionMode,
        worker_count: u32,
    ) -> Vec<&AggregatedRecord> {
        self.records_for_mode(mode)
            .filter(|r| r.worker_count == worker_count)
            .collect()
    }

    /// Merge another table's records into this one
    ///
    /// Keys already present are replaced; callers aggregate disjoint modes.
    pub fn extend(&mut self, other: AggregatedTable) {
        self.records.extend(other.records);
    }
}

#[derive(Debug, Default)]
struct GroupAccumulator {
    checksym_sum: f64,
    transpose_sum: f64,
    count: usize,
}

/// Reduces trials to per-key mean timings
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    policy: InvalidTimingPolicy,
}

impl Aggregator {
    pub fn new(policy: InvalidTimingPolicy) -> Self {
        Self { policy }
    }

    /// Aggregate trials, discarding the counters
    pub fn aggregate(&self, trials: &[TrialRecord]) -> AggregatedTable {
        self.aggregate_with_stats(trials).0
    }

    /// Aggregate trials and report how many values were rejected or poisoned
    ///
    /// An empty input yields an empty table.
    pub fn aggregate_with_stats(
        &self,
        trials: &[TrialRecord],
    ) -> (AggregatedTable, AggregationStats) {
        let mut groups: BTreeMap<AggregationKey, GroupAccumulator> = BTreeMap::new();
        let mut stats = AggregationStats {
            trials_seen: trials.len(),
            ..Default::default()
        };

        for trial in trials {
            let checksym_ok = is_valid_timing(trial.checksym_time);
            let transpose_ok = is_valid_timing(trial.transpose_time);

            let (checksym, transpose) = match self.policy {
                InvalidTimingPolicy::Reject if !(checksym_ok && transpose_ok) => {
                    stats.rejected_trials += 1;
                    warn!(
                        mode = %trial.mode(),
                        workers = trial.worker_count(),
                        problem_size = trial.problem_size,
                        iteration = trial.iteration,
                        checksym_time = trial.checksym_time,
                        transpose_time = trial.transpose_time,
                        "rejecting trial with invalid timing"
                    );
                    continue;
                }
                InvalidTimingPolicy::Reject => (trial.checksym_time, trial.transpose_time),
                InvalidTimingPolicy::PropagateNan => {
                    let checksym = if checksym_ok {
                        trial.checksym_time
                    } else {
                        stats.nan_timings += 1;
                        f64::NAN
                    };
                    let transpose = if transpose_ok {
                        trial.transpose_time
                    } else {
                        stats.nan_timings += 1;
                        f64::NAN
                    };
                    (checksym, transpose)
                }
            };

            let key = AggregationKey {
                mode: trial.mode(),
                problem_size: trial.problem_size,
                worker_count: trial.worker_count(),
            };
            let group = groups.entry(key).or_default();
            group.checksym_sum += checksym;
            group.transpose_sum += transpose;
            group.count += 1;
        }

        let records = groups
            .into_iter()
            .map(|(key, group)| {
                let n = group.count as f64;
                let record = AggregatedRecord {
                    mode: key.mode,
                    worker_count: key.worker_count,
                    problem_size: key.problem_size,
                    mean_checksym_time: group.checksym_sum / n,
                    mean_transpose_time: group.transpose_sum / n,
                    sample_count: group.count,
                };
                (key, record)
            })
            .collect::<BTreeMap<_, _>>();

        debug!(
            trials = stats.trials_seen,
            groups = records.len(),
            rejected = stats.rejected_trials,
            "aggregated trials"
        );

        (AggregatedTable { records }, stats)
    }
}

fn is_valid_timing(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
