//! Labeled plot series assembled from aggregated timings
//!
//! Series are immutable once built and handed to a renderer. Two shapes
//! exist: scaling series (x = worker count, y = speedup or efficiency) and
//! timing series (x = problem size, y = mean seconds).

use crate::aggregate::AggregatedTable;
use crate::config::WeakScalingPoint;
use crate::metrics::{MetricEngine, MetricPolicy, MetricSample};
use crate::record::{ExecutionMode, Operation};
use serde::{Deserialize, Serialize};

/// Which scaling metric a series carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Speedup,
    Efficiency,
}

impl Metric {
    fn pick(self, sample: &MetricSample) -> f64 {
        match self {
            Metric::Speedup => sample.speedup,
            Metric::Efficiency => sample.efficiency,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::Speedup => "Speedup",
            Metric::Efficiency => "Efficiency",
        }
    }
}

/// One (worker count, metric value) point; value may be `+inf` or NaN
///
/// Equality is bitwise on the value so NaN points compare equal to
/// themselves when checking reruns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScalingPoint {
    pub worker_count: u32,
    #[serde(with = "non_finite")]
    pub value: f64,
}

impl PartialEq for ScalingPoint {
    fn eq(&self, other: &Self) -> bool {
        self.worker_count == other.worker_count && self.value.to_bits() == other.value.to_bits()
    }
}

/// Points of one problem size or execution mode, for one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingSeries {
    pub label: String,
    pub operation: Operation,
    pub points: Vec<ScalingPoint>,
}

/// One (problem size, mean seconds) point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingPoint {
    pub problem_size: u64,
    #[serde(with = "non_finite")]
    pub mean_time: f64,
}

impl PartialEq for TimingPoint {
    fn eq(&self, other: &Self) -> bool {
        self.problem_size == other.problem_size
            && self.mean_time.to_bits() == other.mean_time.to_bits()
    }
}

/// Mean time against problem size for one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSeries {
    pub label: String,
    pub operation: Operation,
    pub points: Vec<TimingPoint>,
}

/// Builds series from one aggregated table
#[derive(Debug, Clone, Copy)]
pub struct SeriesBuilder<'a> {
    table: &'a AggregatedTable,
}

impl<'a> SeriesBuilder<'a> {
    pub fn new(table: &'a AggregatedTable) -> Self {
        Self { table }
    }

    /// One series per problem size, labeled `n=<size>`, ascending by worker count
    ///
    /// Under [`MetricPolicy::StrongScaling`] problem sizes without a
    /// single-worker run produce no series at all.
    pub fn per_problem_size(
        &self,
        mode: ExecutionMode,
        operation: Operation,
        metric: Metric,
        policy: MetricPolicy,
    ) -> Vec<ScalingSeries> {
        let engine = MetricEngine::new(policy);
        self.table
            .problem_sizes(mode)
            .into_iter()
            .filter_map(|n| {
                let samples = engine.partition(self.table, mode, n, operation)?;
                Some(scaling_series(format!("n={}", n), operation, metric, &samples))
            })
            .collect()
    }

    /// One weak-scaling speedup series per mode, labeled by mode, in plan order
    pub fn weak_scaling(
        &self,
        modes: &[ExecutionMode],
        plan: &[WeakScalingPoint],
        operation: Operation,
        policy: MetricPolicy,
    ) -> Vec<ScalingSeries> {
        let engine = MetricEngine::new(policy);
        modes
            .iter()
            .filter_map(|&mode| {
                let samples = engine.weak_scaling(self.table, mode, plan, operation)?;
                Some(scaling_series(
                    mode.short_label().to_string(),
                    operation,
                    Metric::Speedup,
                    &samples,
                ))
            })
            .collect()
    }

    /// One series per mode at a fixed problem size, ascending by worker count
    ///
    /// Labels read `"<MODE> <Operation> <Metric>"`, e.g. `"OMP CheckSym Speedup"`.
    pub fn fixed_problem_size(
        &self,
        modes: &[ExecutionMode],
        problem_size: u64,
        operation: Operation,
        metric: Metric,
        policy: MetricPolicy,
    ) -> Vec<ScalingSeries> {
        let engine = MetricEngine::new(policy);
        modes
            .iter()
            .filter_map(|&mode| {
                let samples = engine.partition(self.table, mode, problem_size, operation)?;
                let label = format!(
                    "{} {} {}",
                    mode.short_label(),
                    operation.title(),
                    metric.title()
                );
                Some(scaling_series(label, operation, metric, &samples))
            })
            .collect()
    }

    /// Mean time against problem size, one series per worker count of the mode
    ///
    /// Sequential data has no worker dimension and yields a single series
    /// labeled after the operation.
    pub fn timings_by_worker_count(
        &self,
        mode: ExecutionMode,
        operation: Operation,
    ) -> Vec<TimingSeries> {
        if !mode.is_parallel() {
            let points = self.timing_points(mode, 1, operation);
            if points.is_empty() {
                return Vec::new();
            }
            return vec![TimingSeries {
                label: format!("{} Time", operation.title()),
                operation,
                points,
            }];
        }

        self.table
            .worker_counts(mode)
            .into_iter()
            .map(|p| TimingSeries {
                label: format!("{} {}", p, mode.worker_noun()),
                operation,
                points: self.timing_points(mode, p, operation),
            })
            .collect()
    }

    /// Sequential reference line plus each parallel mode at a fixed worker count
    ///
    /// Modes without data at that worker count contribute no series.
    pub fn fixed_worker_count(
        &self,
        modes: &[ExecutionMode],
        worker_count: u32,
        operation: Operation,
    ) -> Vec<TimingSeries> {
        modes
            .iter()
            .filter_map(|&mode| {
                let (label, workers) = if mode.is_parallel() {
                    (
                        format!(
                            "{} - {} {}",
                            mode.short_label(),
                            worker_count,
                            mode.worker_noun()
                        ),
                        worker_count,
                    )
                } else {
                    (mode.short_label().to_string(), 1)
                };
                let points = self.timing_points(mode, workers, operation);
                if points.is_empty() {
                    return None;
                }
                Some(TimingSeries {
                    label,
                    operation,
                    points,
                })
            })
            .collect()
    }

    fn timing_points(
        &self,
        mode: ExecutionMode,
        worker_count: u32,
        operation: Operation,
    ) -> Vec<TimingPoint> {
        self.table
            .at_worker_count(mode, worker_count)
            .into_iter()
            .map(|r| TimingPoint {
                problem_size: r.problem_size,
                mean_time: r.mean_time(operation),
            })
            .collect()
    }
}

fn scaling_series(
    label: String,
    operation: Operation,
    metric: Metric,
    samples: &[MetricSample],
) -> ScalingSeries {
    ScalingSeries {
        label,
        operation,
        points: samples
            .iter()
            .map(|s| ScalingPoint {
                worker_count: s.worker_count,
                value: metric.pick(s),
            })
            .collect(),
    }
}

/// Serde adapter keeping `NaN` and `±inf` distinguishable in JSON
///
/// Finite values are plain numbers; non-finite ones become the strings
/// `"NaN"`, `"Infinity"` and `"-Infinity"`.
pub mod non_finite {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value == f64::INFINITY {
            serializer.serialize_str("Infinity")
        } else if *value == f64::NEG_INFINITY {
            serializer.serialize_str("-Infinity")
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        struct F64Visitor;

        impl<'de> Visitor<'de> for F64Visitor {
            type Value = f64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or one of \"NaN\", \"Infinity\", \"-Infinity\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
                Ok(v as f64)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
                Ok(v as f64)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
                match v {
                    "NaN" => Ok(f64::NAN),
                    "Infinity" => Ok(f64::INFINITY),
                    "-Infinity" => Ok(f64::NEG_INFINITY),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(F64Visitor)
    }
}
