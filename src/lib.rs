//! parscale - scaling metrics for parallel matrix benchmarks
//!
//! Turns repeated-trial timings of a symmetry check and a transpose, run
//! sequentially, with OpenMP threads and with MPI processes, into mean
//! timings, strong-scaling speedup/efficiency, weak-scaling speedup and
//! cross-mode comparisons.
//!
//! Data flows one way: [`ingest`] → [`aggregate`] → [`baseline`] →
//! [`metrics`] → [`series`] → [`report`] → a [`render::Renderer`].
//!
//! ```
//! use parscale::aggregate::Aggregator;
//! use parscale::metrics::MetricPolicy;
//! use parscale::record::{Execution, ExecutionMode, Operation, TrialRecord};
//! use parscale::series::{Metric, SeriesBuilder};
//!
//! let trials: Vec<TrialRecord> = [(1, 10.0), (2, 5.0), (4, 2.5)]
//!     .iter()
//!     .map(|&(p, t)| {
//!         TrialRecord::new(Execution::new(ExecutionMode::SharedMemory, p), 1024, 0, t, t)
//!     })
//!     .collect();
//! let table = Aggregator::default().aggregate(&trials);
//! let series = SeriesBuilder::new(&table).per_problem_size(
//!     ExecutionMode::SharedMemory,
//!     Operation::CheckSym,
//!     Metric::Speedup,
//!     MetricPolicy::StrongScaling,
//! );
//! let speedups: Vec<f64> = series[0].points.iter().map(|p| p.value).collect();
//! assert_eq!(speedups, vec![1.0, 2.0, 4.0]);
//! ```

pub mod aggregate;
pub mod baseline;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod html_output;
pub mod ingest;
pub mod json_output;
pub mod metrics;
pub mod record;
pub mod render;
pub mod report;
pub mod series;
