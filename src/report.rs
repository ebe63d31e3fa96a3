//! Report assembly: tables in, tagged charts out
//!
//! Runs the pipeline end to end (ingest → aggregate → metrics → series) and
//! tags every series collection with its title, axis labels and axis scale.
//! An unavailable input table only removes the series of its own mode: the
//! missing mode is recorded as skipped (`weak-mpi`, `report-sequential`, ...)
//! and every chart that still has a series is produced.

use crate::aggregate::{AggregatedTable, AggregationStats, Aggregator, InvalidTimingPolicy};
use crate::config::AnalysisConfig;
use crate::ingest::{read_trials, LoadedTable};
use crate::metrics::MetricPolicy;
use crate::record::{ExecutionMode, Operation};
use crate::series::{Metric, ScalingSeries, SeriesBuilder, TimingSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Analyses the report can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Mean time against problem size, per mode and worker count
    Times,
    /// Per-problem-size speedup and efficiency, per parallel mode
    StrongScaling,
    /// Speedup along the weak-scaling law, OMP against MPI
    WeakScaling,
    /// OMP against MPI speedup/efficiency at the fixed problem size
    Comparison,
    /// Sequential, OMP and MPI timings at the fixed worker count
    TimingReport,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Times,
        AnalysisKind::StrongScaling,
        AnalysisKind::WeakScaling,
        AnalysisKind::Comparison,
        AnalysisKind::TimingReport,
    ];
}

/// Axis scaling requested from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    Linear,
    LogLog,
}

/// Series collection of one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "series", rename_all = "snake_case")]
pub enum ChartData {
    Scaling(Vec<ScalingSeries>),
    Timing(Vec<TimingSeries>),
}

impl ChartData {
    pub fn series_count(&self) -> usize {
        match self {
            ChartData::Scaling(series) => series.len(),
            ChartData::Timing(series) => series.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series_count() == 0
    }
}

/// One flattened point of a chart, for tabular renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRow<'a> {
    pub series: &'a str,
    pub operation: Operation,
    pub x: u64,
    pub y: f64,
}

/// A series collection tagged for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Stable identifier, e.g. `strong-omp-checksym-speedup`
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub axis_scale: AxisScale,
    pub data: ChartData,
}

impl Chart {
    /// All points in series order
    pub fn rows(&self) -> Vec<PlotRow<'_>> {
        match &self.data {
            ChartData::Scaling(series) => series
                .iter()
                .flat_map(|s| {
                    s.points.iter().map(move |p| PlotRow {
                        series: &s.label,
                        operation: s.operation,
                        x: u64::from(p.worker_count),
                        y: p.value,
                    })
                })
                .collect(),
            ChartData::Timing(series) => series
                .iter()
                .flat_map(|s| {
                    s.points.iter().map(move |p| PlotRow {
                        series: &s.label,
                        operation: s.operation,
                        x: p.problem_size,
                        y: p.mean_time,
                    })
                })
                .collect(),
        }
    }
}

/// An analysis or chart that was not produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAnalysis {
    pub analysis: String,
    pub reason: String,
}

/// Where one input table came from and how it parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSummary {
    pub mode: ExecutionMode,
    pub source: String,
    pub rows_read: u64,
    pub malformed_rows: u64,
    pub rejected_trials: usize,
    pub groups: usize,
}

/// Everything handed to a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub inputs: Vec<InputSummary>,
    pub charts: Vec<Chart>,
    pub skipped: Vec<SkippedAnalysis>,
}

/// Paths of the per-mode input tables
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    pub sequential: Option<PathBuf>,
    pub shared_memory: Option<PathBuf>,
    pub distributed: Option<PathBuf>,
}

impl InputPaths {
    fn get(&self, mode: ExecutionMode) -> Option<&PathBuf> {
        match mode {
            ExecutionMode::Sequential => self.sequential.as_ref(),
            ExecutionMode::SharedMemory => self.shared_memory.as_ref(),
            ExecutionMode::Distributed => self.distributed.as_ref(),
        }
    }
}

/// Aggregated data of all loaded modes plus the reasons others are missing
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    table: AggregatedTable,
    inputs: Vec<InputSummary>,
    unavailable: BTreeMap<ExecutionMode, String>,
}

impl Dataset {
    /// Read and aggregate every configured table
    ///
    /// A table that fails to load (missing file, missing column) only makes
    /// its own mode unavailable.
    pub fn load(paths: &InputPaths, policy: InvalidTimingPolicy) -> Self {
        let mut dataset = Self::default();
        for mode in ExecutionMode::ALL {
            let Some(path) = paths.get(mode) else {
                dataset.mark_unavailable(mode, "no input table supplied");
                continue;
            };
            match read_trials(path, mode) {
                Ok(loaded) => dataset.add_table(loaded, policy),
                Err(e) => {
                    warn!(%mode, error = %e, "failed to load trial table");
                    dataset.mark_unavailable(mode, e.to_string());
                }
            }
        }
        dataset
    }

    /// Build from already-parsed tables; modes not present are unavailable
    pub fn from_tables(tables: Vec<LoadedTable>, policy: InvalidTimingPolicy) -> Self {
        let mut dataset = Self::default();
        for loaded in tables {
            dataset.add_table(loaded, policy);
        }
        for mode in ExecutionMode::ALL {
            if !dataset.inputs.iter().any(|i| i.mode == mode) {
                dataset.mark_unavailable(mode, "no input table supplied");
            }
        }
        dataset
    }

    fn add_table(&mut self, loaded: LoadedTable, policy: InvalidTimingPolicy) {
        let (table, stats): (AggregatedTable, AggregationStats) =
            Aggregator::new(policy).aggregate_with_stats(&loaded.trials);
        info!(
            mode = %loaded.mode,
            source = %loaded.source,
            trials = loaded.trials.len(),
            groups = table.len(),
            "aggregated input table"
        );
        self.inputs.push(InputSummary {
            mode: loaded.mode,
            source: loaded.source,
            rows_read: loaded.stats.rows_read,
            malformed_rows: loaded.stats.malformed_rows,
            rejected_trials: stats.rejected_trials,
            groups: table.len(),
        });
        self.unavailable.remove(&loaded.mode);
        self.table.extend(table);
    }

    /// Record why a mode cannot be used
    pub fn mark_unavailable(&mut self, mode: ExecutionMode, reason: impl Into<String>) {
        self.unavailable.insert(mode, reason.into());
    }

    pub fn table(&self) -> &AggregatedTable {
        &self.table
    }

    pub fn inputs(&self) -> &[InputSummary] {
        &self.inputs
    }

    /// Why a mode's table cannot be used, if it cannot
    pub fn unavailable_reason(&self, mode: ExecutionMode) -> Option<&str> {
        self.unavailable.get(&mode).map(String::as_str)
    }
}

/// Builds a [`Report`] from a dataset and configuration
pub struct ReportBuilder<'a> {
    dataset: &'a Dataset,
    config: &'a AnalysisConfig,
    charts: Vec<Chart>,
    skipped: Vec<SkippedAnalysis>,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(dataset: &'a Dataset, config: &'a AnalysisConfig) -> Self {
        Self {
            dataset,
            config,
            charts: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Run the requested analyses in the given order
    pub fn build(mut self, analyses: &[AnalysisKind]) -> Report {
        for &kind in analyses {
            match kind {
                AnalysisKind::Times => {
                    for mode in ExecutionMode::ALL {
                        self.times(mode);
                    }
                }
                AnalysisKind::StrongScaling => {
                    for mode in ExecutionMode::PARALLEL {
                        self.strong_scaling(mode);
                    }
                }
                AnalysisKind::WeakScaling => self.weak_scaling(),
                AnalysisKind::Comparison => self.comparison(),
                AnalysisKind::TimingReport => self.timing_report(),
            }
        }

        Report {
            inputs: self.dataset.inputs().to_vec(),
            charts: self.charts,
            skipped: self.skipped,
        }
    }

    fn builder(&self) -> SeriesBuilder<'a> {
        SeriesBuilder::new(self.dataset.table())
    }

    /// Record `analysis` as skipped when the mode's table is unavailable
    fn require(&mut self, analysis: &str, mode: ExecutionMode) -> bool {
        let Some(reason) = self.dataset.unavailable_reason(mode) else {
            return true;
        };
        let reason = format!("{} table unavailable: {}", mode, reason);
        warn!(analysis, %reason, "skipping series of unavailable mode");
        self.skipped.push(SkippedAnalysis {
            analysis: analysis.to_string(),
            reason,
        });
        false
    }

    /// Modes with data; each missing one is skipped as `<analysis>-<mode>`
    fn available_modes(&mut self, analysis: &str, modes: &[ExecutionMode]) -> Vec<ExecutionMode> {
        modes
            .iter()
            .copied()
            .filter(|&mode| {
                let series_id = format!("{}-{}", analysis, mode_slug(mode));
                self.require(&series_id, mode)
            })
            .collect()
    }

    /// Keep a chart only when it has at least one series
    fn push(&mut self, chart: Chart) {
        if chart.data.is_empty() {
            warn!(chart = %chart.id, "no series to plot; omitting chart");
            self.skipped.push(SkippedAnalysis {
                analysis: chart.id,
                reason: "no series could be computed".to_string(),
            });
        } else {
            self.charts.push(chart);
        }
    }

    fn times(&mut self, mode: ExecutionMode) {
        let analysis = format!("times-{}", mode_slug(mode));
        if !self.require(&analysis, mode) {
            return;
        }
        let builder = self.builder();
        for operation in Operation::ALL {
            let title = if mode.is_parallel() {
                format!(
                    "{} Time vs. n_matrix for every number of {}",
                    operation.title(),
                    mode.worker_noun()
                )
            } else {
                format!("{} Time vs. n_matrix", operation.title())
            };
            self.push(Chart {
                id: format!("{}-{}", analysis, op_slug(operation)),
                title,
                x_label: "Matrix Dimension (n)".to_string(),
                y_label: "Average Time (s)".to_string(),
                axis_scale: AxisScale::LogLog,
                data: ChartData::Timing(builder.timings_by_worker_count(mode, operation)),
            });
        }
    }

    fn strong_scaling(&mut self, mode: ExecutionMode) {
        let analysis = format!("strong-{}", mode_slug(mode));
        if !self.require(&analysis, mode) {
            return;
        }
        let builder = self.builder();
        let suffix = match mode {
            ExecutionMode::SharedMemory => " (OpenMP)",
            _ => "",
        };
        let x_label = match mode {
            ExecutionMode::SharedMemory => "Number of Threads (t)",
            _ => "Number of Processes (p)",
        };

        for metric in [Metric::Speedup, Metric::Efficiency] {
            for operation in Operation::ALL {
                let (title, y_label) = match metric {
                    Metric::Speedup => (
                        format!("Strong Scaling - {}{}", operation.title(), suffix),
                        format!("Speedup ({})", operation.title()),
                    ),
                    Metric::Efficiency => (
                        format!(
                            "Strong Scaling Efficiency - {}{}",
                            operation.title(),
                            suffix
                        ),
                        format!("Efficiency (%) - {}", operation.title()),
                    ),
                };
                let series =
                    builder.per_problem_size(mode, operation, metric, MetricPolicy::StrongScaling);
                self.push(Chart {
                    id: metric_chart_id(&analysis, operation, metric),
                    title,
                    x_label: x_label.to_string(),
                    y_label,
                    axis_scale: AxisScale::Linear,
                    data: ChartData::Scaling(series),
                });
            }
        }
    }

    fn weak_scaling(&mut self) {
        let analysis = "weak";
        let modes = self.available_modes(analysis, &ExecutionMode::PARALLEL);
        if modes.is_empty() {
            return;
        }
        let builder = self.builder();
        for operation in Operation::ALL {
            let series = builder.weak_scaling(
                &modes,
                &self.config.weak_scaling,
                operation,
                MetricPolicy::Comparison,
            );
            self.push(Chart {
                id: format!("{}-{}", analysis, op_slug(operation)),
                title: format!("Weak Scaling - {}", operation.title()),
                x_label: "Number of Threads/Processes (p)".to_string(),
                y_label: "S_w(p) = T1(N) / T_p(p*N)".to_string(),
                axis_scale: AxisScale::Linear,
                data: ChartData::Scaling(series),
            });
        }
    }

    fn comparison(&mut self) {
        let analysis = "compare";
        let modes = self.available_modes(analysis, &ExecutionMode::PARALLEL);
        if modes.is_empty() {
            return;
        }
        let builder = self.builder();
        let n = self.config.fixed_problem_size;
        for operation in Operation::ALL {
            for metric in [Metric::Speedup, Metric::Efficiency] {
                let (title, y_label) = match metric {
                    Metric::Speedup => (
                        format!("Strong Scaling ({}) - n={}", operation.title(), n),
                        "Speedup",
                    ),
                    Metric::Efficiency => (
                        format!(
                            "Strong Scaling Efficiency ({}) - n={}",
                            operation.title(),
                            n
                        ),
                        "Efficiency (%)",
                    ),
                };
                let series = builder.fixed_problem_size(
                    &modes,
                    n,
                    operation,
                    metric,
                    MetricPolicy::Comparison,
                );
                self.push(Chart {
                    id: metric_chart_id(analysis, operation, metric),
                    title,
                    x_label: "Number of Threads / Processes".to_string(),
                    y_label: y_label.to_string(),
                    axis_scale: AxisScale::Linear,
                    data: ChartData::Scaling(series),
                });
            }
        }
    }

    fn timing_report(&mut self) {
        let analysis = "report";
        let modes = self.available_modes(analysis, &ExecutionMode::ALL);
        if modes.is_empty() {
            return;
        }
        let builder = self.builder();
        let w = self.config.fixed_worker_count;
        for operation in Operation::ALL {
            let series = builder.fixed_worker_count(&modes, w, operation);
            self.push(Chart {
                id: format!("{}-{}", analysis, op_slug(operation)),
                title: format!(
                    "{} Comparison: Sequential vs OMP({}) vs MPI({})",
                    operation.title(),
                    w,
                    w
                ),
                x_label: "Matrix Dimension (n)".to_string(),
                y_label: format!("Average {} Time (s)", operation.title()),
                axis_scale: AxisScale::LogLog,
                data: ChartData::Timing(series),
            });
        }
    }
}

fn mode_slug(mode: ExecutionMode) -> &'static str {
    match mode {
        ExecutionMode::Sequential => "sequential",
        ExecutionMode::SharedMemory => "omp",
        ExecutionMode::Distributed => "mpi",
    }
}

fn op_slug(operation: Operation) -> &'static str {
    match operation {
        Operation::CheckSym => "checksym",
        Operation::Transpose => "transpose",
    }
}

fn metric_chart_id(analysis: &str, operation: Operation, metric: Metric) -> String {
    format!("{}-{}-{}", analysis, op_slug(operation), metric_slug(metric))
}

fn metric_slug(metric: Metric) -> &'static str {
    match metric {
        Metric::Speedup => "speedup",
        Metric::Efficiency => "efficiency",
    }
}
