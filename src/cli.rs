//! CLI argument parsing for parscale

use crate::aggregate::InvalidTimingPolicy;
use crate::config::{AnalysisConfig, WeakScalingPoint};
use crate::report::{AnalysisKind, InputPaths};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names the benchmark jobs write their results to
pub const SEQUENTIAL_FILE: &str = "sequential_results.csv";
pub const OMP_FILE: &str = "omp_results.csv";
pub const MPI_FILE: &str = "mpi_results.csv";

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    Text,
    /// JSON document for machine parsing and plotting tools
    Json,
    /// Long-format CSV, one row per point
    Csv,
    /// Standalone HTML page
    Html,
}

/// Analyses selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalysisArg {
    /// Every analysis below
    All,
    /// Mean time vs matrix size for each mode and worker count
    Times,
    /// Strong-scaling speedup and efficiency per matrix size
    Strong,
    /// Weak-scaling speedup along the configured scaling law
    Weak,
    /// OMP vs MPI speedup and efficiency at the fixed matrix size
    Compare,
    /// Sequential vs OMP vs MPI timings at the fixed worker count
    Report,
}

impl AnalysisArg {
    fn kinds(self) -> &'static [AnalysisKind] {
        match self {
            AnalysisArg::All => &AnalysisKind::ALL,
            AnalysisArg::Times => &[AnalysisKind::Times],
            AnalysisArg::Strong => &[AnalysisKind::StrongScaling],
            AnalysisArg::Weak => &[AnalysisKind::WeakScaling],
            AnalysisArg::Compare => &[AnalysisKind::Comparison],
            AnalysisArg::Report => &[AnalysisKind::TimingReport],
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "parscale")]
#[command(version)]
#[command(about = "Speedup, efficiency and weak-scaling metrics from parallel benchmark timings")]
#[command(long_about = None)]
pub struct Cli {
    /// Sequential results table (n_matrix, iteration, checksym_time, transpose_time)
    #[arg(long = "sequential", value_name = "CSV")]
    pub sequential: Option<PathBuf>,

    /// OpenMP results table (adds n_threads)
    #[arg(long = "omp", value_name = "CSV")]
    pub omp: Option<PathBuf>,

    /// MPI results table (adds n_processes)
    #[arg(long = "mpi", value_name = "CSV")]
    pub mpi: Option<PathBuf>,

    /// Directory holding sequential_results.csv, omp_results.csv and mpi_results.csv
    #[arg(short = 'd', long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// TOML analysis configuration
    #[arg(short = 'c', long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Analyses to run (repeatable)
    #[arg(short = 'a', long = "analysis", value_enum, default_value = "all")]
    pub analysis: Vec<AnalysisArg>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Matrix size for the OMP vs MPI comparison (default: 4096)
    #[arg(long = "problem-size", value_name = "N")]
    pub problem_size: Option<u64>,

    /// Worker count for the timing report (default: 32)
    #[arg(long = "workers", value_name = "P")]
    pub workers: Option<u32>,

    /// Weak-scaling step WORKERS:SIZE (repeatable, replaces the configured table)
    #[arg(long = "weak-point", value_name = "P:N")]
    pub weak_points: Vec<WeakScalingPoint>,

    /// Keep trials with negative or non-finite timings as NaN instead of dropping them
    #[arg(long = "propagate-nan")]
    pub propagate_nan: bool,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Requested analyses, deduplicated, in first-mention order
    pub fn analyses(&self) -> Vec<AnalysisKind> {
        let mut kinds = Vec::new();
        for arg in &self.analysis {
            for &kind in arg.kinds() {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        kinds
    }

    /// Input tables: explicit paths first, then existing files in --data-dir
    pub fn input_paths(&self) -> InputPaths {
        let from_dir = |name: &str| -> Option<PathBuf> {
            let dir = self.data_dir.as_deref()?;
            let path = dir.join(name);
            path.is_file().then_some(path)
        };

        InputPaths {
            sequential: self.sequential.clone().or_else(|| from_dir(SEQUENTIAL_FILE)),
            shared_memory: self.omp.clone().or_else(|| from_dir(OMP_FILE)),
            distributed: self.mpi.clone().or_else(|| from_dir(MPI_FILE)),
        }
    }

    /// Configuration from --config (or defaults) with command-line overrides applied
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(n) = self.problem_size {
            config.fixed_problem_size = n;
        }
        if let Some(p) = self.workers {
            config.fixed_worker_count = p;
        }
        if !self.weak_points.is_empty() {
            config.weak_scaling = self.weak_points.clone();
        }
        if self.propagate_nan {
            config.invalid_timing = InvalidTimingPolicy::PropagateNan;
        }

        config.validate().context("Invalid analysis configuration")?;
        debug!(?config, "resolved analysis configuration");
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<AnalysisConfig> {
    AnalysisConfig::from_file(path)
        .with_context(|| format!("Failed to load config {}", path.display()))
}
