//! Analysis configuration
//!
//! Holds the weak-scaling law, the fixed slice used for cross-mode
//! comparisons, and the invalid-timing policy. Every field has a default, so
//! a TOML file only needs to name what it changes:
//!
//! ```toml
//! fixed_problem_size = 8192
//! fixed_worker_count = 16
//! invalid_timing = "propagate_nan"
//!
//! [[weak_scaling]]
//! worker_count = 1
//! problem_size = 1024
//!
//! [[weak_scaling]]
//! worker_count = 4
//! problem_size = 2048
//! ```

use crate::aggregate::InvalidTimingPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Errors in analysis configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("weak-scaling table must not be empty")]
    EmptyWeakScaling,

    #[error("invalid weak-scaling point '{0}' (expected WORKERS:SIZE, both > 0)")]
    InvalidWeakPoint(String),

    #[error("{field} must be > 0, got {value}")]
    NonPositive { field: &'static str, value: u64 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// One step of a weak-scaling experiment: run `problem_size` on `worker_count` workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeakScalingPoint {
    pub worker_count: u32,
    pub problem_size: u64,
}

impl WeakScalingPoint {
    pub fn new(worker_count: u32, problem_size: u64) -> Self {
        Self {
            worker_count,
            problem_size,
        }
    }
}

impl FromStr for WeakScalingPoint {
    type Err = ConfigError;

    /// Parse `WORKERS:SIZE`, e.g. `4:2048`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ConfigError::InvalidWeakPoint(s.to_string());
        let (workers, size) = s.split_once(':').ok_or_else(invalid)?;
        let worker_count: u32 = workers.trim().parse().map_err(|_| invalid())?;
        let problem_size: u64 = size.trim().parse().map_err(|_| invalid())?;
        if worker_count == 0 || problem_size == 0 {
            return Err(invalid());
        }
        Ok(Self::new(worker_count, problem_size))
    }
}

fn default_weak_scaling() -> Vec<WeakScalingPoint> {
    vec![
        WeakScalingPoint::new(1, 1024),
        WeakScalingPoint::new(4, 2048),
        WeakScalingPoint::new(16, 4096),
    ]
}

fn default_fixed_problem_size() -> u64 {
    4096
}

fn default_fixed_worker_count() -> u32 {
    32
}

/// Configuration for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Scaling law for weak-scaling charts, in table order
    #[serde(default = "default_weak_scaling")]
    pub weak_scaling: Vec<WeakScalingPoint>,

    /// Problem size for the OMP-vs-MPI speedup/efficiency comparison
    #[serde(default = "default_fixed_problem_size")]
    pub fixed_problem_size: u64,

    /// Worker count for the sequential/OMP/MPI timing comparison
    #[serde(default = "default_fixed_worker_count")]
    pub fixed_worker_count: u32,

    /// Handling of negative or non-finite timings
    pub invalid_timing: InvalidTimingPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weak_scaling: default_weak_scaling(),
            fixed_problem_size: default_fixed_problem_size(),
            fixed_worker_count: default_fixed_worker_count(),
            invalid_timing: InvalidTimingPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check structural validity
    ///
    /// A weak-scaling table that is not increasing in worker count is
    /// accepted with a warning; it is plotted in table order regardless.
    pub fn validate(&self) -> Result<()> {
        if self.weak_scaling.is_empty() {
            return Err(ConfigError::EmptyWeakScaling);
        }

        for point in &self.weak_scaling {
            if point.worker_count == 0 || point.problem_size == 0 {
                return Err(ConfigError::InvalidWeakPoint(format!(
                    "{}:{}",
                    point.worker_count, point.problem_size
                )));
            }
        }

        if self.fixed_problem_size == 0 {
            return Err(ConfigError::NonPositive {
                field: "fixed_problem_size",
                value: 0,
            });
        }

        if self.fixed_worker_count == 0 {
            return Err(ConfigError::NonPositive {
                field: "fixed_worker_count",
                value: 0,
            });
        }

        let monotonic = self
            .weak_scaling
            .windows(2)
            .all(|w| w[0].worker_count < w[1].worker_count);
        if !monotonic {
            warn!(
                table = ?self.weak_scaling,
                "weak-scaling table is not increasing in worker count; keeping table order"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(
            config.weak_scaling,
            vec![
                WeakScalingPoint::new(1, 1024),
                WeakScalingPoint::new(4, 2048),
                WeakScalingPoint::new(16, 4096),
            ]
        );
        assert_eq!(config.fixed_problem_size, 4096);
        assert_eq!(config.fixed_worker_count, 32);
        assert_eq!(config.invalid_timing, InvalidTimingPolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str("fixed_worker_count = 16\n").unwrap();
        assert_eq!(config.fixed_worker_count, 16);
        assert_eq!(config.fixed_problem_size, 4096);
        assert_eq!(config.weak_scaling.len(), 3);
    }

    #[test]
    fn test_full_toml() {
        let toml = r#"
fixed_problem_size = 8192
fixed_worker_count = 8
invalid_timing = "propagate_nan"

[[weak_scaling]]
worker_count = 1
problem_size = 512

[[weak_scaling]]
worker_count = 4
problem_size = 1024
"#;
        let config = AnalysisConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.fixed_problem_size, 8192);
        assert_eq!(config.fixed_worker_count, 8);
        assert_eq!(config.invalid_timing, InvalidTimingPolicy::PropagateNan);
        assert_eq!(
            config.weak_scaling,
            vec![WeakScalingPoint::new(1, 512), WeakScalingPoint::new(4, 1024)]
        );
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("fixed_worker_count = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_empty_weak_table_invalid() {
        let mut config = AnalysisConfig::default();
        config.weak_scaling.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyWeakScaling)));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_zero_fixed_slice_invalid() {
        let mut config = AnalysisConfig::default();
        config.fixed_worker_count = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.fixed_problem_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_non_monotonic_table_accepted() {
        let mut config = AnalysisConfig::default();
        config.weak_scaling = vec![WeakScalingPoint::new(4, 2048), WeakScalingPoint::new(1, 1024)];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_weak_point() {
        assert_eq!(
            "4:2048".parse::<WeakScalingPoint>().unwrap(),
            WeakScalingPoint::new(4, 2048)
        );
        assert!("4".parse::<WeakScalingPoint>().is_err());
        assert!("0:2048".parse::<WeakScalingPoint>().is_err());
        assert!("x:2048".parse::<WeakScalingPoint>().is_err());
    }
}
