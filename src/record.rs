//! Raw benchmark trial records
//!
//! A trial is one timed run of the matrix benchmark: a symmetry check
//! (`checksym`) followed by a transpose, under one execution mode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution mode of the benchmark program, without worker information
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Single-threaded reference implementation
    Sequential,
    /// OpenMP shared-memory parallelism (worker = thread)
    SharedMemory,
    /// MPI distributed parallelism (worker = process)
    Distributed,
}

impl ExecutionMode {
    /// All modes in reporting order
    pub const ALL: [ExecutionMode; 3] = [
        ExecutionMode::Sequential,
        ExecutionMode::SharedMemory,
        ExecutionMode::Distributed,
    ];

    /// Parallel modes that carry a worker-count dimension
    pub const PARALLEL: [ExecutionMode; 2] =
        [ExecutionMode::SharedMemory, ExecutionMode::Distributed];

    /// Name of the worker-count column in the input table (`None` for sequential)
    pub fn worker_column(self) -> Option<&'static str> {
        match self {
            ExecutionMode::Sequential => None,
            ExecutionMode::SharedMemory => Some("n_threads"),
            ExecutionMode::Distributed => Some("n_processes"),
        }
    }

    /// Short label used in series names ("OMP", "MPI")
    pub fn short_label(self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "Sequential",
            ExecutionMode::SharedMemory => "OMP",
            ExecutionMode::Distributed => "MPI",
        }
    }

    /// Plural noun for one worker of this mode
    pub fn worker_noun(self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "runs",
            ExecutionMode::SharedMemory => "threads",
            ExecutionMode::Distributed => "processes",
        }
    }

    /// Whether the mode has a worker-count dimension
    pub fn is_parallel(self) -> bool {
        !matches!(self, ExecutionMode::Sequential)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::SharedMemory => "shared_memory",
            ExecutionMode::Distributed => "distributed",
        };
        f.write_str(name)
    }
}

/// Execution mode together with its worker count
///
/// Thread and process counts are the same concept under different column
/// names, so they share one representation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Execution {
    Sequential,
    SharedMemory { worker_count: u32 },
    Distributed { worker_count: u32 },
}

impl Execution {
    /// Build from a mode and a worker count; sequential ignores the count
    pub fn new(mode: ExecutionMode, worker_count: u32) -> Self {
        match mode {
            ExecutionMode::Sequential => Execution::Sequential,
            ExecutionMode::SharedMemory => Execution::SharedMemory { worker_count },
            ExecutionMode::Distributed => Execution::Distributed { worker_count },
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            Execution::Sequential => ExecutionMode::Sequential,
            Execution::SharedMemory { .. } => ExecutionMode::SharedMemory,
            Execution::Distributed { .. } => ExecutionMode::Distributed,
        }
    }

    /// Worker count; sequential runs count as a single worker
    pub fn worker_count(&self) -> u32 {
        match *self {
            Execution::Sequential => 1,
            Execution::SharedMemory { worker_count } | Execution::Distributed { worker_count } => {
                worker_count
            }
        }
    }
}

/// Measured benchmark operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CheckSym,
    Transpose,
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::CheckSym, Operation::Transpose];

    /// Display name used in chart titles ("CheckSym", "Transpose")
    pub fn title(self) -> &'static str {
        match self {
            Operation::CheckSym => "CheckSym",
            Operation::Transpose => "Transpose",
        }
    }

    /// Name of the timing column in the input table
    pub fn column(self) -> &'static str {
        match self {
            Operation::CheckSym => "checksym_time",
            Operation::Transpose => "transpose_time",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One timed benchmark trial, as read from the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub execution: Execution,
    /// Matrix dimension `n` (`n_matrix` column)
    pub problem_size: u64,
    pub iteration: i64,
    /// Seconds spent in the symmetry check
    pub checksym_time: f64,
    /// Seconds spent in the transpose
    pub transpose_time: f64,
}

impl TrialRecord {
    pub fn new(
        execution: Execution,
        problem_size: u64,
        iteration: i64,
        checksym_time: f64,
        transpose_time: f64,
    ) -> Self {
        Self {
            execution,
            problem_size,
            iteration,
            checksym_time,
            transpose_time,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.execution.mode()
    }

    pub fn worker_count(&self) -> u32 {
        self.execution.worker_count()
    }

    /// Timing of the given operation
    pub fn time(&self, operation: Operation) -> f64 {
        match operation {
            Operation::CheckSym => self.checksym_time,
            Operation::Transpose => self.transpose_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_counts_as_one_worker() {
        let exec = Execution::new(ExecutionMode::Sequential, 8);
        assert_eq!(exec, Execution::Sequential);
        assert_eq!(exec.worker_count(), 1);
    }

    #[test]
    fn test_parallel_modes_keep_worker_count() {
        let omp = Execution::new(ExecutionMode::SharedMemory, 16);
        let mpi = Execution::new(ExecutionMode::Distributed, 4);
        assert_eq!(omp.worker_count(), 16);
        assert_eq!(omp.mode(), ExecutionMode::SharedMemory);
        assert_eq!(mpi.worker_count(), 4);
        assert_eq!(mpi.mode(), ExecutionMode::Distributed);
    }

    #[test]
    fn test_worker_columns() {
        assert_eq!(ExecutionMode::Sequential.worker_column(), None);
        assert_eq!(ExecutionMode::SharedMemory.worker_column(), Some("n_threads"));
        assert_eq!(ExecutionMode::Distributed.worker_column(), Some("n_processes"));
    }

    #[test]
    fn test_trial_time_selects_column() {
        let trial = TrialRecord::new(Execution::Sequential, 1024, 0, 1.5, 2.5);
        assert_eq!(trial.time(Operation::CheckSym), 1.5);
        assert_eq!(trial.time(Operation::Transpose), 2.5);
    }

    #[test]
    fn test_execution_serializes_tagged() {
        let json = serde_json::to_string(&Execution::Distributed { worker_count: 8 }).unwrap();
        assert_eq!(json, r#"{"mode":"distributed","worker_count":8}"#);
    }
}
