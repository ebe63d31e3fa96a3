// Shared fixtures for integration tests
//
// Writes the three per-mode result tables into a temporary directory under
// the file names the benchmark jobs use.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SEQUENTIAL_CSV: &str = "\
n_matrix,iteration,checksym_time,transpose_time
1024,0,10.0,20.0
1024,1,10.0,20.0
2048,0,80.0,160.0
4096,0,640.0,1280.0
";

pub const OMP_CSV: &str = "\
n_threads,n_matrix,iteration,checksym_time,transpose_time
1,1024,0,10.0,20.0
1,1024,1,10.0,20.0
2,1024,0,5.0,10.0
4,1024,0,2.5,5.0
4,2048,0,5.0,10.0
16,4096,0,10.0,20.0
32,4096,0,4.0,8.0
";

pub const MPI_CSV: &str = "\
n_processes,n_matrix,iteration,checksym_time,transpose_time
1,1024,0,8.0,16.0
4,2048,0,2.0,4.0
16,4096,0,2.0,4.0
1,4096,0,640.0,1280.0
32,4096,0,20.0,40.0
";

/// Temporary results directory holding the given tables
pub struct ResultsDir {
    pub dir: TempDir,
}

impl ResultsDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// All three tables with the default fixture contents
    pub fn full() -> Self {
        Self::new()
            .with("sequential_results.csv", SEQUENTIAL_CSV)
            .with("omp_results.csv", OMP_CSV)
            .with("mpi_results.csv", MPI_CSV)
    }

    pub fn with(self, name: &str, contents: &str) -> Self {
        fs::write(self.dir.path().join(name), contents).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
