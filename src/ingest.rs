//! Delimited-text ingestion of benchmark trials
//!
//! Reads one CSV table per execution mode. The header row is mandatory and
//! columns are located by name, so column order and extra columns do not
//! matter. Rows that cannot be parsed are dropped and counted; a missing
//! required column fails the whole table.

use crate::record::{Execution, ExecutionMode, Operation, TrialRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while reading a trial table
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("{path}:{line}: malformed row: {reason}")]
    MalformedRow {
        path: String,
        line: u64,
        reason: String,
    },

    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

const PROBLEM_SIZE_COLUMN: &str = "n_matrix";
const ITERATION_COLUMN: &str = "iteration";

/// Counters for one table load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Data rows seen (header excluded)
    pub rows_read: u64,
    /// Rows excluded because a field could not be parsed
    pub malformed_rows: u64,
}

/// Trials parsed from one table
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub mode: ExecutionMode,
    /// Path or name the table was read from
    pub source: String,
    pub trials: Vec<TrialRecord>,
    pub stats: IngestStats,
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    workers: Option<usize>,
    problem_size: usize,
    iteration: usize,
    checksym: usize,
    transpose: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, mode: ExecutionMode, source: &str) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| IngestError::MissingColumn {
                    path: source.to_string(),
                    column: name.to_string(),
                })
        };

        let workers = match mode.worker_column() {
            Some(column) => Some(find(column)?),
            None => None,
        };

        Ok(Self {
            workers,
            problem_size: find(PROBLEM_SIZE_COLUMN)?,
            iteration: find(ITERATION_COLUMN)?,
            checksym: find(Operation::CheckSym.column())?,
            transpose: find(Operation::Transpose.column())?,
        })
    }
}

/// Read a trial table from a CSV file
pub fn read_trials<P: AsRef<Path>>(path: P, mode: ExecutionMode) -> Result<LoadedTable> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let file = File::open(path).map_err(|source_err| IngestError::Io {
        path: source.clone(),
        source: source_err,
    })?;
    parse_trials(file, mode, &source)
}

/// Parse a trial table from any reader
///
/// `source` names the input in error messages and logs.
pub fn parse_trials<R: Read>(reader: R, mode: ExecutionMode, source: &str) -> Result<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Csv {
            path: source.to_string(),
            source: e,
        })?
        .clone();
    let columns = ColumnIndex::resolve(&headers, mode, source)?;

    let mut trials = Vec::new();
    let mut stats = IngestStats::default();

    for (index, row) in reader.records().enumerate() {
        stats.rows_read += 1;
        // Header is line 1
        let fallback_line = index as u64 + 2;

        let record = match row {
            Ok(record) => record,
            Err(e) if e.is_io_error() => {
                return Err(IngestError::Csv {
                    path: source.to_string(),
                    source: e,
                });
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                skip_row(&mut stats, source, line, &e.to_string());
                continue;
            }
        };

        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);

        match parse_row(&record, mode, columns) {
            Ok(trial) => trials.push(trial),
            Err(reason) => skip_row(&mut stats, source, line, &reason),
        }
    }

    debug!(
        source,
        %mode,
        rows = stats.rows_read,
        malformed = stats.malformed_rows,
        "loaded trial table"
    );

    Ok(LoadedTable {
        mode,
        source: source.to_string(),
        trials,
        stats,
    })
}

fn skip_row(stats: &mut IngestStats, source: &str, line: u64, reason: &str) {
    stats.malformed_rows += 1;
    let err = IngestError::MalformedRow {
        path: source.to_string(),
        line,
        reason: reason.to_string(),
    };
    warn!("{}", err);
}

fn parse_row(
    record: &csv::StringRecord,
    mode: ExecutionMode,
    columns: ColumnIndex,
) -> std::result::Result<TrialRecord, String> {
    let worker_count = match columns.workers {
        Some(idx) => {
            let column = mode.worker_column().unwrap_or("workers");
            let value = parse_integer(field(record, idx, column)?, column)?;
            if value == 0 {
                return Err(format!("{} must be >= 1", column));
            }
            u32::try_from(value).map_err(|_| format!("{} out of range: {}", column, value))?
        }
        None => 1,
    };

    let problem_size = parse_integer(
        field(record, columns.problem_size, PROBLEM_SIZE_COLUMN)?,
        PROBLEM_SIZE_COLUMN,
    )?;
    if problem_size == 0 {
        return Err(format!("{} must be > 0", PROBLEM_SIZE_COLUMN));
    }

    let iteration = parse_signed(
        field(record, columns.iteration, ITERATION_COLUMN)?,
        ITERATION_COLUMN,
    )?;
    let checksym_time = parse_timing(record, columns.checksym, Operation::CheckSym)?;
    let transpose_time = parse_timing(record, columns.transpose, Operation::Transpose)?;

    Ok(TrialRecord::new(
        Execution::new(mode, worker_count),
        problem_size,
        iteration,
        checksym_time,
        transpose_time,
    ))
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    column: &str,
) -> std::result::Result<&'r str, String> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(format!("empty {} field", column)),
        None => Err(format!("missing {} field", column)),
    }
}

/// Parse a non-negative integer, accepting integral float text such as "4.0"
fn parse_integer(value: &str, column: &str) -> std::result::Result<u64, String> {
    if let Ok(v) = value.parse::<u64>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
            Ok(v as u64)
        }
        _ => Err(format!("invalid {} value '{}'", column, value)),
    }
}

fn parse_signed(value: &str, column: &str) -> std::result::Result<i64, String> {
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("invalid {} value '{}'", column, value)),
    }
}

fn parse_timing(
    record: &csv::StringRecord,
    idx: usize,
    operation: Operation,
) -> std::result::Result<f64, String> {
    let column = operation.column();
    let value = field(record, idx, column)?;
    value
        .parse::<f64>()
        .map_err(|_| format!("invalid {} value '{}'", column, value))
}
