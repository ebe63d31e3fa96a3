//! Baseline lookup for speedup computations
//!
//! Strong scaling compares against the single-worker run at the same problem
//! size. Weak scaling compares against the first step of the scaling-law
//! table. Keys are unique in [`AggregatedTable`], so a lookup yields exactly
//! one record or nothing.

use crate::aggregate::{AggregatedRecord, AggregatedTable};
use crate::config::WeakScalingPoint;
use crate::record::ExecutionMode;

/// Locates single-worker reference records in an aggregated table
#[derive(Debug, Clone, Copy)]
pub struct BaselineResolver<'a> {
    table: &'a AggregatedTable,
}

impl<'a> BaselineResolver<'a> {
    pub fn new(table: &'a AggregatedTable) -> Self {
        Self { table }
    }

    /// The worker_count = 1 record of the (mode, problem size) partition
    pub fn strong(&self, mode: ExecutionMode, problem_size: u64) -> Option<&'a AggregatedRecord> {
        self.table.get(mode, 1, problem_size)
    }

    /// The record matching the first step of the weak-scaling table
    ///
    /// Returns `None` for an empty table or when that configuration was never
    /// measured.
    pub fn weak(
        &self,
        mode: ExecutionMode,
        plan: &[WeakScalingPoint],
    ) -> Option<&'a AggregatedRecord> {
        let first = plan.first()?;
        self.table.get(mode, first.worker_count, first.problem_size)
    }
}
