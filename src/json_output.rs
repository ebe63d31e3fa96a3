//! JSON output format for scaling reports
//!
//! Non-finite metric values are written as the strings `"NaN"`,
//! `"Infinity"` and `"-Infinity"` (see [`crate::series::non_finite`]), so the
//! "no data" and "unboundedly fast" sentinels survive serialization.

use crate::render::Renderer;
use crate::report::{Chart, InputSummary, Report, SkippedAnalysis};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Crate version that produced the document
    pub version: String,
    /// Format name
    pub format: String,
    /// Input tables and their parse counters
    pub inputs: Vec<InputSummary>,
    pub charts: Vec<Chart>,
    /// Analyses or charts that were not produced
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped: Vec<SkippedAnalysis>,
}

impl JsonOutput {
    pub fn from_report(report: &Report) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "parscale-json-v1".to_string(),
            inputs: report.inputs.clone(),
            charts: report.charts.clone(),
            skipped: report.skipped.clone(),
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
    }
}

/// Writes the report as one JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<()> {
        let json = JsonOutput::from_report(report).to_json()?;
        writeln!(out, "{}", json)?;
        Ok(())
    }
}
