//! CSV output format for scaling reports
//!
//! Long format, one row per plotted point: `chart,series,operation,x,y`.
//! Skipped analyses are not part of the table; they are logged instead.

use crate::render::{format_value, Renderer};
use crate::report::Report;
use anyhow::Result;
use std::io::Write;
use tracing::debug;

const HEADER: [&str; 5] = ["chart", "series", "operation", "x", "y"];

/// Writes every chart point as a CSV row
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    /// Generate CSV output as string
    pub fn to_csv(report: &Report) -> Result<String> {
        let mut buf = Vec::new();
        CsvRenderer.render(report, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl Renderer for CsvRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(HEADER)?;

        for chart in &report.charts {
            for row in chart.rows() {
                writer.write_record([
                    chart.id.as_str(),
                    row.series,
                    row.operation.title(),
                    row.x.to_string().as_str(),
                    format_value(row.y).as_str(),
                ])?;
            }
        }

        if !report.skipped.is_empty() {
            debug!(
                skipped = report.skipped.len(),
                "skipped analyses are not part of CSV output"
            );
        }

        writer.flush()?;
        Ok(())
    }
}
