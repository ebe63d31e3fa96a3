//! Renderer interface and the plain-text renderer
//!
//! Drawing charts is left to external tools; renderers here emit the
//! finished series in text, JSON, CSV or HTML form.

use crate::cli::OutputFormat;
use crate::csv_output::CsvRenderer;
use crate::html_output::HtmlRenderer;
use crate::json_output::JsonRenderer;
use crate::report::{AxisScale, Chart, Report};
use anyhow::Result;
use std::io::Write;

/// Consumes a finished report
pub trait Renderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<()>;
}

/// Renderer for the requested output format
pub fn renderer_for(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Csv => Box::new(CsvRenderer),
        OutputFormat::Html => Box::new(HtmlRenderer),
    }
}

/// Format a metric value, keeping the `inf`/`NaN` sentinels readable
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format!("{:.6}", value)
    }
}

pub(crate) fn axis_name(scale: AxisScale) -> &'static str {
    match scale {
        AxisScale::Linear => "linear",
        AxisScale::LogLog => "log-log",
    }
}

/// Human-readable tables, one block per chart
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    fn render_chart(chart: &Chart, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "=== {} ===", chart.title)?;
        writeln!(
            out,
            "x: {}  y: {}  axes: {}",
            chart.x_label,
            chart.y_label,
            axis_name(chart.axis_scale)
        )?;

        let rows = chart.rows();
        let mut current: Option<&str> = None;
        for row in &rows {
            if current != Some(row.series) {
                writeln!(out)?;
                writeln!(out, "{}:", row.series)?;
                current = Some(row.series);
            }
            writeln!(out, "  {:>8} {:>16}", row.x, format_value(row.y))?;
        }
        writeln!(out)?;
        Ok(())
    }
}

impl Renderer for TextRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<()> {
        if report.charts.is_empty() {
            writeln!(out, "No charts produced.")?;
        }

        for chart in &report.charts {
            Self::render_chart(chart, out)?;
        }

        if !report.skipped.is_empty() {
            writeln!(out, "Skipped:")?;
            for skipped in &report.skipped {
                writeln!(out, "  {}: {}", skipped.analysis, skipped.reason)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::Operation;
    use crate::report::{ChartData, SkippedAnalysis};
    use crate::series::{ScalingPoint, ScalingSeries};

    pub(crate) fn sample_report() -> Report {
        Report {
            inputs: Vec::new(),
            charts: vec![Chart {
                id: "strong-omp-checksym-speedup".to_string(),
                title: "Strong Scaling - CheckSym (OpenMP)".to_string(),
                x_label: "Number of Threads (t)".to_string(),
                y_label: "Speedup (CheckSym)".to_string(),
                axis_scale: AxisScale::Linear,
                data: ChartData::Scaling(vec![ScalingSeries {
                    label: "n=1024".to_string(),
                    operation: Operation::CheckSym,
                    points: vec![
                        ScalingPoint {
                            worker_count: 1,
                            value: 1.0,
                        },
                        ScalingPoint {
                            worker_count: 4,
                            value: f64::INFINITY,
                        },
                    ],
                }]),
            }],
            skipped: vec![SkippedAnalysis {
                analysis: "strong-mpi".to_string(),
                reason: "distributed table unavailable".to_string(),
            }],
        }
    }

    #[test]
    fn test_format_value_sentinels() {
        assert_eq!(format_value(2.0), "2.000000");
        assert_eq!(format_value(f64::INFINITY), "inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_value(f64::NAN), "NaN");
    }

    #[test]
    fn test_text_renderer_layout() {
        let mut out = Vec::new();
        TextRenderer.render(&sample_report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("=== Strong Scaling - CheckSym (OpenMP) ==="));
        assert!(text.contains("axes: linear"));
        assert!(text.contains("n=1024:"));
        assert!(text.contains("inf"));
        assert!(text.contains("strong-mpi: distributed table unavailable"));
    }

    #[test]
    fn test_text_renderer_empty_report() {
        let report = Report {
            inputs: Vec::new(),
            charts: Vec::new(),
            skipped: Vec::new(),
        };
        let mut out = Vec::new();
        TextRenderer.render(&report, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No charts produced.\n");
    }
}
