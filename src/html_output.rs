//! HTML output format for scaling reports
//!
//! Self-contained page with embedded CSS: one table per chart (worker count
//! or problem size down the rows, one column per series), followed by the
//! input summary and any skipped analyses.

use crate::render::{axis_name, format_value, Renderer};
use crate::report::{Chart, Report};
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

const STYLES: &str = "
body { font-family: sans-serif; margin: 20px; background: #f5f5f5; }
table { border-collapse: collapse; background: white; margin-bottom: 20px; }
th, td { border: 1px solid #ddd; padding: 4px 10px; text-align: right; font-family: monospace; }
th { background: #4a90d9; color: white; }
.meta { color: #666; margin-bottom: 6px; }
.sentinel { color: #c00; }
.missing { color: #bbb; }
";

/// Writes the report as a standalone HTML document
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

/// Escape text for element content and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<tr>` of header cells, text escaped
fn header_row<'s>(cells: impl IntoIterator<Item = &'s str>) -> String {
    let cells: String = cells
        .into_iter()
        .map(|c| format!("<th>{}</th>", escape(c)))
        .collect();
    format!("<tr>{}</tr>", cells)
}

/// Value cell; sentinels and gaps get their own class
fn value_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("<td>{}</td>", format_value(v)),
        Some(v) => format!(r#"<td class="sentinel">{}</td>"#, format_value(v)),
        None => r#"<td class="missing">&ndash;</td>"#.to_string(),
    }
}

impl HtmlRenderer {
    /// One chart as a pivot table: x values down, series across
    fn render_chart(html: &mut String, chart: &Chart) {
        let rows = chart.rows();

        let mut labels: Vec<&str> = Vec::new();
        for row in &rows {
            if !labels.contains(&row.series) {
                labels.push(row.series);
            }
        }

        let mut grid: BTreeMap<u64, Vec<Option<f64>>> = BTreeMap::new();
        for row in &rows {
            let column = labels.iter().position(|l| *l == row.series).unwrap_or(0);
            let cells = grid.entry(row.x).or_insert_with(|| vec![None; labels.len()]);
            cells[column] = Some(row.y);
        }

        let _ = writeln!(
            html,
            r#"<h2 id="{}">{}</h2>"#,
            escape(&chart.id),
            escape(&chart.title)
        );
        let _ = writeln!(
            html,
            r#"<div class="meta">y: {} &middot; axes: {}</div>"#,
            escape(&chart.y_label),
            axis_name(chart.axis_scale)
        );
        html.push_str("<table>\n");
        let header = std::iter::once(chart.x_label.as_str()).chain(labels.iter().copied());
        let _ = writeln!(html, "{}", header_row(header));
        for (x, values) in &grid {
            let cells: String = values.iter().map(|v| value_cell(*v)).collect();
            let _ = writeln!(html, "<tr><td>{}</td>{}</tr>", x, cells);
        }
        html.push_str("</table>\n");
    }

    fn render_inputs(html: &mut String, report: &Report) {
        if report.inputs.is_empty() {
            return;
        }
        html.push_str("<h2>Inputs</h2>\n<table>\n");
        let header = ["mode", "source", "rows", "malformed", "rejected", "groups"];
        let _ = writeln!(html, "{}", header_row(header));
        for input in &report.inputs {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                input.mode,
                escape(&input.source),
                input.rows_read,
                input.malformed_rows,
                input.rejected_trials,
                input.groups
            );
        }
        html.push_str("</table>\n");
    }

    fn render_skipped(html: &mut String, report: &Report) {
        if report.skipped.is_empty() {
            return;
        }
        html.push_str("<h2>Skipped</h2>\n<table>\n");
        let _ = writeln!(html, "{}", header_row(["analysis", "reason"]));
        for skipped in &report.skipped {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&skipped.analysis),
                escape(&skipped.reason)
            );
        }
        html.push_str("</table>\n");
    }

    /// Complete HTML document
    pub fn to_html(report: &Report) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str("<title>Parallel Scaling Report</title>\n");
        let _ = writeln!(html, "<style>{}</style>", STYLES);
        html.push_str("</head>\n<body>\n<h1>Parallel Scaling Report</h1>\n");

        for chart in &report.charts {
            Self::render_chart(&mut html, chart);
        }
        Self::render_inputs(&mut html, report);
        Self::render_skipped(&mut html, report);

        html.push_str("</body>\n</html>\n");
        html
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<()> {
        out.write_all(Self::to_html(report).as_bytes())?;
        Ok(())
    }
}
