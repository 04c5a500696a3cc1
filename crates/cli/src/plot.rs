//! Latency scatter chart of one series
//!
//! The chart is drawn with ratatui into an off-screen buffer, then flattened
//! to plain text so it can be printed like any other report section.

use probe_lib::report::{ChartSeries, PointKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::{self, Marker},
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

pub const DEFAULT_WIDTH: u16 = 72;
pub const DEFAULT_HEIGHT: u16 = 16;

const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 8;

const POINT_COLOR: Color = Color::Cyan;
const ANOMALY_COLOR: Color = Color::Red;
const MEAN_COLOR: Color = Color::Yellow;

#[derive(Debug, Clone, Copy)]
pub struct PlotSize {
    pub width: u16,
    pub height: u16,
}

impl Default for PlotSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Render latency (y) against sample index (x) as text
///
/// Baseline and normal points are drawn `o`, anomalies `x`, and the
/// baseline mean as a `-` line. Empty series render nothing.
pub fn render_scatter(series: &ChartSeries, size: PlotSize) -> String {
    render_buffer(series, size)
        .map(|buf| buffer_to_text(&buf))
        .unwrap_or_default()
}

fn render_buffer(series: &ChartSeries, size: PlotSize) -> Option<Buffer> {
    let (lo, hi) = series.min_max()?;
    let mean = series.baseline.map(|b| b.mean);
    let (lo, hi) = match mean {
        Some(m) => (lo.min(m), hi.max(m)),
        None => (lo, hi),
    };
    let pad = if hi - lo < f64::EPSILON {
        1.0
    } else {
        (hi - lo) * 0.05
    };
    let (y_min, y_max) = (lo - pad, hi + pad);
    let x_max = series.total_records.max(1) as f64;

    let normal_points: Vec<(f64, f64)> = series
        .points
        .iter()
        .filter(|p| p.kind != PointKind::Anomaly)
        .map(|p| (p.x as f64, p.latency_ms))
        .collect();
    let anomaly_points: Vec<(f64, f64)> = series
        .anomalies()
        .map(|p| (p.x as f64, p.latency_ms))
        .collect();
    let mean_line: Vec<(f64, f64)> = mean
        .map(|m| vec![(0.5, m), (x_max + 0.5, m)])
        .unwrap_or_default();

    // Later datasets draw over earlier ones
    let mut datasets = Vec::with_capacity(3);
    if !mean_line.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(MEAN_COLOR))
                .data(&mean_line),
        );
    }
    datasets.push(
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(POINT_COLOR))
            .data(&normal_points),
    );
    datasets.push(
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(ANOMALY_COLOR))
            .data(&anomaly_points),
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", series.label())),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.5, x_max + 0.5])
                .labels(vec![
                    Span::raw("1"),
                    Span::raw(series.total_records.to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.2}", y_min)),
                    Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.2}", y_max)),
                ]),
        );

    let area = Rect::new(
        0,
        0,
        size.width.max(MIN_WIDTH),
        size.height.max(MIN_HEIGHT),
    );
    let mut buf = Buffer::empty(area);
    chart.render(area, &mut buf);
    Some(buf)
}

fn buffer_to_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            let cell = &buf[(x, y)];
            line.push_str(cell_text(cell.symbol(), cell.fg));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Plain-text stand-in for a rendered cell
fn cell_text(symbol: &str, fg: Color) -> &str {
    if symbol == symbols::DOT && fg == ANOMALY_COLOR {
        "x"
    } else if symbol == symbols::DOT && fg == POINT_COLOR {
        "o"
    } else if fg == MEAN_COLOR && !symbol.trim().is_empty() {
        "-"
    } else {
        symbol
    }
}
