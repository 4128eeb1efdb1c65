//! Server-side SVG rendering for the dashboard charts.

use crate::chart::scale::{extent, extent_with_floor, BandScale, LinearScale, PointScale};
use std::fmt::Write;

/// Chart dimensions. Margins leave room for axis labels.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            margin_top: 30.0,
            margin_right: 30.0,
            margin_bottom: 30.0,
            margin_left: 50.0,
        }
    }
}

impl Frame {
    const fn bounds_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    const fn bounds_height(&self) -> f64 {
        self.height - self.margin_top - self.margin_bottom
    }
}

fn open_svg(out: &mut String, frame: Frame) {
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}"><g transform="translate({},{})">"#,
        frame.width, frame.height, frame.width, frame.height, frame.margin_left, frame.margin_top,
    );
}

fn close_svg(out: &mut String) {
    out.push_str("</g></svg>");
}

fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Horizontal gridline with its value label on the left.
fn gridline(out: &mut String, y: f64, width: f64, label: &str, emphasized: bool) {
    let stroke = if emphasized { "#333" } else { "#ddd" };
    let _ = write!(
        out,
        r#"<line x1="0" y1="{y:.1}" x2="{width:.1}" y2="{y:.1}" stroke="{stroke}"/><text x="-8" y="{y:.1}" text-anchor="end" alignment-baseline="central" font-size="12">{label}</text>"#,
    );
}

/// X-axis label under a bucket position.
fn x_label(out: &mut String, x: f64, y: f64, label: &str) {
    let _ = write!(
        out,
        r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" font-size="11">{}</text>"#,
        escape_text(label),
    );
}

/// Bar chart of (date, value) buckets, ascending left to right.
pub fn bar_chart(buckets: &[(String, f64)], frame: Frame) -> String {
    let mut out = String::with_capacity(2048);
    open_svg(&mut out, frame);

    let width = frame.bounds_width();
    let height = frame.bounds_height();
    let max = extent(buckets.iter().map(|(_, v)| *v))
        .map_or(1.0, |(_, hi)| hi.max(1.0));
    let y_scale = LinearScale::new((0.0, max), (height, 0.0));
    let x_scale = BandScale::new(
        buckets.iter().map(|(d, _)| d.clone()).collect(),
        (0.0, width),
        0.3,
    );

    for tick in y_scale.ticks(5) {
        gridline(
            &mut out,
            y_scale.scale(tick),
            width,
            &format_tick(tick),
            tick == 0.0,
        );
    }

    for (date, value) in buckets {
        if let Some(x) = x_scale.start(date) {
            let y = y_scale.scale(*value);
            let _ = write!(
                out,
                r##"<rect x="{x:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" fill="#6366f1"/>"##,
                x_scale.bandwidth(),
                height - y,
            );
            x_label(
                &mut out,
                x + x_scale.bandwidth() / 2.0,
                height + 16.0,
                date,
            );
        }
    }

    close_svg(&mut out);
    out
}

/// Line chart of (date, value) buckets, ascending left to right.
pub fn line_chart(points: &[(String, f64)], frame: Frame) -> String {
    let mut out = String::with_capacity(2048);
    open_svg(&mut out, frame);

    let width = frame.bounds_width();
    let height = frame.bounds_height();
    let max = extent(points.iter().map(|(_, v)| *v))
        .map_or(1.0, |(_, hi)| hi.max(1.0));
    let y_scale = LinearScale::new((0.0, max), (height, 0.0));
    let x_scale = PointScale::new(
        points.iter().map(|(d, _)| d.clone()).collect(),
        (0.0, width),
        0.4,
    );

    for tick in y_scale.ticks(5) {
        gridline(
            &mut out,
            y_scale.scale(tick),
            width,
            &format_tick(tick),
            tick == 0.0,
        );
    }

    let mut path = String::new();
    for (date, value) in points {
        if let Some(x) = x_scale.position(date) {
            let y = y_scale.scale(*value);
            let command = if path.is_empty() { 'M' } else { 'L' };
            let _ = write!(path, "{command}{x:.1},{y:.1}");
            let _ = write!(
                out,
                r##"<circle cx="{x:.1}" cy="{y:.1}" r="3" fill="#6366f1"/>"##,
            );
            x_label(&mut out, x, height + 16.0, date);
        }
    }
    if !path.is_empty() {
        let _ = write!(
            out,
            r##"<path d="{path}" fill="none" stroke="#6366f1" stroke-width="2"/>"##,
        );
    }

    close_svg(&mut out);
    out
}

/// Growth-rate line chart. The value domain is floored at ±100% so small
/// movements stay readable; undefined rates (null) break the line.
pub fn growth_chart(points: &[(String, Option<f64>)], frame: Frame) -> String {
    let mut out = String::with_capacity(2048);
    open_svg(&mut out, frame);

    let width = frame.bounds_width();
    let height = frame.bounds_height();
    let observed = extent(points.iter().filter_map(|(_, v)| *v)).unwrap_or((0.0, 0.0));
    let (lo, hi) = extent_with_floor(observed, 100.0);
    let y_scale = LinearScale::new((lo, hi), (height, 0.0));
    let x_scale = PointScale::new(
        points.iter().map(|(d, _)| d.clone()).collect(),
        (0.0, width),
        0.4,
    );

    for tick in y_scale.ticks(8) {
        gridline(
            &mut out,
            y_scale.scale(tick),
            width,
            &format!("{}%", format_tick(tick)),
            tick == 0.0,
        );
    }

    let mut path = String::new();
    let mut pen_down = false;
    for (date, rate) in points {
        let Some(x) = x_scale.position(date) else {
            continue;
        };
        x_label(&mut out, x, height + 16.0, date);
        match rate {
            Some(rate) => {
                let y = y_scale.scale(*rate);
                let command = if pen_down { 'L' } else { 'M' };
                let _ = write!(path, "{command}{x:.1},{y:.1}");
                let _ = write!(
                    out,
                    r##"<circle cx="{x:.1}" cy="{y:.1}" r="3" fill="#f43f5e"/>"##,
                );
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    if !path.is_empty() {
        let _ = write!(
            out,
            r##"<path d="{path}" fill="none" stroke="#f43f5e" stroke-width="2"/>"##,
        );
    }

    close_svg(&mut out);
    out
}

/// Trim trailing zeros off tick labels: 20 not 20.0, 2.5 stays 2.5.
fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
