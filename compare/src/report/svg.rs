//! RMSE-per-frame line chart as a standalone SVG document.

use std::path::PathBuf;

use tracing::info;

use super::{ErrorReport, ReportError, ReportSink};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 800.0;
const LEFT: f64 = 100.0;
const RIGHT: f64 = 770.0;
const TOP: f64 = 70.0;
const BOTTOM: f64 = 660.0;
const LEGEND_Y: f64 = 740.0;

/// matplotlib's tab10 palette, reordered so the first three techniques get
/// blue, green and red.
const PALETTE: [&str; 8] = [
    "#1f77b4", "#2ca02c", "#d62728", "#ff7f0e", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

pub struct SvgPlot {
    path: PathBuf,
    title: String,
}

impl SvgPlot {
    pub fn new(path: PathBuf, title: String) -> Self {
        Self { path, title }
    }
}

impl ReportSink for SvgPlot {
    fn write(&mut self, report: &ErrorReport) -> Result<(), ReportError> {
        std::fs::write(&self.path, render(report, &self.title))
            .map_err(|e| ReportError::Write(self.path.clone(), e))?;
        info!(path = %self.path.display(), "RMSE plot written");
        Ok(())
    }

    fn name(&self) -> &str {
        "svg"
    }
}

/// Axis mapping from data space onto the plot rectangle. Both axes start at 0.
struct Axes {
    x_max: f64,
    y_max: f64,
}

impl Axes {
    fn x(&self, v: f64) -> f64 {
        LEFT + v / self.x_max * (RIGHT - LEFT)
    }

    fn y(&self, v: f64) -> f64 {
        BOTTOM - v / self.y_max * (BOTTOM - TOP)
    }
}

/// Round `raw` up to 1, 2 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let exp = 10f64.powf(raw.log10().floor());
    let fraction = raw / exp;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * exp
}

/// 1, 2, 5, 10, 20, 50, ... up to `x_max`.
fn frame_ticks(x_max: f64) -> Vec<u64> {
    let mut ticks = Vec::new();
    let mut decade = 1u64;
    'outer: loop {
        for m in [1, 2, 5] {
            let t = m * decade;
            if t as f64 > x_max {
                break 'outer;
            }
            ticks.push(t);
        }
        decade *= 10;
    }
    ticks
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render(report: &ErrorReport, title: &str) -> String {
    let frames = report.frame_count();
    let x_max = frames.saturating_sub(1).max(1) as f64;

    let raw_max = report.max_rmse() * 1.05;
    let raw_max = if raw_max > 0.0 && raw_max.is_finite() { raw_max } else { 1.0 };
    let y_step = nice_step(raw_max / 5.0);
    let y_ticks = (raw_max / y_step).ceil() as usize;
    let axes = Axes {
        x_max,
        y_max: y_step * y_ticks as f64,
    };
    let decimals = (-y_step.log10().floor()).max(0.0) as usize;

    let mut svg = String::with_capacity(4096 + 64 * frames * report.series.len());
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\">\n"
    ));
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#ffffff\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"40\" font-size=\"22\" text-anchor=\"middle\">{}</text>\n",
        (LEFT + RIGHT) / 2.0,
        escape(title)
    ));

    // Grid and tick labels
    for k in 0..=y_ticks {
        let v = k as f64 * y_step;
        let y = axes.y(v);
        svg.push_str(&format!(
            "  <line x1=\"{LEFT}\" y1=\"{y:.2}\" x2=\"{RIGHT}\" y2=\"{y:.2}\" stroke=\"#cccccc\" stroke-width=\"0.5\" stroke-dasharray=\"4 3\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.2}\" font-size=\"16\" text-anchor=\"end\">{v:.decimals$}</text>\n",
            LEFT - 8.0,
            y + 5.0
        ));
    }
    for t in frame_ticks(x_max) {
        let x = axes.x(t as f64);
        svg.push_str(&format!(
            "  <line x1=\"{x:.2}\" y1=\"{TOP}\" x2=\"{x:.2}\" y2=\"{BOTTOM}\" stroke=\"#cccccc\" stroke-width=\"0.5\" stroke-dasharray=\"4 3\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{x:.2}\" y=\"{:.1}\" font-size=\"16\" text-anchor=\"middle\">{t}</text>\n",
            BOTTOM + 24.0
        ));
    }

    // Axes
    svg.push_str(&format!(
        "  <polyline points=\"{LEFT},{TOP} {LEFT},{BOTTOM} {RIGHT},{BOTTOM}\" fill=\"none\" stroke=\"#333333\" stroke-width=\"1\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"20\" text-anchor=\"middle\">Frame Number</text>\n",
        (LEFT + RIGHT) / 2.0,
        BOTTOM + 52.0
    ));
    svg.push_str(&format!(
        "  <text x=\"30\" y=\"{0:.1}\" font-size=\"20\" text-anchor=\"middle\" transform=\"rotate(-90 30 {0:.1})\">RMSE</text>\n",
        (TOP + BOTTOM) / 2.0
    ));

    // Series
    for (i, series) in report.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points = series
            .rmse
            .iter()
            .enumerate()
            // Non-finite values cannot be placed on the axes.
            .filter(|(_, v)| v.is_finite())
            .map(|(frame, &v)| format!("{:.2},{:.2}", axes.x(frame as f64), axes.y(v)))
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            "  <polyline points=\"{points}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\" stroke-linejoin=\"round\"><title>{}</title></polyline>\n",
            escape(&series.technique)
        ));
    }

    // Legend, centred below the plot
    let slot = 160.0;
    let start = (WIDTH - slot * report.series.len() as f64) / 2.0;
    for (i, series) in report.series.iter().enumerate() {
        let x = start + slot * i as f64;
        let color = PALETTE[i % PALETTE.len()];
        svg.push_str(&format!(
            "  <line x1=\"{x:.1}\" y1=\"{LEGEND_Y}\" x2=\"{:.1}\" y2=\"{LEGEND_Y}\" stroke=\"{color}\" stroke-width=\"2\"/>\n",
            x + 30.0
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"16\">{}</text>\n",
            x + 38.0,
            LEGEND_Y + 5.0,
            escape(&series.technique)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}
