//! Candlestick chart with Bollinger Bands and the trend moving average,
//! written as a standalone SVG document.

use crate::domain::analysis::{AugmentedSeries, IndicatorPoint};
use crate::domain::errors::RenderError;
use crate::domain::ports::{ChartArtifact, ChartRenderer};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 600.0;
const PAD: f64 = 60.0;
const SVG_MIME: &str = "image/svg+xml";

pub struct SvgChartRenderer {
    output_dir: PathBuf,
}

impl SvgChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn chart_path(&self, series: &AugmentedSeries) -> PathBuf {
        self.output_dir
            .join(format!("{}_chart.svg", series.symbol.file_stem()))
    }
}

struct Scale {
    min: f64,
    max: f64,
    count: usize,
}

impl Scale {
    fn x(&self, index: usize) -> f64 {
        let span = (self.count.max(2) - 1) as f64;
        PAD + index as f64 * (WIDTH - 2.0 * PAD) / span
    }

    fn y(&self, value: f64) -> f64 {
        let range = (self.max - self.min).max(f64::EPSILON);
        HEIGHT - PAD - (value - self.min) / range * (HEIGHT - 2.0 * PAD)
    }
}

/// Builds the SVG document. Pure; no filesystem access.
pub fn render_svg(series: &AugmentedSeries) -> String {
    let points = &series.points;
    let (min, max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        let i = &p.indicators;
        (
            lo.min(p.candle.low).min(i.bb_lower),
            hi.max(p.candle.high).max(i.bb_upper),
        )
    });
    let scale = Scale {
        min,
        max,
        count: points.len(),
    };
    let body_width = ((WIDTH - 2.0 * PAD) / points.len().max(1) as f64 * 0.6).clamp(1.0, 14.0);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" font-family="sans-serif" font-size="18">{} ({}) - Price, Bollinger Bands and MA</text>"#,
        PAD, series.symbol, series.interval
    );
    for value in [max, min] {
        let _ = writeln!(
            svg,
            r#"<text x="4" y="{:.1}" font-family="sans-serif" font-size="11">{:.2}</text>"#,
            scale.y(value),
            value
        );
    }

    for (index, point) in points.iter().enumerate() {
        let c = &point.candle;
        let color = if c.close > c.open { "green" } else { "red" };
        let x = scale.x(index);
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="{color}"/>"#,
            scale.y(c.high),
            scale.y(c.low),
        );
        let top = scale.y(c.open.max(c.close));
        let bottom = scale.y(c.open.min(c.close));
        let _ = writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{color}"/>"#,
            x - body_width / 2.0,
            top,
            body_width,
            (bottom - top).max(1.0),
        );
    }

    polyline(&mut svg, &scale, points, "Upper band", "blue", true, |p| {
        p.indicators.bb_upper
    });
    polyline(&mut svg, &scale, points, "Lower band", "blue", true, |p| {
        p.indicators.bb_lower
    });
    polyline(&mut svg, &scale, points, "Moving average", "orange", false, |p| {
        p.indicators.moving_average
    });

    svg.push_str("</svg>\n");
    svg
}

fn polyline(
    svg: &mut String,
    scale: &Scale,
    points: &[IndicatorPoint],
    label: &str,
    stroke: &str,
    dashed: bool,
    value: impl Fn(&IndicatorPoint) -> f64,
) {
    let coords: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", scale.x(i), scale.y(value(p))))
        .collect();
    let dash = if dashed { r#" stroke-dasharray="6 4""# } else { "" };
    let _ = writeln!(
        svg,
        r#"<polyline points="{}" fill="none" stroke="{}"{}><title>{}</title></polyline>"#,
        coords.join(" "),
        stroke,
        dash,
        label
    );
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, series: &AugmentedSeries) -> Result<Option<ChartArtifact>, RenderError> {
        if series.is_empty() {
            return Ok(None);
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            RenderError::Failed(format!(
                "cannot create {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let path = self.chart_path(series);
        std::fs::write(&path, render_svg(series))
            .map_err(|e| RenderError::Failed(format!("cannot write {}: {}", path.display(), e)))?;

        debug!("SvgChartRenderer: Wrote {}", path.display());
        Ok(Some(ChartArtifact {
            path,
            mime: SVG_MIME,
        }))
    }
}

/// Renderer used when charts are disabled
pub struct NoopChartRenderer;

impl ChartRenderer for NoopChartRenderer {
    fn render(&self, _series: &AugmentedSeries) -> Result<Option<ChartArtifact>, RenderError> {
        Ok(None)
    }
}
