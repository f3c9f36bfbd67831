// src/series.rs

use tracing::warn;

use crate::color::{ColorSpec, Rgb};
use crate::constants::{DEFAULT_MARKER_SIZE, MARKER_ROTATION};
use crate::error::{PlotError, Result};

/// How consecutive points of a series are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    DashDot,
    /// Points are not connected (scatter).
    None,
}

impl LineStyle {
    /// Parses the usual symbols: `-`, `--`, `:`, `-.`, `none`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "-" | "solid" => Some(LineStyle::Solid),
            "--" | "dashed" => Some(LineStyle::Dashed),
            ":" | "dotted" => Some(LineStyle::Dotted),
            "-." | "dashdot" => Some(LineStyle::DashDot),
            "none" | "" => Some(LineStyle::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    None,
    Circle,
    Square,
    Diamond,
    Triangle,
    Cross,
    Plus,
    Point,
}

impl Marker {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "none" | "" => Some(Marker::None),
            "o" => Some(Marker::Circle),
            "s" => Some(Marker::Square),
            "d" => Some(Marker::Diamond),
            "^" => Some(Marker::Triangle),
            "x" => Some(Marker::Cross),
            "+" => Some(Marker::Plus),
            "." => Some(Marker::Point),
            _ => None,
        }
    }

    /// Marker used for scatter and single-point series at a cycle position.
    pub fn rotation(position: usize) -> Self {
        MARKER_ROTATION[position % MARKER_ROTATION.len()]
    }
}

/// Per-call options for `Figure::add_series`. Consumed once.
#[derive(Debug, Clone, Default)]
pub struct SeriesOptions {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    /// Registry name; empty means auto-named.
    pub name: String,
    /// Legend text. Series without a label stay out of the legend.
    pub label: Option<String>,
    pub color: Option<ColorSpec>,
    pub marker: Option<Marker>,
    pub line_style: Option<LineStyle>,
    pub line_width: Option<f64>,
    pub marker_size: Option<f64>,
    pub scatter: bool,
    /// Explicit limits; applied when either bound is non-zero.
    pub xlim: [f64; 2],
    pub ylim: [f64; 2],
    pub zlim: [f64; 2],
}

impl SeriesOptions {
    pub fn xy(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y, ..Self::default() }
    }

    pub fn y(y: Vec<f64>) -> Self {
        Self { y, ..Self::default() }
    }

    pub fn xyz(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        Self { x, y, z, ..Self::default() }
    }

    /// Full-width horizontal line at `y`.
    pub fn hline(y: f64) -> Self {
        Self { y: vec![y], ..Self::default() }
    }

    /// Full-height vertical line at `x`.
    pub fn vline(x: f64) -> Self {
        Self { x: vec![x], ..Self::default() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let l = label.into();
        if !l.is_empty() {
            self.label = Some(l);
        }
        self
    }

    pub fn with_color(mut self, color: impl Into<ColorSpec>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_line_style(mut self, style: LineStyle) -> Self {
        self.line_style = Some(style);
        self
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn with_marker_size(mut self, size: f64) -> Self {
        self.marker_size = Some(size);
        self
    }

    pub fn scatter(mut self) -> Self {
        self.scatter = true;
        self
    }

    pub fn with_xlim(mut self, lo: f64, hi: f64) -> Self {
        self.xlim = [lo, hi];
        self
    }

    pub fn with_ylim(mut self, lo: f64, hi: f64) -> Self {
        self.ylim = [lo, hi];
        self
    }

    pub fn with_zlim(mut self, lo: f64, hi: f64) -> Self {
        self.zlim = [lo, hi];
        self
    }
}

/// Which coordinate a span line is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanAxis {
    /// Vertical line at a fixed x.
    X,
    /// Horizontal line at a fixed y.
    Y,
    /// Horizontal plane level at a fixed z (3D axes only).
    Z,
}

/// Style shared by data series and span lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    /// Set when the caller chose the color; such series stay out of the color cycle.
    pub explicit_color: bool,
    /// 1-based palette slot the color came from, re-read when the scheme changes.
    pub palette_index: Option<usize>,
    pub line_style: LineStyle,
    pub line_width: f64,
    /// Set when the caller chose the width; recipes leave it alone.
    pub explicit_width: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Empty for 2D series.
    pub z: Vec<f64>,
    pub stroke: Stroke,
    pub marker: Marker,
    pub marker_size: f64,
    pub label: Option<String>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn is_3d(&self) -> bool {
        !self.z.is_empty()
    }

    pub fn is_marker_only(&self) -> bool {
        self.stroke.line_style == LineStyle::None && self.marker != Marker::None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanLine {
    pub axis: SpanAxis,
    pub value: f64,
    pub stroke: Stroke,
    pub label: Option<String>,
}

/// Cycle state of the target axes at the time a series is added.
#[derive(Debug, Clone)]
pub struct CycleDefaults<'a> {
    pub palette: &'a [Rgb],
    pub color_position: usize,
    pub line_style: LineStyle,
    pub line_width: f64,
}

impl CycleDefaults<'_> {
    fn color(&self) -> Rgb {
        if self.palette.is_empty() {
            return Rgb::BLACK;
        }
        self.palette[self.color_position % self.palette.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSeries {
    Series(Series),
    Span(SpanLine),
}

/// Turns call options into a concrete series or span line using the axes' cycle defaults.
pub fn resolve_series(options: SeriesOptions, defaults: &CycleDefaults<'_>) -> Result<ResolvedSeries> {
    let stroke = resolve_stroke(&options, defaults);

    if let Some((axis, value)) = span_of(&options) {
        if !value.is_finite() {
            return Err(PlotError::EmptyData(format!("span line at non-finite {value}")));
        }
        return Ok(ResolvedSeries::Span(SpanLine {
            axis,
            value,
            stroke,
            label: options.label,
        }));
    }

    let SeriesOptions { mut x, y, z, .. } = options;
    if y.is_empty() {
        return Err(PlotError::EmptyData("series needs y values".to_string()));
    }
    if x.is_empty() {
        x = (1..=y.len()).map(|i| i as f64).collect();
    }
    if x.len() != y.len() {
        return Err(PlotError::LengthMismatch(format!(
            "x has {} values, y has {}",
            x.len(),
            y.len()
        )));
    }
    if !z.is_empty() && z.len() != y.len() {
        return Err(PlotError::LengthMismatch(format!(
            "z has {} values, y has {}",
            z.len(),
            y.len()
        )));
    }

    let mut stroke = stroke;
    let single_point = y.len() == 1;
    let marker = if single_point || options.scatter {
        stroke.line_style = LineStyle::None;
        options
            .marker
            .filter(|m| *m != Marker::None)
            .unwrap_or_else(|| Marker::rotation(defaults.color_position))
    } else {
        options.marker.unwrap_or(Marker::None)
    };

    Ok(ResolvedSeries::Series(Series {
        x,
        y,
        z,
        stroke,
        marker,
        marker_size: options.marker_size.unwrap_or(DEFAULT_MARKER_SIZE),
        label: options.label,
    }))
}

fn resolve_stroke(options: &SeriesOptions, defaults: &CycleDefaults<'_>) -> Stroke {
    let (color, explicit_color, palette_index) = match &options.color {
        Some(spec) => match spec.resolve(defaults.palette) {
            Ok(color) => {
                let index = match spec {
                    ColorSpec::Index(i) => Some(*i),
                    _ => None,
                };
                (color, true, index)
            }
            Err(err) => {
                warn!("{err}; using the default cycle color instead");
                (defaults.color(), false, None)
            }
        },
        None => (defaults.color(), false, None),
    };
    Stroke {
        color,
        explicit_color,
        palette_index,
        line_style: options.line_style.unwrap_or(defaults.line_style),
        line_width: options.line_width.unwrap_or(defaults.line_width),
        explicit_width: options.line_width.is_some(),
    }
}

/// A span line is requested when exactly one coordinate holds a single value
/// and the other two are empty.
fn span_of(options: &SeriesOptions) -> Option<(SpanAxis, f64)> {
    match (options.x.as_slice(), options.y.as_slice(), options.z.as_slice()) {
        ([x], [], []) => Some((SpanAxis::X, *x)),
        ([], [y], []) => Some((SpanAxis::Y, *y)),
        ([], [], [z]) => Some((SpanAxis::Z, *z)),
        _ => None,
    }
}

/// Explicit limit pair if either bound is non-zero. Reversed bounds are reordered.
pub fn explicit_limit(bounds: [f64; 2]) -> Option<(f64, f64)> {
    let [lo, hi] = bounds;
    if lo == 0.0 && hi == 0.0 {
        return None;
    }
    if !lo.is_finite() || !hi.is_finite() || lo == hi {
        warn!("Ignoring degenerate axis limits [{lo}, {hi}]");
        return None;
    }
    Some((lo.min(hi), lo.max(hi)))
}
