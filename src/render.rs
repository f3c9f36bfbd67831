// src/render.rs

use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::chart::{ChartBuilder, ChartContext, SeriesLabelPosition};
use plotters::coord::cartesian::{Cartesian2d, Cartesian3d};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::{CoordTranslate, Shift};
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, Cross, EmptyElement, PathElement, Polygon, Rectangle, TriangleMarker};
use plotters::style::{Color, IntoFont, RGBColor, ShapeStyle};

use std::error::Error;
use std::path::Path;

use tracing::{debug, warn};

use crate::axes::{Axes, Limits};
use crate::color::Rgb;
use crate::constants::{
    CHART_MARGIN_PX, DASH_GAP_FRACTION, DASH_LENGTH_FRACTION, DOT_LENGTH_FRACTION, LABEL_AREA_PX,
    LEGEND_SWATCH_PX,
};
use crate::contour::{iso_segments, Contour, ContourColoring, ContourKind};
use crate::font_config::FontSet;
use crate::plot_object::{Extents, PlotKind, PlotObject};
use crate::registry::HandleRegistry;
use crate::error::{PlotError, Result};
use crate::series::{LineStyle, Marker, Series, SpanAxis, SpanLine};

// Slack for float error when walking a dash pattern in normalized units.
const DASH_EPSILON: f64 = 1e-12;

type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;
type Chart3d<'a, DB> =
    ChartContext<'a, DB, Cartesian3d<RangedCoordf64, RangedCoordf64, RangedCoordf64>>;

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }
}

/// Everything the renderer needs from a figure.
pub(crate) struct Scene<'a> {
    pub background: Rgb,
    pub axes: &'a [Axes],
    pub handles: &'a HandleRegistry<PlotObject>,
    pub fonts: FontSet,
    /// Pixels per point; recipe sizes are points at 100 DPI.
    pub px_scale: f64,
}

impl Scene<'_> {
    fn px(&self, points: f64) -> u32 {
        ((points * self.px_scale).round() as u32).max(1)
    }
}

/// Renders the scene to `path` and flushes the backend.
pub(crate) fn render_to_file(
    scene: &Scene<'_>,
    path: &Path,
    format: ExportFormat,
    size: (u32, u32),
) -> Result<()> {
    match format {
        ExportFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_scene(&root, scene).map_err(PlotError::render)?;
            root.present().map_err(PlotError::render)?;
        }
        ExportFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_scene(&root, scene).map_err(PlotError::render)?;
            root.present().map_err(PlotError::render)?;
        }
    }
    Ok(())
}

fn draw_scene<DB>(root: &DrawingArea<DB, Shift>, scene: &Scene<'_>) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&scene.background.to_rgb_color())?;
    let (width, height) = root.dim_in_pixel();

    for (axes_index, axes) in scene.axes.iter().enumerate() {
        let (x, y, w, h) = axes.tile.pixel_rect(width, height);
        if w == 0 || h == 0 {
            warn!("Axes {} has no room in a {width}x{height} surface, skipping", axes_index + 1);
            continue;
        }
        let area = root.clone().shrink((x, y), (w, h));
        let objects: Vec<&PlotObject> = scene
            .handles
            .iter()
            .filter(|(_, _, obj)| obj.axes == axes_index)
            .map(|(_, _, obj)| obj)
            .collect();
        debug!("Drawing axes {} with {} objects", axes_index + 1, objects.len());
        draw_axes(&area, axes, &objects, scene)?;
    }
    Ok(())
}

fn draw_axes<DB>(
    area: &DrawingArea<DB, Shift>,
    axes: &Axes,
    objects: &[&PlotObject],
    scene: &Scene<'_>,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&axes.background.to_rgb_color())?;
    let extents = objects
        .iter()
        .fold(Extents::default(), |acc, obj| acc.union(obj.extents()));
    let limits = axes.resolve_limits(extents);
    if axes.is_3d {
        draw_axes_3d(area, axes, objects, &limits, scene)
    } else {
        draw_axes_2d(area, axes, objects, &limits, scene)
    }
}

fn draw_axes_2d<DB>(
    area: &DrawingArea<DB, Shift>,
    axes: &Axes,
    objects: &[&PlotObject],
    limits: &Limits,
    scene: &Scene<'_>,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let fg = axes.foreground.to_rgb_color();
    let fonts = &scene.fonts;

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(CHART_MARGIN_PX)
        .x_label_area_size(LABEL_AREA_PX)
        .y_label_area_size(LABEL_AREA_PX);
    if let Some(title) = &axes.title {
        builder.caption(title, fonts.title.as_tuple().into_font().color(&fg));
    }
    let mut chart =
        builder.build_cartesian_2d(limits.x.0..limits.x.1, limits.y.0..limits.y.1)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.axis_style(fg.stroke_width(1))
            .label_style(fonts.axes.as_tuple().into_font().color(&fg))
            .axis_desc_style(fonts.label.as_tuple().into_font().color(&fg));
        if axes.grid_on {
            mesh.light_line_style(fg.mix(0.08)).bold_line_style(fg.mix(0.2));
        } else {
            mesh.disable_mesh();
        }
        if let Some(label) = &axes.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &axes.y_label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw()?;
    }

    if axes.box_on {
        // Mesh only draws the left and bottom axis lines.
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (limits.x.0, limits.y.1),
                (limits.x.1, limits.y.1),
                (limits.x.1, limits.y.0),
            ],
            fg.stroke_width(1),
        )))?;
    }

    let bounds = [limits.x, limits.y];
    let mut legend_entries = 0;
    for obj in objects {
        let labelled = axes.legend && obj.label().is_some();
        match &obj.kind {
            PlotKind::Series(series) => {
                if series.is_3d() {
                    debug!("Dropping z values of a series drawn on 2D axes");
                }
                let points: Vec<[f64; 2]> =
                    series.x.iter().zip(&series.y).map(|(&x, &y)| [x, y]).collect();
                draw_series_points(&mut chart, series, &points, bounds, labelled, scene, |[x, y]| (x, y))?;
            }
            PlotKind::Span(span) => {
                let ends = match span.axis {
                    SpanAxis::X => [[span.value, limits.y.0], [span.value, limits.y.1]],
                    SpanAxis::Y => [[limits.x.0, span.value], [limits.x.1, span.value]],
                    SpanAxis::Z => {
                        warn!("Span line at z = {} needs 3D axes, skipping", span.value);
                        continue;
                    }
                };
                draw_span(&mut chart, span, &ends, bounds, labelled, scene, |[x, y]| (x, y))?;
            }
            PlotKind::Contour(contour) => {
                draw_contour_2d(&mut chart, contour, bounds, labelled, scene)?;
            }
        }
        if labelled {
            legend_entries += 1;
        }
    }

    if legend_entries > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(axes.background.to_rgb_color().mix(0.8))
            .border_style(fg)
            .label_font(fonts.legend.as_tuple().into_font().color(&fg))
            .draw()?;
    }
    Ok(())
}

fn draw_axes_3d<DB>(
    area: &DrawingArea<DB, Shift>,
    axes: &Axes,
    objects: &[&PlotObject],
    limits: &Limits,
    scene: &Scene<'_>,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let fg = axes.foreground.to_rgb_color();
    let fonts = &scene.fonts;

    let mut builder = ChartBuilder::on(area);
    builder.margin(CHART_MARGIN_PX);
    if let Some(title) = &axes.title {
        builder.caption(title, fonts.title.as_tuple().into_font().color(&fg));
    }
    // Plotters' vertical axis is the second coordinate, so data z goes there.
    let mut chart = builder.build_cartesian_3d(
        limits.x.0..limits.x.1,
        limits.z.0..limits.z.1,
        limits.y.0..limits.y.1,
    )?;
    let (yaw, pitch) = axes.view;
    chart.with_projection(|mut pb| {
        pb.yaw = yaw;
        pb.pitch = pitch;
        pb.scale = 0.8;
        pb.into_matrix()
    });

    let grid_alpha = if axes.grid_on { 0.15 } else { 0.0 };
    chart
        .configure_axes()
        .light_grid_style(fg.mix(grid_alpha))
        .max_light_lines(3)
        .label_style(fonts.axes.as_tuple().into_font().color(&fg))
        .draw()?;

    let bounds = [limits.x, limits.y, limits.z];
    let floor = limits.z.0;
    let mut legend_entries = 0;
    for obj in objects {
        let labelled = axes.legend && obj.label().is_some();
        match &obj.kind {
            PlotKind::Series(series) => {
                let points: Vec<[f64; 3]> = series
                    .x
                    .iter()
                    .zip(&series.y)
                    .enumerate()
                    .map(|(i, (&x, &y))| [x, y, series.z.get(i).copied().unwrap_or(floor)])
                    .collect();
                draw_series_points(&mut chart, series, &points, bounds, labelled, scene, to_3d)?;
            }
            PlotKind::Span(span) => {
                let ends = match span.axis {
                    SpanAxis::X => [[span.value, limits.y.0, floor], [span.value, limits.y.1, floor]],
                    SpanAxis::Y => [[limits.x.0, span.value, floor], [limits.x.1, span.value, floor]],
                    SpanAxis::Z => {
                        draw_level_frame(&mut chart, span, limits, labelled, scene)?;
                        if labelled {
                            legend_entries += 1;
                        }
                        continue;
                    }
                };
                draw_span(&mut chart, span, &ends, bounds, labelled, scene, to_3d)?;
            }
            PlotKind::Contour(contour) => {
                draw_contour_3d(&mut chart, contour, floor, labelled, scene)?;
            }
        }
        if labelled {
            legend_entries += 1;
        }
    }

    if legend_entries > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(axes.background.to_rgb_color().mix(0.8))
            .border_style(fg)
            .label_font(fonts.legend.as_tuple().into_font().color(&fg))
            .draw()?;
    }
    Ok(())
}

/// Data `(x, y, z)` to plotters' `(x, vertical, depth)` coordinates.
fn to_3d([x, y, z]: [f64; 3]) -> (f64, f64, f64) {
    (x, z, y)
}

/// On/off pattern as fractions of the normalized axes box.
fn dash_pattern(style: LineStyle) -> Option<&'static [f64]> {
    const DASHED: [f64; 2] = [DASH_LENGTH_FRACTION, DASH_GAP_FRACTION];
    const DOTTED: [f64; 2] = [DOT_LENGTH_FRACTION, DASH_GAP_FRACTION];
    const DASH_DOT: [f64; 4] = [
        DASH_LENGTH_FRACTION,
        DASH_GAP_FRACTION,
        DOT_LENGTH_FRACTION,
        DASH_GAP_FRACTION,
    ];
    match style {
        LineStyle::Dashed => Some(&DASHED),
        LineStyle::Dotted => Some(&DOTTED),
        LineStyle::DashDot => Some(&DASH_DOT),
        LineStyle::Solid | LineStyle::None => None,
    }
}

/// Splits a polyline into the "on" pieces of a dash pattern.
///
/// Distances are measured after dividing each coordinate by its axis span, so a
/// dash has the same visual length on every axis. Non-finite points break the line.
pub(crate) fn split_dashes<const N: usize>(
    points: &[[f64; N]],
    spans: [f64; N],
    pattern: &[f64],
) -> Vec<Vec<[f64; N]>> {
    let mut pieces = Vec::new();
    if pattern.is_empty() || pattern.iter().any(|p| *p <= 0.0) {
        return pieces;
    }
    let norm = |a: &[f64; N], b: &[f64; N]| -> f64 {
        (0..N)
            .map(|k| {
                let span = if spans[k].abs() > 1e-12 { spans[k].abs() } else { 1.0 };
                ((b[k] - a[k]) / span).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    };

    let mut phase = 0usize;
    let mut remaining = pattern[0];
    let mut current: Vec<[f64; N]> = Vec::new();

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            if current.len() > 1 {
                pieces.push(std::mem::take(&mut current));
            }
            current.clear();
            continue;
        }
        let length = norm(&a, &b);
        let mut travelled = 0.0;
        let lerp = |t: f64| -> [f64; N] {
            let mut p = a;
            for k in 0..N {
                p[k] = a[k] + (b[k] - a[k]) * t;
            }
            p
        };
        if phase % 2 == 0 && current.is_empty() {
            current.push(a);
        }
        while length > 0.0 && length - travelled > remaining + DASH_EPSILON {
            travelled += remaining;
            let cut = lerp(travelled / length);
            if phase % 2 == 0 {
                current.push(cut);
                pieces.push(std::mem::take(&mut current));
            } else {
                current.push(cut);
            }
            phase = (phase + 1) % pattern.len();
            remaining = pattern[phase];
        }
        remaining = (remaining - (length - travelled)).max(0.0);
        if phase % 2 == 0 {
            current.push(b);
        } else {
            current.clear();
        }
    }
    if current.len() > 1 {
        pieces.push(current);
    }
    pieces.retain(|piece| {
        piece.windows(2).map(|w| norm(&w[0], &w[1])).sum::<f64>() > DASH_EPSILON
    });
    pieces
}

/// Clips a segment to the axis-aligned box `bounds` (Liang-Barsky).
///
/// Returns `None` when the segment misses the box or has a non-finite coordinate.
/// Endpoints inside the box come back unchanged.
pub(crate) fn clip_segment<const N: usize>(
    a: [f64; N],
    b: [f64; N],
    bounds: [(f64, f64); N],
) -> Option<([f64; N], [f64; N])> {
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for k in 0..N {
        let (lo, hi) = bounds[k];
        let d = b[k] - a[k];
        if d == 0.0 {
            if a[k] < lo || a[k] > hi {
                return None;
            }
            continue;
        }
        let (ta, tb) = ((lo - a[k]) / d, (hi - a[k]) / d);
        let (enter, leave) = if d > 0.0 { (ta, tb) } else { (tb, ta) };
        t0 = t0.max(enter);
        t1 = t1.min(leave);
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| -> [f64; N] {
        let mut p = a;
        for k in 0..N {
            p[k] = a[k] + (b[k] - a[k]) * t;
        }
        p
    };
    let start = if t0 > 0.0 { at(t0) } else { a };
    let end = if t1 < 1.0 { at(t1) } else { b };
    Some((start, end))
}

/// Visible runs of a polyline inside `bounds`. Leaving the box or a non-finite
/// point ends a run.
pub(crate) fn clip_polyline<const N: usize>(
    points: &[[f64; N]],
    bounds: [(f64, f64); N],
) -> Vec<Vec<[f64; N]>> {
    let mut runs = Vec::new();
    let mut current: Vec<[f64; N]> = Vec::new();
    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], bounds) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(start);
                }
                current.push(end);
            }
            None => {
                if current.len() > 1 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        runs.push(current);
    }
    runs
}

fn spans_of<const N: usize>(bounds: [(f64, f64); N]) -> [f64; N] {
    bounds.map(|(lo, hi)| hi - lo)
}

/// Solid or dashed pieces of a polyline, converted to chart coordinates.
///
/// The line is clipped to `bounds` first, so dashes are only generated for the
/// visible part however far the data reaches past the limits.
fn stroke_pieces<const N: usize, C>(
    points: &[[f64; N]],
    bounds: [(f64, f64); N],
    style: LineStyle,
    convert: impl Fn([f64; N]) -> C,
) -> Vec<Vec<C>> {
    let runs = clip_polyline(points, bounds);
    let pieces = match dash_pattern(style) {
        Some(pattern) => {
            let spans = spans_of(bounds);
            runs.iter()
                .flat_map(|run| split_dashes(run, spans, pattern))
                .collect()
        }
        None => runs,
    };
    pieces
        .into_iter()
        .map(|piece| piece.into_iter().map(&convert).collect())
        .collect()
}

fn line_legend(color: RGBColor, width: u32) -> impl Fn((i32, i32)) -> PathElement<(i32, i32)> {
    move |(x, y)| PathElement::new(vec![(x, y), (x + LEGEND_SWATCH_PX, y)], color.stroke_width(width))
}

fn draw_pieces<DB, CT>(
    chart: &mut ChartContext<'_, DB, CT>,
    pieces: Vec<Vec<CT::From>>,
    style: ShapeStyle,
    legend: Option<(&str, RGBColor, u32)>,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    CT: CoordTranslate,
    CT::From: Clone + 'static,
{
    let anno = chart.draw_series(pieces.into_iter().map(|piece| PathElement::new(piece, style)))?;
    if let Some((label, color, width)) = legend {
        anno.label(label).legend(line_legend(color, width));
    }
    Ok(())
}

fn draw_markers<DB, CT>(
    chart: &mut ChartContext<'_, DB, CT>,
    points: &[CT::From],
    marker: Marker,
    size: i32,
    color: RGBColor,
    label: Option<&str>,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    CT: CoordTranslate,
    CT::From: Clone + 'static,
{
    let fill = color.filled();
    let thin = color.stroke_width(2);
    let anno = match marker {
        Marker::None => return Ok(()),
        Marker::Circle => chart.draw_series(points.iter().map(|p| Circle::new(p.clone(), size, fill)))?,
        Marker::Point => {
            chart.draw_series(points.iter().map(|p| Circle::new(p.clone(), (size / 2).max(1), fill)))?
        }
        Marker::Square => chart.draw_series(points.iter().map(|p| {
            EmptyElement::at(p.clone()) + Rectangle::new([(-size, -size), (size, size)], fill)
        }))?,
        Marker::Diamond => chart.draw_series(points.iter().map(|p| {
            EmptyElement::at(p.clone())
                + Polygon::new(vec![(0, -size), (size, 0), (0, size), (-size, 0)], fill)
        }))?,
        Marker::Triangle => {
            chart.draw_series(points.iter().map(|p| TriangleMarker::new(p.clone(), size, fill)))?
        }
        Marker::Cross => chart.draw_series(points.iter().map(|p| Cross::new(p.clone(), size, thin)))?,
        Marker::Plus => {
            chart.draw_series(points.iter().map(|p| {
                EmptyElement::at(p.clone()) + PathElement::new(vec![(0, -size), (0, size)], thin)
            }))?;
            chart.draw_series(points.iter().map(|p| {
                EmptyElement::at(p.clone()) + PathElement::new(vec![(-size, 0), (size, 0)], thin)
            }))?
        }
    };
    if let Some(label) = label {
        anno.label(label)
            .legend(move |(x, y)| Circle::new((x + LEGEND_SWATCH_PX / 2, y), size, fill));
    }
    Ok(())
}

fn draw_series_points<DB, CT, const N: usize>(
    chart: &mut ChartContext<'_, DB, CT>,
    series: &Series,
    points: &[[f64; N]],
    bounds: [(f64, f64); N],
    labelled: bool,
    scene: &Scene<'_>,
    convert: impl Fn([f64; N]) -> CT::From + Copy,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    CT: CoordTranslate,
    CT::From: Clone + 'static,
{
    let color = series.stroke.color.to_rgb_color();
    let width = scene.px(series.stroke.line_width);
    let label = if labelled { series.label.as_deref() } else { None };

    let has_line = series.stroke.line_style != LineStyle::None;
    if has_line {
        let pieces = stroke_pieces(points, bounds, series.stroke.line_style, convert);
        draw_pieces(chart, pieces, color.stroke_width(width), label.map(|l| (l, color, width)))?;
    }
    if series.marker != Marker::None {
        let coords: Vec<CT::From> = points
            .iter()
            .filter(|p| p.iter().all(|v| v.is_finite()))
            .map(|p| convert(*p))
            .collect();
        let size = scene.px(series.marker_size) as i32;
        draw_markers(chart, &coords, series.marker, size, color, if has_line { None } else { label })?;
    }
    Ok(())
}

fn draw_span<DB, CT, const N: usize>(
    chart: &mut ChartContext<'_, DB, CT>,
    span: &SpanLine,
    ends: &[[f64; N]; 2],
    bounds: [(f64, f64); N],
    labelled: bool,
    scene: &Scene<'_>,
    convert: impl Fn([f64; N]) -> CT::From,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    CT: CoordTranslate,
    CT::From: Clone + 'static,
{
    let color = span.stroke.color.to_rgb_color();
    let width = scene.px(span.stroke.line_width);
    // A span with no line style would be invisible.
    let style = match span.stroke.line_style {
        LineStyle::None => LineStyle::Solid,
        other => other,
    };
    let pieces = stroke_pieces(ends, bounds, style, convert);
    let label = if labelled { span.label.as_deref() } else { None };
    draw_pieces(chart, pieces, color.stroke_width(width), label.map(|l| (l, color, width)))
}

/// Outline of the horizontal plane at a z span's level.
fn draw_level_frame<DB>(
    chart: &mut Chart3d<'_, DB>,
    span: &SpanLine,
    limits: &Limits,
    labelled: bool,
    scene: &Scene<'_>,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let color = span.stroke.color.to_rgb_color();
    let width = scene.px(span.stroke.line_width);
    let z = span.value;
    let (x0, x1) = limits.x;
    let (y0, y1) = limits.y;
    let frame = vec![
        to_3d([x0, y0, z]),
        to_3d([x1, y0, z]),
        to_3d([x1, y1, z]),
        to_3d([x0, y1, z]),
        to_3d([x0, y0, z]),
    ];
    let label = if labelled { span.label.as_deref() } else { None };
    draw_pieces(chart, vec![frame], color.stroke_width(width), label.map(|l| (l, color, width)))
}

/// Band index of `value`: number of levels at or below it, scaled to `0.0..=1.0`.
fn band_fraction(value: f64, levels: &[f64]) -> f64 {
    if levels.is_empty() {
        return 0.5;
    }
    let band = levels.iter().filter(|level| **level <= value).count();
    band as f64 / levels.len() as f64
}

/// Corner values and coordinates of each finite grid cell.
fn cells(contour: &Contour) -> Vec<([f64; 4], f64, f64, f64, f64)> {
    let (rows, cols) = contour.grid.dim();
    let mut out = Vec::new();
    if rows < 2 || cols < 2 {
        return out;
    }
    for j in 0..rows - 1 {
        for i in 0..cols - 1 {
            let v = [
                contour.grid[[j, i]],
                contour.grid[[j, i + 1]],
                contour.grid[[j + 1, i + 1]],
                contour.grid[[j + 1, i]],
            ];
            if v.iter().all(|x| x.is_finite()) {
                out.push((v, contour.x[i], contour.x[i + 1], contour.y[j], contour.y[j + 1]));
            }
        }
    }
    out
}

fn band_color(contour: &Contour, mean: f64) -> RGBColor {
    match contour.coloring {
        ContourColoring::Colormap(map) => map.eval(band_fraction(mean, &contour.levels)),
        ContourColoring::Fixed(_) => contour.color_of(mean),
    }
}

fn draw_contour_2d<DB>(
    chart: &mut Chart2d<'_, DB>,
    contour: &Contour,
    bounds: [(f64, f64); 2],
    labelled: bool,
    scene: &Scene<'_>,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let label = if labelled { contour.label.as_deref() } else { None };
    let width = scene.px(contour.line_width);
    match contour.kind {
        ContourKind::Filled | ContourKind::Surface => {
            // Same cell shading as a heatmap; each cell takes the band of its mean value.
            let anno = chart.draw_series(cells(contour).into_iter().map(|(v, x0, x1, y0, y1)| {
                let mean = v.iter().sum::<f64>() / 4.0;
                Rectangle::new([(x0, y0), (x1, y1)], band_color(contour, mean).filled())
            }))?;
            if let Some(label) = label {
                let swatch = contour.color_of(mid_value(contour));
                anno.label(label).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + LEGEND_SWATCH_PX, y + 5)], swatch.filled())
                });
            }
        }
        ContourKind::Contour2d | ContourKind::Contour3d | ContourKind::Constraint => {
            let mut label = label;
            for &level in &contour.levels {
                let color = contour.color_of(level);
                let segments = iso_segments(&contour.x, &contour.y, &contour.grid, level);
                let points: Vec<Vec<[f64; 2]>> = segments
                    .into_iter()
                    .map(|((ax, ay), (bx, by))| vec![[ax, ay], [bx, by]])
                    .collect();
                let pieces = dashed_segments(&points, bounds, contour.line_style);
                let pieces = pieces
                    .into_iter()
                    .map(|piece| piece.into_iter().map(|[x, y]| (x, y)).collect())
                    .collect();
                draw_pieces(&mut *chart, pieces, color.stroke_width(width), label.take().map(|l| (l, color, width)))?;
            }
        }
    }
    Ok(())
}

fn draw_contour_3d<DB>(
    chart: &mut Chart3d<'_, DB>,
    contour: &Contour,
    floor: f64,
    labelled: bool,
    scene: &Scene<'_>,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let label = if labelled { contour.label.as_deref() } else { None };
    let width = scene.px(contour.line_width);
    match contour.kind {
        ContourKind::Surface | ContourKind::Filled => {
            let lifted = contour.kind == ContourKind::Surface;
            let anno = chart.draw_series(cells(contour).into_iter().map(|(v, x0, x1, y0, y1)| {
                let mean = v.iter().sum::<f64>() / 4.0;
                let z = |k: usize| if lifted { v[k] } else { floor };
                Polygon::new(
                    vec![
                        to_3d([x0, y0, z(0)]),
                        to_3d([x1, y0, z(1)]),
                        to_3d([x1, y1, z(2)]),
                        to_3d([x0, y1, z(3)]),
                    ],
                    contour.color_of(mean).mix(0.9).filled(),
                )
            }))?;
            if let Some(label) = label {
                let swatch = contour.color_of(mid_value(contour));
                anno.label(label).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + LEGEND_SWATCH_PX, y + 5)], swatch.filled())
                });
            }
        }
        ContourKind::Contour3d | ContourKind::Contour2d | ContourKind::Constraint => {
            let mut label = label;
            let lifted = contour.kind == ContourKind::Contour3d;
            for &level in &contour.levels {
                let color = contour.color_of(level);
                let z = if lifted { level } else { floor };
                let pieces = iso_segments(&contour.x, &contour.y, &contour.grid, level)
                    .into_iter()
                    .map(|((ax, ay), (bx, by))| vec![to_3d([ax, ay, z]), to_3d([bx, by, z])])
                    .collect();
                draw_pieces(&mut *chart, pieces, color.stroke_width(width), label.take().map(|l| (l, color, width)))?;
            }
        }
    }
    Ok(())
}

fn mid_value(contour: &Contour) -> f64 {
    contour
        .value_range()
        .map(|(lo, hi)| (lo + hi) / 2.0)
        .unwrap_or(0.0)
}

/// Clips iso-line segments to `bounds` and dashes each one on its own.
fn dashed_segments(
    segments: &[Vec<[f64; 2]>],
    bounds: [(f64, f64); 2],
    style: LineStyle,
) -> Vec<Vec<[f64; 2]>> {
    let visible: Vec<Vec<[f64; 2]>> = segments
        .iter()
        .flat_map(|seg| clip_polyline(seg, bounds))
        .collect();
    match dash_pattern(style) {
        None => visible,
        Some(pattern) => {
            // Iso-line segments come out of marching squares unordered, so dash each
            // segment with the pattern period scaled down to keep gaps visible.
            let scaled: Vec<f64> = pattern.iter().map(|p| p / 4.0).collect();
            let spans = spans_of(bounds);
            visible
                .iter()
                .flat_map(|seg| split_dashes(seg, spans, &scaled))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_extensions() {
        assert_eq!(ExportFormat::from_extension("PNG"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_extension("svg"), Some(ExportFormat::Svg));
        assert_eq!(ExportFormat::from_extension("eps"), None);
        assert_eq!(ExportFormat::Svg.extension(), "svg");
    }

    #[test]
    fn test_split_dashes_alternates() {
        // One unit along x with span 1: pattern 0.25 on / 0.25 off gives two dashes.
        let pieces = split_dashes(&[[0.0, 0.0], [1.0, 0.0]], [1.0, 1.0], &[0.25, 0.25]);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0], vec![[0.0, 0.0], [0.25, 0.0]]);
        assert_eq!(pieces[1], vec![[0.5, 0.0], [0.75, 0.0]]);
    }

    #[test]
    fn test_split_dashes_carries_phase_across_vertices() {
        let pieces = split_dashes(
            &[[0.0, 0.0], [0.1, 0.0], [0.4, 0.0]],
            [1.0, 1.0],
            &[0.2, 0.2],
        );
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 3);
        let end = pieces[0][2];
        assert!((end[0] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_split_dashes_normalizes_by_span() {
        // Span 10 on x: a 5-unit line is half the box, so 0.25 dashes give one full dash and a gap.
        let pieces = split_dashes(&[[0.0, 0.0], [5.0, 0.0]], [10.0, 1.0], &[0.25, 0.25]);
        assert_eq!(pieces.len(), 1);
        assert!((pieces[0][1][0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_solid_pieces_break_at_nan() {
        let pts = [[0.0, 0.0], [1.0, 1.0], [f64::NAN, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let pieces = stroke_pieces(&pts, [(0.0, 4.0), (0.0, 4.0)], LineStyle::Solid, |[x, y]| (x, y));
        assert_eq!(pieces, vec![vec![(0.0, 0.0), (1.0, 1.0)], vec![(3.0, 3.0), (4.0, 4.0)]]);
    }

    #[test]
    fn test_split_dashes_no_sliver_at_vertex() {
        // 0.4 - 0.1 - 0.1 lands a hair above 0.2 in floating point.
        let pieces = split_dashes(&[[0.0, 0.0], [0.1, 0.0], [0.4, 0.0], [0.7, 0.0]], [1.0, 1.0], &[0.2, 0.2]);
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            let len = (piece[piece.len() - 1][0] - piece[0][0]).abs();
            assert!(len > 1e-9, "degenerate dash {piece:?}");
        }
    }

    #[test]
    fn test_clip_segment() {
        let bounds = [(0.0, 1.0), (0.0, 1.0)];
        assert_eq!(clip_segment([0.2, 0.2], [0.8, 0.8], bounds), Some(([0.2, 0.2], [0.8, 0.8])));
        assert_eq!(clip_segment([-1.0, 0.5], [2.0, 0.5], bounds), Some(([0.0, 0.5], [1.0, 0.5])));
        assert_eq!(clip_segment([2.0, 2.0], [3.0, 3.0], bounds), None);
        assert_eq!(clip_segment([0.5, f64::NAN], [0.5, 0.5], bounds), None);
    }

    #[test]
    fn test_dashing_far_past_limits_stays_bounded() {
        // Data reaching 1e7 with limits [0, 1] would need ~1e8 dashes unclipped.
        let pts = [[0.0, 0.0], [1.0e7, 1.0]];
        let pieces = stroke_pieces(&pts, [(0.0, 1.0), (0.0, 1.0)], LineStyle::Dashed, |[x, y]| (x, y));
        assert!(!pieces.is_empty());
        assert!(pieces.len() < 100, "{} dashes", pieces.len());
        for (x, y) in pieces.iter().flatten() {
            assert!(*x >= 0.0 && *x <= 1.0 + 1e-9, "x = {x}");
            assert!(*y >= 0.0 && *y <= 1.0 + 1e-9, "y = {y}");
        }
    }

    #[test]
    fn test_clip_polyline_splits_on_exit() {
        let pts = [[0.5, 0.0], [0.5, 2.0], [0.6, 2.0], [0.6, 0.0]];
        let runs = clip_polyline(&pts, [(0.0, 1.0), (0.0, 1.0)]);
        assert_eq!(runs, vec![vec![[0.5, 0.0], [0.5, 1.0]], vec![[0.6, 1.0], [0.6, 0.0]]]);
    }

    #[test]
    fn test_band_fraction() {
        let levels = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(band_fraction(0.0, &levels), 0.0);
        assert_eq!(band_fraction(2.5, &levels), 0.5);
        assert_eq!(band_fraction(9.0, &levels), 1.0);
    }
}
