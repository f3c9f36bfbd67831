// src/contour.rs

use std::fmt;

use ndarray::Array2;
use plotters::style::RGBColor;

use crate::color::Rgb;
use crate::constants::{CONSTRAINT_COLOR, CONSTRAINT_LEVELS, DEFAULT_CONTOUR_LEVELS};
use crate::error::{PlotError, Result};
use crate::series::LineStyle;

/// Rendering modes of a gridded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    /// Filled bands between levels.
    Filled,
    /// Iso-lines in the plane.
    Contour2d,
    /// Iso-lines lifted to their level height.
    Contour3d,
    /// Shaded surface.
    Surface,
    /// Zero-level iso-line marking a constraint boundary.
    Constraint,
}

impl ContourKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "filled" | "contourf" => Some(ContourKind::Filled),
            "2d" | "contour" => Some(ContourKind::Contour2d),
            "3d" | "contour3" => Some(ContourKind::Contour3d),
            "surface" | "surf" => Some(ContourKind::Surface),
            "constraint" => Some(ContourKind::Constraint),
            _ => None,
        }
    }

    pub fn is_3d(self) -> bool {
        matches!(self, ContourKind::Contour3d | ContourKind::Surface)
    }

    pub fn line_style(self) -> LineStyle {
        match self {
            ContourKind::Filled | ContourKind::Surface => LineStyle::None,
            ContourKind::Contour2d | ContourKind::Contour3d => LineStyle::Solid,
            ContourKind::Constraint => LineStyle::Dashed,
        }
    }
}

/// Continuous colormaps backed by `colorous` gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Turbo,
}

impl Colormap {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "plasma" => Colormap::Plasma,
            "inferno" => Colormap::Inferno,
            "magma" => Colormap::Magma,
            "cividis" => Colormap::Cividis,
            "turbo" | "jet" => Colormap::Turbo,
            _ => Colormap::Viridis,
        }
    }

    fn gradient(self) -> colorous::Gradient {
        match self {
            Colormap::Viridis => colorous::VIRIDIS,
            Colormap::Plasma => colorous::PLASMA,
            Colormap::Inferno => colorous::INFERNO,
            Colormap::Magma => colorous::MAGMA,
            Colormap::Cividis => colorous::CIVIDIS,
            Colormap::Turbo => colorous::TURBO,
        }
    }

    /// Color at `t` in `0.0..=1.0`; out-of-range and non-finite values are clamped.
    pub fn eval(self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let c = self.gradient().eval_continuous(t);
        RGBColor(c.r, c.g, c.b)
    }

    /// Color of `value` mapped linearly over `[min, max]`.
    pub fn map(self, value: f64, min: f64, max: f64) -> RGBColor {
        let span = (max - min).abs().max(1e-12);
        self.eval((value - min) / span)
    }
}

/// How iso-levels are chosen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LevelSpec {
    #[default]
    Auto,
    Count(usize),
    Values(Vec<f64>),
}

impl LevelSpec {
    pub fn resolve(&self, min: f64, max: f64) -> Result<Vec<f64>> {
        match self {
            LevelSpec::Auto => Ok(evenly_spaced_levels(DEFAULT_CONTOUR_LEVELS, min, max)),
            LevelSpec::Count(0) => Err(PlotError::InvalidLevels(
                "level count must be positive".to_string(),
            )),
            LevelSpec::Count(count) => Ok(evenly_spaced_levels(*count, min, max)),
            LevelSpec::Values(values) => {
                if values.is_empty() {
                    return Err(PlotError::InvalidLevels(
                        "level list must contain at least one value".to_string(),
                    ));
                }
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(PlotError::InvalidLevels("level values must be finite".to_string()));
                }
                if values.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(PlotError::InvalidLevels(
                        "level values must be strictly increasing".to_string(),
                    ));
                }
                Ok(values.clone())
            }
        }
    }
}

/// Levels strictly inside `(min, max)`, evenly spaced.
fn evenly_spaced_levels(count: usize, min: f64, max: f64) -> Vec<f64> {
    if !(max > min) {
        return vec![min];
    }
    let step = (max - min) / (count as f64 + 1.0);
    (1..=count).map(|i| min + step * i as f64).collect()
}

/// Where the grid values come from.
pub enum ContourSource {
    /// Rows follow `y`, columns follow `x`.
    Grid(Array2<f64>),
    /// Evaluated at every `(x[i], y[j])`.
    Function(Box<dyn Fn(f64, f64) -> f64>),
}

impl fmt::Debug for ContourSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContourSource::Grid(grid) => f.debug_tuple("Grid").field(&grid.dim()).finish(),
            ContourSource::Function(_) => f.write_str("Function(..)"),
        }
    }
}

#[derive(Debug)]
pub struct ContourOptions {
    pub kind: ContourKind,
    pub source: ContourSource,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub levels: LevelSpec,
    /// Ignored by `Constraint`, which always uses its own color.
    pub colormap: Colormap,
    pub name: String,
    pub label: Option<String>,
}

impl ContourOptions {
    pub fn from_grid(kind: ContourKind, x: Vec<f64>, y: Vec<f64>, grid: Array2<f64>) -> Self {
        Self {
            kind,
            source: ContourSource::Grid(grid),
            x,
            y,
            levels: LevelSpec::Auto,
            colormap: Colormap::default(),
            name: String::new(),
            label: None,
        }
    }

    pub fn from_fn<F>(kind: ContourKind, x: Vec<f64>, y: Vec<f64>, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + 'static,
    {
        Self {
            kind,
            source: ContourSource::Function(Box::new(f)),
            x,
            y,
            levels: LevelSpec::Auto,
            colormap: Colormap::default(),
            name: String::new(),
            label: None,
        }
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

    pub fn with_levels(mut self, levels: LevelSpec) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }
}

/// How a contour's lines or cells are colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContourColoring {
    Colormap(Colormap),
    Fixed(Rgb),
}

/// A registered contour or surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub kind: ContourKind,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub grid: Array2<f64>,
    pub levels: Vec<f64>,
    pub coloring: ContourColoring,
    pub line_style: LineStyle,
    pub line_width: f64,
    pub label: Option<String>,
}

impl Contour {
    /// Finite min/max of the grid, if any value is finite.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        finite_range(self.grid.iter().copied())
    }

    pub fn color_of(&self, value: f64) -> RGBColor {
        match self.coloring {
            ContourColoring::Fixed(rgb) => rgb.to_rgb_color(),
            ContourColoring::Colormap(map) => {
                let (min, max) = self.value_range().unwrap_or((0.0, 1.0));
                map.map(value, min, max)
            }
        }
    }
}

pub(crate) fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Evaluates `f` over the Cartesian product; `grid[[j, i]] = f(x[i], y[j])`.
pub fn evaluate_grid<F>(x: &[f64], y: &[f64], f: F) -> Result<Array2<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    let (Some(&x0), Some(&y0)) = (x.first(), y.first()) else {
        return Err(PlotError::InvalidFunction(
            "x and y coordinates must not be empty".to_string(),
        ));
    };
    let sample = f(x0, y0);
    if !sample.is_finite() {
        return Err(PlotError::InvalidFunction(format!(
            "f({x0}, {y0}) evaluated to {sample}"
        )));
    }
    Ok(Array2::from_shape_fn((y.len(), x.len()), |(j, i)| f(x[i], y[j])))
}

/// Builds the registered contour object from call options.
pub fn build_contour(options: ContourOptions, line_width: f64) -> Result<Contour> {
    let ContourOptions { kind, source, x, y, levels, colormap, label, .. } = options;
    let grid = match source {
        ContourSource::Function(f) => evaluate_grid(&x, &y, f)?,
        ContourSource::Grid(grid) => {
            if grid.dim() != (y.len(), x.len()) {
                return Err(PlotError::LengthMismatch(format!(
                    "grid is {:?} but y has {} and x has {} values",
                    grid.dim(),
                    y.len(),
                    x.len()
                )));
            }
            grid
        }
    };
    if grid.is_empty() {
        return Err(PlotError::EmptyData("contour grid is empty".to_string()));
    }

    let (levels, coloring) = if kind == ContourKind::Constraint {
        let [r, g, b] = [CONSTRAINT_COLOR.0, CONSTRAINT_COLOR.1, CONSTRAINT_COLOR.2]
            .map(|c| f64::from(c) / 255.0);
        (CONSTRAINT_LEVELS.to_vec(), ContourColoring::Fixed(Rgb::new(r, g, b)))
    } else {
        let (min, max) = finite_range(grid.iter().copied()).ok_or_else(|| {
            PlotError::EmptyData("contour grid has no finite values".to_string())
        })?;
        (levels.resolve(min, max)?, ContourColoring::Colormap(colormap))
    };

    Ok(Contour {
        kind,
        x,
        y,
        grid,
        levels,
        coloring,
        line_style: kind.line_style(),
        line_width,
        label,
    })
}

/// One straight piece of an iso-line.
pub type Segment = ((f64, f64), (f64, f64));

/// Marching squares over the grid. Ambiguous saddle cells are resolved by the cell mean.
pub fn iso_segments(x: &[f64], y: &[f64], grid: &Array2<f64>, level: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    let (rows, cols) = grid.dim();
    if rows < 2 || cols < 2 || x.len() != cols || y.len() != rows {
        return segments;
    }

    let lerp = |a: (f64, f64, f64), b: (f64, f64, f64)| -> (f64, f64) {
        let (ax, ay, av) = a;
        let (bx, by, bv) = b;
        let t = if (bv - av).abs() < f64::EPSILON { 0.5 } else { (level - av) / (bv - av) };
        (ax + t * (bx - ax), ay + t * (by - ay))
    };

    for j in 0..rows - 1 {
        for i in 0..cols - 1 {
            // Corners counter-clockwise from bottom-left.
            let c = [
                (x[i], y[j], grid[[j, i]]),
                (x[i + 1], y[j], grid[[j, i + 1]]),
                (x[i + 1], y[j + 1], grid[[j + 1, i + 1]]),
                (x[i], y[j + 1], grid[[j + 1, i]]),
            ];
            if c.iter().any(|p| !p.2.is_finite()) {
                continue;
            }
            let case = c
                .iter()
                .enumerate()
                .fold(0u8, |acc, (k, p)| if p.2 >= level { acc | (1 << k) } else { acc });

            let bottom = || lerp(c[0], c[1]);
            let right = || lerp(c[1], c[2]);
            let top = || lerp(c[3], c[2]);
            let left = || lerp(c[0], c[3]);

            match case {
                0 | 15 => {}
                1 | 14 => segments.push((left(), bottom())),
                2 | 13 => segments.push((bottom(), right())),
                3 | 12 => segments.push((left(), right())),
                4 | 11 => segments.push((right(), top())),
                6 | 9 => segments.push((bottom(), top())),
                7 | 8 => segments.push((left(), top())),
                5 | 10 => {
                    let mean = c.iter().map(|p| p.2).sum::<f64>() / 4.0;
                    let center_high = mean >= level;
                    // Case 5: bottom-left and top-right are high.
                    if (case == 5) == center_high {
                        segments.push((left(), top()));
                        segments.push((bottom(), right()));
                    } else {
                        segments.push((left(), bottom()));
                        segments.push((right(), top()));
                    }
                }
                _ => unreachable!("marching squares case is a 4-bit value"),
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_function_grid_layout() {
        let grid = evaluate_grid(&[0.0, 1.0], &[0.0, 1.0], |x, y| x + y).unwrap();
        assert_eq!(grid, array![[0.0, 1.0], [1.0, 2.0]]);

        // Rows follow y, columns follow x.
        let grid = evaluate_grid(&[0.0, 1.0, 2.0], &[10.0, 20.0], |x, y| x + y).unwrap();
        assert_eq!(grid, array![[10.0, 11.0, 12.0], [20.0, 21.0, 22.0]]);
    }

    #[test]
    fn test_invalid_function() {
        let err = evaluate_grid(&[0.0], &[0.0], |x, y| (x / y).ln()).unwrap_err();
        assert!(matches!(err, PlotError::InvalidFunction(_)));
        assert!(evaluate_grid(&[], &[1.0], |x, y| x * y).is_err());
    }

    #[test]
    fn test_grid_shape_checked() {
        let opts = ContourOptions::from_grid(
            ContourKind::Filled,
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0],
            Array2::zeros((3, 2)),
        );
        assert!(matches!(build_contour(opts, 1.0), Err(PlotError::LengthMismatch(_))));
    }

    #[test]
    fn test_constraint_uses_zero_level() {
        let opts = ContourOptions::from_fn(
            ContourKind::Constraint,
            vec![-1.0, 0.0, 1.0],
            vec![-1.0, 0.0, 1.0],
            |x, y| x * x + y * y - 0.5,
        )
        .with_levels(LevelSpec::Count(4));
        let c = build_contour(opts, 1.0).unwrap();
        assert_eq!(c.levels, vec![0.0]);
        assert_eq!(c.line_style, LineStyle::Dashed);
        assert_eq!(c.color_of(3.0), CONSTRAINT_COLOR);
    }

    #[test]
    fn test_level_specs() {
        assert_eq!(LevelSpec::Count(3).resolve(0.0, 4.0).unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(LevelSpec::Auto.resolve(0.0, 11.0).unwrap().len(), DEFAULT_CONTOUR_LEVELS);
        assert!(LevelSpec::Count(0).resolve(0.0, 1.0).is_err());
        assert!(LevelSpec::Values(vec![1.0, 1.0]).resolve(0.0, 1.0).is_err());
        assert!(LevelSpec::Values(vec![]).resolve(0.0, 1.0).is_err());
        assert_eq!(LevelSpec::Values(vec![0.5]).resolve(0.0, 1.0).unwrap(), vec![0.5]);
    }

    #[test]
    fn test_iso_segments_single_cell() {
        // Left column low, right column high: one vertical segment at x = 0.5.
        let grid = array![[0.0, 1.0], [0.0, 1.0]];
        let segs = iso_segments(&[0.0, 1.0], &[0.0, 1.0], &grid, 0.5);
        assert_eq!(segs.len(), 1);
        let ((x0, _), (x1, _)) = segs[0];
        assert!((x0 - 0.5).abs() < 1e-12 && (x1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_iso_segments_outside_range_is_empty() {
        let grid = array![[0.0, 1.0], [1.0, 2.0]];
        assert!(iso_segments(&[0.0, 1.0], &[0.0, 1.0], &grid, 5.0).is_empty());
    }

    #[test]
    fn test_colormap_clamps() {
        assert_eq!(Colormap::Viridis.eval(-1.0), Colormap::Viridis.eval(0.0));
        assert_eq!(Colormap::Viridis.eval(f64::NAN), Colormap::Viridis.eval(0.0));
        assert_eq!(Colormap::from_name("unknown"), Colormap::Viridis);
    }
}
