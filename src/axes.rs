// src/axes.rs

use crate::color::Rgb;
use crate::color_scheme::ColorScheme;
use crate::constants::{DEFAULT_VIEW_PITCH, DEFAULT_VIEW_YAW, LIMIT_PADDING_FRACTION, LIMIT_PADDING_MIN};
use crate::error::{PlotError, Result};
use crate::plot_object::Extents;
use crate::recipe::Recipe;

/// Position of an axes in a `rows x cols` tiling; `index` is 1-based, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub rows: usize,
    pub cols: usize,
    pub index: usize,
}

impl Tile {
    pub const FULL: Tile = Tile { rows: 1, cols: 1, index: 1 };

    pub fn new(rows: usize, cols: usize, index: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PlotError::InvalidLayout(format!("{rows}x{cols} grid")));
        }
        let cells = rows
            .checked_mul(cols)
            .ok_or_else(|| PlotError::InvalidLayout(format!("{rows}x{cols} grid is too large")))?;
        if index == 0 || index > cells {
            return Err(PlotError::InvalidLayout(format!(
                "index {index} outside a {rows}x{cols} grid"
            )));
        }
        Ok(Tile { rows, cols, index })
    }

    /// Pixel rectangle `(x, y, width, height)` of this tile inside a `width x height` surface.
    pub fn pixel_rect(&self, width: u32, height: u32) -> (i32, i32, u32, u32) {
        let row = (self.index - 1) / self.cols;
        let col = (self.index - 1) % self.cols;
        let cell_w = width as usize / self.cols;
        let cell_h = height as usize / self.rows;
        (
            (col * cell_w) as i32,
            (row * cell_h) as i32,
            cell_w as u32,
            cell_h as u32,
        )
    }
}

/// How automatic limits are fitted to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitMode {
    #[default]
    Tight,
    Padded,
}

/// Resolved drawing ranges of one axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn padded_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 {
        LIMIT_PADDING_MIN
    } else {
        range * LIMIT_PADDING_FRACTION
    };
    (min - padding, max + padding)
}

/// Exact data range, widened only when it would be empty.
pub fn tight_range(min_val: f64, max_val: f64) -> (f64, f64) {
    if (max_val - min_val).abs() < 1e-12 {
        (min_val - LIMIT_PADDING_MIN, max_val + LIMIT_PADDING_MIN)
    } else {
        (min_val.min(max_val), min_val.max(max_val))
    }
}

/// One coordinate system of the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub tile: Tile,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub z_label: Option<String>,
    pub legend: bool,
    pub grid_on: bool,
    pub box_on: bool,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub zlim: Option<(f64, f64)>,
    pub limit_mode: LimitMode,
    pub is_3d: bool,
    /// 3D projection `(yaw, pitch)` in radians.
    pub view: (f64, f64),
    pub foreground: Rgb,
    pub background: Rgb,
    /// Number of series colored from the palette so far.
    pub color_position: usize,
    /// Advances each time the color order wraps.
    pub line_style_position: usize,
}

impl Axes {
    pub fn new(tile: Tile, recipe: &Recipe, scheme: ColorScheme) -> Self {
        Self {
            tile,
            title: None,
            x_label: None,
            y_label: None,
            z_label: None,
            legend: false,
            grid_on: recipe.grid_on,
            box_on: recipe.box_on,
            xlim: None,
            ylim: None,
            zlim: None,
            limit_mode: LimitMode::Tight,
            is_3d: false,
            view: (DEFAULT_VIEW_YAW, DEFAULT_VIEW_PITCH),
            foreground: scheme.foreground(),
            background: scheme.background(),
            color_position: 0,
            line_style_position: 0,
        }
    }

    pub fn apply_recipe(&mut self, recipe: &Recipe) {
        self.grid_on = recipe.grid_on;
        self.box_on = recipe.box_on;
    }

    pub fn apply_scheme(&mut self, scheme: ColorScheme) {
        self.foreground = scheme.foreground();
        self.background = scheme.background();
    }

    /// Moves to the next palette color; the line style advances when the palette wraps.
    pub fn advance_cycle(&mut self, palette_len: usize) {
        self.color_position += 1;
        if palette_len > 0 && self.color_position % palette_len == 0 {
            self.line_style_position += 1;
        }
    }

    /// Explicit limits win; otherwise the data extents are fitted per `limit_mode`.
    pub fn resolve_limits(&self, data: Extents) -> Limits {
        let fit = |explicit: Option<(f64, f64)>, extent: Option<(f64, f64)>| {
            if let Some(range) = explicit {
                return range;
            }
            let (lo, hi) = extent.unwrap_or((0.0, 1.0));
            match self.limit_mode {
                LimitMode::Tight => tight_range(lo, hi),
                LimitMode::Padded => padded_range(lo, hi),
            }
        };
        Limits {
            x: fit(self.xlim, data.x),
            y: fit(self.ylim, data.y),
            z: fit(self.zlim, data.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> Axes {
        Axes::new(Tile::FULL, &Recipe::default(), ColorScheme::Default)
    }

    #[test]
    fn test_tile_validation() {
        assert!(Tile::new(2, 2, 4).is_ok());
        assert!(Tile::new(2, 2, 5).is_err());
        assert!(Tile::new(0, 2, 1).is_err());
        assert!(Tile::new(1, 1, 0).is_err());
        assert!(matches!(Tile::new(usize::MAX, 2, 1), Err(PlotError::InvalidLayout(_))));
    }

    #[test]
    fn test_tile_pixel_rect_row_major() {
        let tile = Tile::new(2, 3, 5).unwrap();
        assert_eq!(tile.pixel_rect(300, 200), (100, 100, 100, 100));
        assert_eq!(Tile::FULL.pixel_rect(640, 480), (0, 0, 640, 480));
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(0.0, 10.0), (-1.5, 11.5));
        assert_eq!(padded_range(10.0, 0.0), (-1.5, 11.5));
        assert_eq!(padded_range(2.0, 2.0), (1.5, 2.5));
    }

    #[test]
    fn test_resolve_limits_modes() {
        let mut a = axes();
        let data = Extents { x: Some((0.0, 10.0)), y: Some((1.0, 1.0)), z: None };
        let tight = a.resolve_limits(data);
        assert_eq!(tight.x, (0.0, 10.0));
        assert_eq!(tight.y, (0.5, 1.5));

        a.limit_mode = LimitMode::Padded;
        assert_eq!(a.resolve_limits(data).x, (-1.5, 11.5));

        a.xlim = Some((2.0, 3.0));
        assert_eq!(a.resolve_limits(data).x, (2.0, 3.0));
    }

    #[test]
    fn test_cycle_advances_line_style_on_wrap() {
        let mut a = axes();
        for _ in 0..3 {
            a.advance_cycle(3);
        }
        assert_eq!(a.color_position, 3);
        assert_eq!(a.line_style_position, 1);
    }
}
