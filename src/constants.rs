// src/constants.rs

use plotters::style::RGBColor;

use crate::series::Marker;

// Export resolution. Recipe figure sizes are in inches and scale by this.
pub const DEFAULT_DPI: u32 = 200;

// Fallback pixel size when a recipe size would collapse to zero.
pub const MIN_PLOT_WIDTH: u32 = 64;
pub const MIN_PLOT_HEIGHT: u32 = 64;

// Default output name stem; the figure number is appended.
pub const DEFAULT_FILE_STEM: &str = "figure";

// Axis padding used when limits are padded instead of tightened.
pub const LIMIT_PADDING_FRACTION: f64 = 0.15;
pub const LIMIT_PADDING_MIN: f64 = 0.5;

// Marker rotation for scatter and single-point series, keyed by cycle position.
pub const MARKER_ROTATION: [Marker; 4] = [
    Marker::Circle,
    Marker::Square,
    Marker::Diamond,
    Marker::Triangle,
];

pub const DEFAULT_MARKER_SIZE: f64 = 4.0;

// --- Contour Constants ---
pub const DEFAULT_CONTOUR_LEVELS: usize = 10;
pub const CONSTRAINT_LEVELS: [f64; 1] = [0.0];
pub const CONSTRAINT_COLOR: RGBColor = RGBColor(220, 20, 60);
pub const CONSTRAINT_LINE_WIDTH: f64 = 2.0;

// Dash pattern lengths as a fraction of the axes diagonal in data space.
pub const DASH_LENGTH_FRACTION: f64 = 0.02;
pub const DOT_LENGTH_FRACTION: f64 = 0.004;
pub const DASH_GAP_FRACTION: f64 = 0.012;

// Chart layout in pixels.
pub const CHART_MARGIN_PX: u32 = 10;
pub const LABEL_AREA_PX: u32 = 50;
pub const LEGEND_SWATCH_PX: i32 = 20;

// Default 3D projection angles (radians).
pub const DEFAULT_VIEW_YAW: f64 = 0.5;
pub const DEFAULT_VIEW_PITCH: f64 = 0.3;

// src/constants.rs
