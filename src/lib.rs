// src/lib.rs - Library interface for the plotting context

pub mod axes;
pub mod color;
pub mod color_scheme;
pub mod constants;
pub mod contour;
pub mod error;
pub mod figure;
pub mod font_config;
pub mod plot_object;
pub mod recipe;
pub mod registry;
pub mod render;
pub mod series;

pub use color::{hex_to_rgb, ColorSpec, Rgb};
pub use color_scheme::ColorScheme;
pub use contour::{Colormap, ContourKind, ContourOptions, LevelSpec};
pub use error::{PlotError, Result};
pub use figure::{DataUpdate, Figure, SaveOptions, UpdateMode, UpdateOutcome};
pub use recipe::{Recipe, RecipeName};
pub use registry::{HandleKey, HandleRegistry};
pub use render::ExportFormat;
pub use series::{LineStyle, Marker, SeriesOptions};

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// src/lib.rs
