// src/figure.rs

// The stateful plotting context: one drawing surface, its axes tiles, the
// active recipe and color scheme, and the registry of everything drawn so far.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::axes::{Axes, LimitMode, Tile};
use crate::color::ColorSpec;
use crate::color_scheme::ColorScheme;
use crate::constants::{
    CONSTRAINT_LINE_WIDTH, DEFAULT_DPI, DEFAULT_FILE_STEM, MIN_PLOT_HEIGHT, MIN_PLOT_WIDTH,
};
use crate::contour::{build_contour, ContourKind, ContourOptions};
use crate::error::{PlotError, Result};
use crate::font_config::fonts_for;
use crate::plot_object::{PlotKind, PlotObject};
use crate::recipe::{Recipe, RecipeName};
use crate::registry::{HandleKey, HandleRegistry};
use crate::render::{render_to_file, ExportFormat, Scene};
use crate::series::{explicit_limit, resolve_series, CycleDefaults, ResolvedSeries, SeriesOptions};

/// The drawing surface backing a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub dpi: u32,
    /// A docked surface takes the recipe size; explicit sizes undock it.
    pub docked: bool,
    pub size: (u32, u32),
}

/// Whether new data replaces or extends a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    #[default]
    Replace,
    Append,
}

/// New coordinates for an existing series. Empty vectors leave that coordinate alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataUpdate {
    pub mode: UpdateMode,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl DataUpdate {
    pub fn replace(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { mode: UpdateMode::Replace, x, y, z: Vec::new() }
    }

    pub fn append(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { mode: UpdateMode::Append, x, y, z: Vec::new() }
    }

    pub fn with_z(mut self, z: Vec<f64>) -> Self {
        self.z = z;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// Lengths did not line up; the series is untouched.
    Rejected(String),
}

/// Export settings for `Figure::save`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Output path; defaults to `figure_<number>` in the working directory.
    pub file_name: Option<PathBuf>,
    /// Used when the file name carries no known extension.
    pub format: ExportFormat,
    /// Explicit pixel size; undocks a docked surface.
    pub size: Option<(u32, u32)>,
    pub dpi: Option<u32>,
}

impl SaveOptions {
    pub fn to(file_name: impl Into<PathBuf>) -> Self {
        Self { file_name: Some(file_name.into()), ..Self::default() }
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }
}

/// Output path and format for a save request.
///
/// A recognized extension on `file_name` picks the format; anything else gets the
/// requested format's extension appended.
pub fn resolve_output(file_name: Option<&Path>, number: u32, format: ExportFormat) -> (PathBuf, ExportFormat) {
    let base = file_name
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{DEFAULT_FILE_STEM}_{number}")));
    let known = base
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension);
    match known {
        Some(found) => (base, found),
        None => {
            let mut name = base.into_os_string();
            name.push(".");
            name.push(format.extension());
            (PathBuf::from(name), format)
        }
    }
}

/// Raises an export size below the smallest drawable surface, with a warning.
fn clamp_export_size((width, height): (u32, u32)) -> (u32, u32) {
    let size = (width.max(MIN_PLOT_WIDTH), height.max(MIN_PLOT_HEIGHT));
    if size != (width, height) {
        warn!(
            "Requested {width}x{height} px is below the {MIN_PLOT_WIDTH}x{MIN_PLOT_HEIGHT} minimum; exporting at {}x{}",
            size.0, size.1
        );
    }
    size
}

#[derive(Debug, Clone)]
pub struct Figure {
    number: u32,
    surface: Surface,
    recipe: Recipe,
    scheme: ColorScheme,
    axes: Vec<Axes>,
    current: usize,
    handles: HandleRegistry<PlotObject>,
}

impl Figure {
    /// New figure with the default recipe and scheme and one full-size axes.
    pub fn new(number: u32) -> Self {
        let recipe = Recipe::default();
        let scheme = ColorScheme::default();
        let surface = Surface {
            dpi: DEFAULT_DPI,
            docked: false,
            size: recipe.pixel_size(DEFAULT_DPI),
        };
        let axes = vec![Axes::new(Tile::FULL, &recipe, scheme)];
        Self {
            number,
            surface,
            recipe,
            scheme,
            axes,
            current: 0,
            handles: HandleRegistry::new(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn axes(&self) -> &[Axes] {
        &self.axes
    }

    pub fn current_axes(&self) -> &Axes {
        &self.axes[self.current]
    }

    fn current_axes_mut(&mut self) -> &mut Axes {
        &mut self.axes[self.current]
    }

    pub fn handles(&self) -> &HandleRegistry<PlotObject> {
        &self.handles
    }

    /// Replaces the recipe by name and restyles everything already drawn.
    /// Unknown names select the default recipe.
    pub fn set_recipe(&mut self, name: &str) -> RecipeName {
        let recipe = Recipe::from_name(name);
        if recipe.name.name() != name.trim().to_ascii_lowercase() {
            debug!("Unknown recipe '{name}', using '{}'", recipe.name.name());
        }
        if self.surface.docked || self.surface.size == self.recipe.pixel_size(self.surface.dpi) {
            self.surface.size = recipe.pixel_size(self.surface.dpi);
        }
        for axes in &mut self.axes {
            axes.apply_recipe(&recipe);
        }
        for (_, _, obj) in self.handles.iter_mut() {
            let width = match &obj.kind {
                PlotKind::Contour(c) if c.kind == ContourKind::Constraint => CONSTRAINT_LINE_WIDTH,
                _ => recipe.line_width,
            };
            obj.restyle_width(width);
        }
        self.recipe = recipe;
        self.recipe.name
    }

    /// Selects a color scheme by name and recolors the current axes.
    ///
    /// Objects of the current axes without an explicit color are repainted in
    /// registration order from the new palette, and the axes' color cycle resumes
    /// after them. Colors picked by palette index are looked up again in the new
    /// palette; named, hex and triple colors are kept.
    pub fn color_scheme(&mut self, name: &str) -> ColorScheme {
        let scheme = ColorScheme::from_name(name);
        if scheme.name() != name.trim().to_ascii_lowercase() {
            debug!("Unknown color scheme '{name}', using '{}'", scheme.name());
        }
        self.scheme = scheme;
        let palette = scheme.palette();
        let current = self.current;

        let mut recolored = 0;
        for (_, _, obj) in self.handles.iter_mut() {
            if obj.axes != current {
                continue;
            }
            let Some(stroke) = obj.stroke_mut() else {
                continue;
            };
            if let Some(index) = stroke.palette_index {
                match ColorSpec::Index(index).resolve(&palette) {
                    Ok(color) => stroke.color = color,
                    Err(err) => warn!("{err} in the '{}' palette; keeping the old color", scheme.name()),
                }
            } else if !stroke.explicit_color {
                stroke.color = palette[recolored % palette.len()];
                recolored += 1;
            }
        }

        let axes = self.current_axes_mut();
        axes.apply_scheme(scheme);
        axes.color_position = recolored;
        debug!("Recolored {recolored} series with the '{}' palette", scheme.name());
        scheme
    }

    /// Makes the axes at `index` of a `rows x cols` tiling current, creating it if needed.
    pub fn subplot(&mut self, rows: usize, cols: usize, index: usize) -> Result<()> {
        let tile = Tile::new(rows, cols, index)?;
        match self.axes.iter().position(|a| a.tile == tile) {
            Some(pos) => self.current = pos,
            None => {
                // A fresh tiling replaces the initial empty full-size axes.
                if self.axes.len() == 1 && self.axes[0].tile == Tile::FULL && self.handles.is_empty() {
                    self.axes[0] = Axes::new(tile, &self.recipe, self.scheme);
                    self.current = 0;
                } else {
                    self.axes.push(Axes::new(tile, &self.recipe, self.scheme));
                    self.current = self.axes.len() - 1;
                }
            }
        }
        Ok(())
    }

    fn current_axes_is_empty(&self) -> bool {
        !self.handles.iter().any(|(_, _, obj)| obj.axes == self.current)
    }

    /// Plots a series or span line into the current axes and returns its 1-based handle index.
    pub fn add_series(&mut self, options: SeriesOptions) -> Result<usize> {
        let palette = self.scheme.palette();
        let limits = [options.xlim, options.ylim, options.zlim].map(explicit_limit);
        let name = options.name.clone();

        let axes = &self.axes[self.current];
        let defaults = CycleDefaults {
            palette: &palette,
            color_position: axes.color_position,
            line_style: self.recipe.line_style_at(axes.line_style_position),
            line_width: self.recipe.line_width,
        };
        let kind = match resolve_series(options, &defaults)? {
            ResolvedSeries::Series(series) => PlotKind::Series(series),
            ResolvedSeries::Span(span) => PlotKind::Span(span),
        };
        let was_empty = self.current_axes_is_empty();
        let obj = PlotObject { axes: self.current, kind };

        let marker_only = obj.as_series().is_some_and(|s| s.is_marker_only());
        let is_3d = obj.is_3d();
        let cycled = match &obj.kind {
            PlotKind::Series(s) => !s.stroke.explicit_color,
            PlotKind::Span(s) => !s.stroke.explicit_color,
            PlotKind::Contour(_) => false,
        };

        let index = self.handles.add(obj, &name)?;

        let axes = self.current_axes_mut();
        if was_empty {
            axes.limit_mode = if marker_only { LimitMode::Padded } else { LimitMode::Tight };
        }
        if is_3d {
            axes.is_3d = true;
        }
        let [xlim, ylim, zlim] = limits;
        if xlim.is_some() {
            axes.xlim = xlim;
        }
        if ylim.is_some() {
            axes.ylim = ylim;
        }
        if zlim.is_some() {
            axes.zlim = zlim;
        }
        if cycled {
            axes.advance_cycle(palette.len());
        }
        debug!("Registered plot {index} on axes {}", self.current + 1);
        Ok(index)
    }

    /// Adds a contour, constraint line or surface to the current axes.
    pub fn add_contour(&mut self, options: ContourOptions) -> Result<usize> {
        let width = if options.kind == ContourKind::Constraint {
            CONSTRAINT_LINE_WIDTH
        } else {
            self.recipe.line_width
        };
        let name = options.name.clone();
        let contour = build_contour(options, width)?;
        let was_empty = self.current_axes_is_empty();
        let is_3d = contour.kind.is_3d();

        let index = self
            .handles
            .add(PlotObject { axes: self.current, kind: PlotKind::Contour(contour) }, &name)?;

        let axes = self.current_axes_mut();
        if was_empty {
            axes.limit_mode = LimitMode::Tight;
        }
        if is_3d {
            axes.is_3d = true;
        }
        Ok(index)
    }

    /// Replaces or extends the data of a registered series.
    ///
    /// Length mismatches are reported as `UpdateOutcome::Rejected` and leave the
    /// series as it was.
    pub fn update_plot_data<'k>(
        &mut self,
        key: impl Into<HandleKey<'k>>,
        update: DataUpdate,
    ) -> Result<UpdateOutcome> {
        let key = key.into();
        let obj = self.handles.get_mut(key)?;
        let PlotKind::Series(series) = &mut obj.kind else {
            return Err(PlotError::NotASeries(key.to_string()));
        };

        let DataUpdate { mode, x, y, z } = update;
        let problem = match mode {
            UpdateMode::Replace => {
                let nx = if x.is_empty() { series.x.len() } else { x.len() };
                let ny = if y.is_empty() { series.y.len() } else { y.len() };
                let nz = if z.is_empty() { series.z.len() } else { z.len() };
                if nx != ny {
                    Some(format!("x would have {nx} values and y {ny}"))
                } else if nz != 0 && nz != ny {
                    Some(format!("z would have {nz} values and y {ny}"))
                } else {
                    None
                }
            }
            UpdateMode::Append => {
                let expected_z = if series.is_3d() { x.len() } else { 0 };
                if x.len() != y.len() {
                    Some(format!("appending {} x values to {} y values", x.len(), y.len()))
                } else if z.len() != expected_z {
                    Some(format!("appending {} z values, expected {expected_z}", z.len()))
                } else {
                    None
                }
            }
        };
        if let Some(reason) = problem {
            warn!("Rejected data update for {key}: {reason}");
            return Ok(UpdateOutcome::Rejected(reason));
        }

        match mode {
            UpdateMode::Replace => {
                if !x.is_empty() {
                    series.x = x;
                }
                if !y.is_empty() {
                    series.y = y;
                }
                if !z.is_empty() {
                    series.z = z;
                }
            }
            UpdateMode::Append => {
                series.x.extend(x);
                series.y.extend(y);
                series.z.extend(z);
            }
        }
        let axes = obj.axes;
        if obj.is_3d() {
            self.axes[axes].is_3d = true;
        }
        Ok(UpdateOutcome::Applied)
    }

    /// Removes a handle; every later handle moves down one index.
    pub fn delete_plot<'k>(&mut self, key: impl Into<HandleKey<'k>>) -> Result<PlotObject> {
        let (name, obj) = self.handles.delete(key)?;
        debug!("Deleted plot '{name}'");
        Ok(obj)
    }

    pub fn get_plot<'k>(&self, key: impl Into<HandleKey<'k>>) -> Result<&PlotObject> {
        self.handles.get(key)
    }

    pub fn plot_index(&self, name: &str) -> Result<usize> {
        self.handles.index_of(name)
    }

    /// Drops every axes and handle; recipe and scheme stay.
    pub fn clear(&mut self) {
        self.handles.clear();
        self.axes = vec![Axes::new(Tile::FULL, &self.recipe, self.scheme)];
        self.current = 0;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.current_axes_mut().title = Some(title.into());
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.current_axes_mut().x_label = Some(label.into());
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.current_axes_mut().y_label = Some(label.into());
    }

    pub fn set_zlabel(&mut self, label: impl Into<String>) {
        self.current_axes_mut().z_label = Some(label.into());
    }

    pub fn legend(&mut self, on: bool) {
        self.current_axes_mut().legend = on;
    }

    pub fn grid(&mut self, on: bool) {
        self.current_axes_mut().grid_on = on;
    }

    pub fn box_on(&mut self, on: bool) {
        self.current_axes_mut().box_on = on;
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.current_axes_mut().xlim = explicit_limit([lo, hi]);
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.current_axes_mut().ylim = explicit_limit([lo, hi]);
    }

    pub fn set_zlim(&mut self, lo: f64, hi: f64) {
        self.current_axes_mut().zlim = explicit_limit([lo, hi]);
    }

    /// 3D projection angles in radians.
    pub fn set_view(&mut self, yaw: f64, pitch: f64) {
        self.current_axes_mut().view = (yaw, pitch);
    }

    /// Docking pins the surface to the recipe size.
    pub fn set_docked(&mut self, docked: bool) {
        self.surface.docked = docked;
        if docked {
            self.surface.size = self.recipe.pixel_size(self.surface.dpi);
        }
    }

    /// Explicit surface size in pixels; a docked surface is undocked first.
    pub fn set_size(&mut self, width: u32, height: u32) {
        if self.surface.docked {
            debug!("Undocking figure {} to apply {width}x{height}", self.number);
            self.surface.docked = false;
        }
        self.surface.size = (width, height);
    }

    pub fn set_dpi(&mut self, dpi: u32) {
        let follows_recipe = self.surface.size == self.recipe.pixel_size(self.surface.dpi);
        self.surface.dpi = dpi.max(1);
        if self.surface.docked || follows_recipe {
            self.surface.size = self.recipe.pixel_size(self.surface.dpi);
        }
    }

    /// Renders the figure to disk and returns the written path. Consumes the figure.
    pub fn save(mut self, options: SaveOptions) -> Result<PathBuf> {
        let (path, format) = resolve_output(options.file_name.as_deref(), self.number, options.format);
        if let Some(dpi) = options.dpi {
            self.set_dpi(dpi);
        }
        if let Some((width, height)) = options.size {
            self.set_size(width, height);
        }
        let size = clamp_export_size(self.surface.size);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PlotError::Io(parent.display().to_string(), e))?;
        }

        let scene = Scene {
            background: self.scheme.background(),
            axes: &self.axes,
            handles: &self.handles,
            fonts: fonts_for(&self.recipe, self.surface.dpi),
            px_scale: f64::from(self.surface.dpi) / 100.0,
        };
        render_to_file(&scene, &path, format, size)?;
        info!(
            "Saved figure {} ({} plots, {}x{} px) to {}",
            self.number,
            self.handles.len(),
            size.0,
            size.1,
            path.display()
        );
        Ok(path)
    }

    /// Releases the figure without writing anything.
    pub fn close(self) {
        debug!("Closed figure {} with {} plots", self.number, self.handles.len());
    }
}


// src/figure.rs
