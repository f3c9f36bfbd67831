// src/main.rs

use std::error::Error;
use std::f64::consts::PI;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use recipe_plot::{
    Colormap, ContourKind, ContourOptions, ExportFormat, Figure, LevelSpec, LineStyle, Marker,
    SaveOptions, SeriesOptions,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Svg,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Svg => ExportFormat::Svg,
        }
    }
}

/// Render a demo figure with a chosen recipe and color scheme.
#[derive(Debug, Parser)]
#[command(name = "recipe_plot", version = recipe_plot::crate_version())]
struct Cli {
    /// Output file; the extension picks the format when it is png or svg.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Color scheme: default, nord, nordwhite, nordnight, dracula.
    #[arg(short, long, default_value = "default")]
    scheme: String,

    /// Style recipe: default, trajectory.
    #[arg(short, long, default_value = "default")]
    recipe: String,

    /// Width in pixels; needs --height as well.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    #[arg(long, requires = "width")]
    height: Option<u32>,

    #[arg(long, value_enum, default_value = "png")]
    format: FormatArg,

    /// Figure number used for the default file name.
    #[arg(short, long, default_value_t = 1)]
    number: u32,

    /// Line style of the cos series: -, --, :, -. or none.
    #[arg(long, default_value = "--", allow_hyphen_values = true)]
    line_style: String,

    /// Marker of the sample points: o, s, d, ^, x, + or .
    #[arg(long, default_value = "o")]
    marker: String,

    /// Contour kind of the field plot: filled, contour, contour3, surface.
    #[arg(long, default_value = "filled")]
    kind: String,

    /// Colormap of the field plot: viridis, plasma, inferno, magma, cividis, turbo.
    #[arg(long, default_value = "viridis")]
    colormap: String,
}

impl Cli {
    fn line_style(&self) -> LineStyle {
        LineStyle::from_symbol(&self.line_style).unwrap_or_else(|| {
            warn!("Unknown line style '{}', using dashed", self.line_style);
            LineStyle::Dashed
        })
    }

    fn marker(&self) -> Marker {
        Marker::from_symbol(&self.marker).unwrap_or_else(|| {
            warn!("Unknown marker '{}', using circles", self.marker);
            Marker::Circle
        })
    }

    fn kind(&self) -> ContourKind {
        match ContourKind::from_name(&self.kind) {
            Some(ContourKind::Constraint) | None => {
                warn!("'{}' is not a field contour kind, using filled", self.kind);
                ContourKind::Filled
            }
            Some(kind) => kind,
        }
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n.saturating_sub(1).max(1)) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

fn build_demo(cli: &Cli) -> recipe_plot::Result<Figure> {
    let mut fig = Figure::new(cli.number);
    fig.set_recipe(&cli.recipe);
    fig.color_scheme(&cli.scheme);

    fig.subplot(1, 2, 1)?;
    let t = linspace(0.0, 2.0 * PI, 200);
    fig.add_series(
        SeriesOptions::xy(t.clone(), t.iter().map(|v| v.sin()).collect())
            .named("sin")
            .with_label("sin(t)"),
    )?;
    fig.add_series(
        SeriesOptions::xy(t.clone(), t.iter().map(|v| v.cos()).collect())
            .named("cos")
            .with_label("cos(t)")
            .with_line_style(cli.line_style()),
    )?;
    let samples = linspace(0.0, 2.0 * PI, 9);
    fig.add_series(
        SeriesOptions::xy(samples.clone(), samples.iter().map(|v| (v / 2.0).sin() - 0.5).collect())
            .scatter()
            .with_marker(cli.marker())
            .with_label("samples"),
    )?;
    fig.add_series(SeriesOptions::hline(0.0).with_color("k"))?;
    fig.set_title("Series");
    fig.set_xlabel("t");
    fig.legend(true);

    fig.subplot(1, 2, 2)?;
    let x = linspace(-2.0, 2.0, 60);
    let y = linspace(-2.0, 2.0, 60);
    let kind = cli.kind();
    fig.add_contour(
        ContourOptions::from_fn(kind, x.clone(), y.clone(), |x, y| {
            (x * x + y * y).sqrt() + 0.5 * (3.0 * x).sin()
        })
        .with_levels(LevelSpec::Count(8))
        .with_colormap(Colormap::from_name(&cli.colormap))
        .named("field"),
    )?;
    if !kind.is_3d() {
        fig.add_contour(
            ContourOptions::from_fn(ContourKind::Constraint, x, y, |x, y| x + y * y - 1.0)
                .named("constraint")
                .with_label("x + y^2 = 1"),
        )?;
    }
    fig.set_title("Contours");
    fig.legend(true);
    Ok(fig)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let fig = build_demo(&cli)?;
    info!("Built demo figure {} with {} plots", fig.number(), fig.handles().len());

    let mut options = SaveOptions {
        file_name: cli.output.clone(),
        ..SaveOptions::default()
    }
    .with_format(cli.format.into());
    if let (Some(width), Some(height)) = (cli.width, cli.height) {
        options = options.with_size(width, height);
    }
    let path = fig.save(options)?;
    println!("{}", path.display());
    Ok(())
}

// src/main.rs
