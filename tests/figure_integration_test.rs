// tests/figure_integration_test.rs

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::array;
use recipe_plot::contour::{iso_segments, ContourColoring};
use recipe_plot::plot_object::PlotKind;
use recipe_plot::{
    hex_to_rgb, ColorScheme, ContourKind, ContourOptions, DataUpdate, ExportFormat, Figure,
    LevelSpec, LineStyle, Marker, PlotError, Rgb, SaveOptions, SeriesOptions, UpdateOutcome,
};

fn color_of(fig: &Figure, index: usize) -> Rgb {
    fig.get_plot(index)
        .unwrap()
        .as_series()
        .unwrap()
        .stroke
        .color
}

/// Fresh scratch directory per test so parallel runs do not share files.
fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("recipe_plot_tests").join(test);
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn assert_written(path: &Path) {
    let meta = fs::metadata(path).unwrap_or_else(|e| panic!("{} missing: {e}", path.display()));
    assert!(meta.len() > 0, "{} is empty", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncolored_series_walk_the_palette() {
        for scheme in ColorScheme::ALL {
            let mut fig = Figure::new(1);
            fig.color_scheme(scheme.name());
            let palette = scheme.palette();
            let n = palette.len() * 2 + 1;
            for i in 1..=n {
                fig.add_series(SeriesOptions::xy(vec![0.0, 1.0], vec![i as f64, 0.0])).unwrap();
            }
            for i in 1..=n {
                assert_eq!(color_of(&fig, i), palette[(i - 1) % palette.len()], "{scheme:?} #{i}");
            }
        }
    }

    #[test]
    fn test_hex_white_and_black() {
        assert_eq!(hex_to_rgb("#ffffff").unwrap(), Rgb::new(1.0, 1.0, 1.0));
        assert_eq!(hex_to_rgb("#000000").unwrap(), Rgb::new(0.0, 0.0, 0.0));
        assert_eq!(hex_to_rgb("#336699").unwrap().to_u8(), [0x33, 0x66, 0x99]);
        assert!(matches!(hex_to_rgb("#12345"), Err(PlotError::InvalidColor(_))));
    }

    #[test]
    fn test_mismatched_update_is_rejected_without_change() {
        let mut fig = Figure::new(7);
        let idx = fig
            .add_series(SeriesOptions::xy(vec![0.0, 1.0, 2.0], vec![5.0, 6.0, 7.0]).named("run"))
            .unwrap();
        let before = fig.get_plot("run").unwrap().clone();

        let attempts = [
            DataUpdate::replace(vec![1.0], vec![1.0, 2.0]),
            DataUpdate::replace(vec![0.0, 1.0], vec![]),
            DataUpdate::append(vec![3.0, 4.0], vec![8.0]),
            DataUpdate::replace(vec![], vec![]).with_z(vec![1.0]),
        ];
        for update in attempts {
            let outcome = fig.update_plot_data(idx, update).unwrap();
            assert!(matches!(outcome, UpdateOutcome::Rejected(_)));
            assert_eq!(fig.get_plot(idx).unwrap(), &before);
        }
    }

    #[test]
    fn test_function_contour_grid() {
        let mut fig = Figure::new(1);
        let idx = fig
            .add_contour(
                ContourOptions::from_fn(ContourKind::Contour2d, vec![0.0, 1.0], vec![0.0, 1.0], |x, y| x + y)
                    .with_levels(LevelSpec::Values(vec![1.0])),
            )
            .unwrap();
        let PlotKind::Contour(contour) = &fig.get_plot(idx).unwrap().kind else {
            panic!("expected a contour");
        };
        assert_eq!(contour.grid, array![[0.0, 1.0], [1.0, 2.0]]);
        assert!(matches!(contour.coloring, ContourColoring::Colormap(_)));

        // The x + y = 1 iso-line runs corner to corner through the cell.
        let segments = iso_segments(&contour.x, &contour.y, &contour.grid, 1.0);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_surface_makes_axes_3d() {
        let mut fig = Figure::new(1);
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 1.0];
        fig.add_contour(ContourOptions::from_grid(
            ContourKind::Surface,
            x,
            y,
            array![[0.0, 1.0, 2.0], [1.0, 2.0, 3.0]],
        ))
        .unwrap();
        assert!(fig.current_axes().is_3d);
    }

    #[test]
    fn test_invalid_function_registers_nothing() {
        let mut fig = Figure::new(1);
        let err = fig
            .add_contour(ContourOptions::from_fn(ContourKind::Filled, vec![0.0, 1.0], vec![0.0, 1.0], |x, _| {
                1.0 / x
            }))
            .unwrap_err();
        assert!(matches!(err, PlotError::InvalidFunction(_)));
        assert!(fig.handles().is_empty());
    }

    #[test]
    fn test_single_points_rotate_markers() {
        let mut fig = Figure::new(1);
        let markers: Vec<Marker> = (0..5)
            .map(|i| {
                let idx = fig.add_series(SeriesOptions::xy(vec![i as f64], vec![1.0])).unwrap();
                fig.get_plot(idx).unwrap().as_series().unwrap().marker
            })
            .collect();
        assert_eq!(
            markers,
            vec![Marker::Circle, Marker::Square, Marker::Diamond, Marker::Triangle, Marker::Circle]
        );
    }

    #[test]
    fn test_save_tiled_figure_png_and_svg() {
        let dir = scratch_dir("tiled");
        let build = || {
            let mut fig = Figure::new(3);
            fig.color_scheme("nord");
            fig.subplot(2, 1, 1).unwrap();
            fig.add_series(SeriesOptions::xy(vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 2.0]).with_label("run")).unwrap();
            fig.add_series(
                SeriesOptions::xy(vec![0.0, 1.0, 2.0], vec![2.0, 1.0, 0.5])
                    .with_line_style(LineStyle::DashDot)
                    .with_label("ref"),
            )
            .unwrap();
            fig.add_series(SeriesOptions::hline(1.5).with_label("limit")).unwrap();
            fig.add_series(SeriesOptions::vline(1.0)).unwrap();
            fig.set_title("tiles");
            fig.legend(true);
            fig.subplot(2, 1, 2).unwrap();
            fig.add_series(SeriesOptions::xy(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 4.0]).scatter()).unwrap();
            fig
        };

        // Nested directories are created on demand.
        let png = build().save(SaveOptions::to(dir.join("nested/deeper/tiles.png"))).unwrap();
        assert_eq!(png, dir.join("nested/deeper/tiles.png"));
        assert_written(&png);

        let svg = build()
            .save(SaveOptions::to(dir.join("tiles")).with_format(ExportFormat::Svg).with_size(320, 240))
            .unwrap();
        assert_eq!(svg, dir.join("tiles.svg"));
        assert_written(&svg);
        assert!(fs::read_to_string(&svg).unwrap().contains("<svg"));
    }

    #[test]
    fn test_save_surface_and_contour3_figure() {
        let dir = scratch_dir("surface");
        let x: Vec<f64> = (0..12).map(|i| -1.0 + i as f64 / 5.5).collect();
        let y = x.clone();
        let mut fig = Figure::new(4);
        fig.subplot(1, 2, 1).unwrap();
        fig.add_contour(
            ContourOptions::from_fn(ContourKind::Surface, x.clone(), y.clone(), |x, y| x * x - y * y)
                .with_levels(LevelSpec::Count(6)),
        )
        .unwrap();
        fig.subplot(1, 2, 2).unwrap();
        fig.add_contour(
            ContourOptions::from_fn(ContourKind::Contour3d, x, y, |x, y| (x * y).sin()).with_label("field"),
        )
        .unwrap();
        fig.legend(true);
        let path = fig.save(SaveOptions::to(dir.join("surface.png"))).unwrap();
        assert_written(&path);
    }

    #[test]
    fn test_save_z_span_on_3d_axes() {
        let dir = scratch_dir("zspan");
        let mut fig = Figure::new(5);
        fig.add_series(SeriesOptions::xyz(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.5, 1.0]))
            .unwrap();
        fig.add_series(SeriesOptions::xyz(vec![], vec![], vec![0.5]).with_label("mid")).unwrap();
        assert!(fig.current_axes().is_3d);
        let path = fig
            .save(SaveOptions::to(dir.join("zspan")).with_format(ExportFormat::Svg))
            .unwrap();
        assert_written(&path);
    }

    #[test]
    fn test_save_dashed_line_far_past_limits() {
        // A dashed line reaching 1e7 with x limits [0, 1] must still save quickly.
        let dir = scratch_dir("far_dashes");
        let mut fig = Figure::new(6);
        fig.add_series(
            SeriesOptions::xy(vec![0.0, 1.0e7], vec![0.0, 1.0])
                .with_line_style(LineStyle::Dashed)
                .with_xlim(0.0, 1.0),
        )
        .unwrap();
        let path = fig.save(SaveOptions::to(dir.join("far.svg"))).unwrap();
        assert_written(&path);
        assert!(fs::metadata(&path).unwrap().len() < 1_000_000);
    }

    #[test]
    fn test_close_without_saving() {
        let mut fig = Figure::new(2);
        fig.add_series(SeriesOptions::y(vec![1.0, 2.0, 3.0])).unwrap();
        fig.close();
    }
}

// tests/figure_integration_test.rs
