// src/recipe.rs

use crate::series::LineStyle;

/// How text is rendered on the figure. Plotters has no TeX engine, so this
/// selects the font family that best approximates each mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Plain,
    Tex,
    Latex,
}

/// Named recipes. Unknown names resolve to `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipeName {
    #[default]
    Default,
    Trajectory,
}

impl RecipeName {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "trajectory" => RecipeName::Trajectory,
            _ => RecipeName::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RecipeName::Default => "default",
            RecipeName::Trajectory => "trajectory",
        }
    }
}

/// Cosmetic defaults applied to a figure as a whole. Replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub name: RecipeName,
    /// Figure size in inches; multiplied by the export DPI.
    pub figure_size: (f64, f64),
    pub box_on: bool,
    pub grid_on: bool,
    pub line_width: f64,
    pub axes_font_size: u32,
    pub label_font_size: u32,
    pub title_font_size: u32,
    pub legend_font_size: u32,
    pub text_mode: TextMode,
    /// Line styles cycled once the color order wraps.
    pub line_style_order: Vec<LineStyle>,
}

impl Recipe {
    pub fn from_name(name: &str) -> Self {
        Self::preset(RecipeName::from_name(name))
    }

    pub fn preset(name: RecipeName) -> Self {
        match name {
            RecipeName::Default => Recipe {
                name,
                figure_size: (5.6, 4.2),
                box_on: true,
                grid_on: false,
                line_width: 1.0,
                axes_font_size: 10,
                label_font_size: 11,
                title_font_size: 13,
                legend_font_size: 9,
                text_mode: TextMode::Tex,
                line_style_order: vec![LineStyle::Solid],
            },
            RecipeName::Trajectory => Recipe {
                name,
                figure_size: (6.0, 6.0),
                box_on: true,
                grid_on: true,
                line_width: 2.0,
                axes_font_size: 12,
                label_font_size: 14,
                title_font_size: 15,
                legend_font_size: 11,
                text_mode: TextMode::Latex,
                line_style_order: vec![
                    LineStyle::Solid,
                    LineStyle::Dashed,
                    LineStyle::Dotted,
                    LineStyle::DashDot,
                ],
            },
        }
    }

    /// Pixel size of the figure at the given DPI.
    pub fn pixel_size(&self, dpi: u32) -> (u32, u32) {
        let scale = |inches: f64| (inches * f64::from(dpi)).round().max(0.0) as u32;
        (scale(self.figure_size.0), scale(self.figure_size.1))
    }

    /// Line style at a 0-based line-style cycle position.
    pub fn line_style_at(&self, position: usize) -> LineStyle {
        if self.line_style_order.is_empty() {
            return LineStyle::Solid;
        }
        self.line_style_order[position % self.line_style_order.len()]
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Self::preset(RecipeName::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_recipe_falls_back() {
        assert_eq!(Recipe::from_name("fancy"), Recipe::default());
        assert_eq!(Recipe::from_name("TRAJECTORY").name, RecipeName::Trajectory);
    }

    #[test]
    fn test_pixel_size_scales_with_dpi() {
        let recipe = Recipe::default();
        assert_eq!(recipe.pixel_size(200), (1120, 840));
        assert_eq!(recipe.pixel_size(100), (560, 420));
    }

    #[test]
    fn test_line_style_cycle() {
        let recipe = Recipe::preset(RecipeName::Trajectory);
        assert_eq!(recipe.line_style_at(0), LineStyle::Solid);
        assert_eq!(recipe.line_style_at(1), LineStyle::Dashed);
        assert_eq!(recipe.line_style_at(5), LineStyle::Dashed);
        assert_eq!(Recipe::default().line_style_at(3), LineStyle::Solid);
    }
}
