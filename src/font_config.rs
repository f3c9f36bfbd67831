// src/font_config.rs

// Font styles for every text element of a figure, derived from the active recipe.
// All font decisions are centralized here so the renderer never hardcodes a family or size.

use crate::recipe::{Recipe, TextMode};

/// Font family used for plain text and TeX-style labels.
pub const FONT_FAMILY_SANS: &str = "sans-serif";

/// Font family used when the recipe asks for LaTeX-like rendering.
pub const FONT_FAMILY_SERIF: &str = "serif";

/// Represents a font style (family + size) for consistent usage throughout the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontStyle {
    pub family: &'static str,
    pub size: i32,
}

impl FontStyle {
    /// Tuple form accepted by plotters' `IntoFont`.
    pub fn as_tuple(self) -> (&'static str, i32) {
        (self.family, self.size)
    }
}

/// The four font roles a figure uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSet {
    pub axes: FontStyle,
    pub label: FontStyle,
    pub title: FontStyle,
    pub legend: FontStyle,
}

pub fn family_for(mode: TextMode) -> &'static str {
    match mode {
        TextMode::Latex => FONT_FAMILY_SERIF,
        TextMode::Plain | TextMode::Tex => FONT_FAMILY_SANS,
    }
}

/// Builds the fonts for a recipe, scaled for the output resolution.
/// Recipe sizes are in points at 100 DPI.
pub fn fonts_for(recipe: &Recipe, dpi: u32) -> FontSet {
    let family = family_for(recipe.text_mode);
    let scale = |pt: u32| ((f64::from(pt) * f64::from(dpi) / 100.0).round() as i32).max(1);
    FontSet {
        axes: FontStyle { family, size: scale(recipe.axes_font_size) },
        label: FontStyle { family, size: scale(recipe.label_font_size) },
        title: FontStyle { family, size: scale(recipe.title_font_size) },
        legend: FontStyle { family, size: scale(recipe.legend_font_size) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeName;

    #[test]
    fn test_latex_recipe_uses_serif() {
        let fonts = fonts_for(&Recipe::preset(RecipeName::Trajectory), 100);
        assert_eq!(fonts.title.family, FONT_FAMILY_SERIF);
        assert_eq!(fonts.title.size, 15);
    }

    #[test]
    fn test_sizes_scale_with_dpi() {
        let recipe = Recipe::default();
        let fonts = fonts_for(&recipe, 200);
        assert_eq!(fonts.axes.size, recipe.axes_font_size as i32 * 2);
        assert_eq!(fonts.legend.as_tuple(), (FONT_FAMILY_SANS, recipe.legend_font_size as i32 * 2));
    }
}
