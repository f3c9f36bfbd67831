// src/color.rs

use plotters::style::RGBColor;

use crate::error::{PlotError, Result};

/// Normalized RGB color, each component in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a triple that is either normalized or in the 0-255 range.
    /// Any component above 1 switches the whole triple to the 0-255 interpretation.
    pub fn from_triple(triple: [f64; 3]) -> Result<Self> {
        if triple.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(PlotError::InvalidColor(format!("{triple:?}")));
        }
        let scale = if triple.iter().any(|c| *c > 1.0) { 255.0 } else { 1.0 };
        let [r, g, b] = triple.map(|c| c / scale);
        if r > 1.0 || g > 1.0 || b > 1.0 {
            return Err(PlotError::InvalidColor(format!("{triple:?}")));
        }
        Ok(Self { r, g, b })
    }

    /// Components scaled to the 0-255 range.
    pub fn to_u8(self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8)
    }

    pub fn to_rgb_color(self) -> RGBColor {
        let [r, g, b] = self.to_u8();
        RGBColor(r, g, b)
    }
}

/// Converts `#rrggbb` (or `rrggbb`, or the short `#rgb` form) to a normalized triple.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(PlotError::InvalidColor(hex.to_string())),
    };
    if !expanded.is_ascii() {
        return Err(PlotError::InvalidColor(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map(|v| f64::from(v) / 255.0)
            .map_err(|_| PlotError::InvalidColor(hex.to_string()))
    };
    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// How a caller asked for a color.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    /// Symbolic name (`"red"`, `"r"`) or hex string (`"#ff0000"`).
    Named(String),
    /// Normalized or 0-255 triple.
    Triple([f64; 3]),
    /// 1-based index into the active palette.
    Index(usize),
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        ColorSpec::Named(name.to_string())
    }
}

impl From<[f64; 3]> for ColorSpec {
    fn from(triple: [f64; 3]) -> Self {
        ColorSpec::Triple(triple)
    }
}

impl From<usize> for ColorSpec {
    fn from(index: usize) -> Self {
        ColorSpec::Index(index)
    }
}

impl ColorSpec {
    pub fn resolve(&self, palette: &[Rgb]) -> Result<Rgb> {
        match self {
            ColorSpec::Named(name) => named_color(name)
                .map(Ok)
                .unwrap_or_else(|| hex_to_rgb(name)),
            ColorSpec::Triple(triple) => Rgb::from_triple(*triple),
            ColorSpec::Index(index) => index
                .checked_sub(1)
                .and_then(|i| palette.get(i))
                .copied()
                .ok_or_else(|| PlotError::InvalidColor(format!("palette index {index}"))),
        }
    }
}

fn named_color(name: &str) -> Option<Rgb> {
    let rgb = match name.trim().to_ascii_lowercase().as_str() {
        "r" | "red" => Rgb::new(1.0, 0.0, 0.0),
        "g" | "green" => Rgb::new(0.0, 1.0, 0.0),
        "b" | "blue" => Rgb::new(0.0, 0.0, 1.0),
        "c" | "cyan" => Rgb::new(0.0, 1.0, 1.0),
        "m" | "magenta" => Rgb::new(1.0, 0.0, 1.0),
        "y" | "yellow" => Rgb::new(1.0, 1.0, 0.0),
        "k" | "black" => Rgb::BLACK,
        "w" | "white" => Rgb::WHITE,
        "gray" | "grey" => Rgb::new(0.5, 0.5, 0.5),
        "orange" => Rgb::new(1.0, 0.647, 0.0),
        _ => return None,
    };
    Some(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_extremes() {
        assert_eq!(hex_to_rgb("#ffffff").unwrap(), Rgb::WHITE);
        assert_eq!(hex_to_rgb("#000000").unwrap(), Rgb::BLACK);
    }

    #[test]
    fn test_hex_to_u8_rounds_back() {
        for hex in ["#88C0D0", "#bf616a", "#2E3440", "#fff"] {
            let normalized = hex_to_rgb(hex).unwrap();
            let bytes = normalized.to_u8();
            assert_eq!(f64::from(bytes[0]), (normalized.r * 255.0).round());
            assert_eq!(f64::from(bytes[1]), (normalized.g * 255.0).round());
            assert_eq!(f64::from(bytes[2]), (normalized.b * 255.0).round());
        }
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(hex_to_rgb("#12345").is_err());
        assert!(hex_to_rgb("#gg0000").is_err());
        assert!(hex_to_rgb("").is_err());
    }

    #[test]
    fn test_triple_above_one_is_byte_range() {
        let c = Rgb::from_triple([255.0, 0.0, 51.0]).unwrap();
        assert_eq!(c, Rgb::new(1.0, 0.0, 0.2));
        let n = Rgb::from_triple([0.5, 0.25, 1.0]).unwrap();
        assert_eq!(n, Rgb::new(0.5, 0.25, 1.0));
        assert!(Rgb::from_triple([300.0, 0.0, 0.0]).is_err());
        assert!(Rgb::from_triple([-0.1, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_spec_resolution() {
        let palette = [Rgb::new(0.1, 0.2, 0.3), Rgb::new(0.4, 0.5, 0.6)];
        assert_eq!(ColorSpec::from("r").resolve(&palette).unwrap(), Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(ColorSpec::from("#0000ff").resolve(&palette).unwrap(), Rgb::new(0.0, 0.0, 1.0));
        assert_eq!(ColorSpec::from(2usize).resolve(&palette).unwrap(), palette[1]);
        assert!(ColorSpec::from(0usize).resolve(&palette).is_err());
        assert!(ColorSpec::from(3usize).resolve(&palette).is_err());
        assert!(ColorSpec::from("chartreuse-ish").resolve(&palette).is_err());
    }
}
