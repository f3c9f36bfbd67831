// src/color_scheme.rs

// Named palettes. Each scheme carries a foreground (axes, text), a background
// and an ordered series palette that new series cycle through.

use crate::color::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Default,
    Nord,
    NordWhite,
    NordNight,
    Dracula,
}

fn hex(v: u32) -> Rgb {
    let channel = |shift: u32| f64::from((v >> shift) & 0xff) / 255.0;
    Rgb::new(channel(16), channel(8), channel(0))
}

const DEFAULT_PALETTE: [u32; 7] = [
    0x0072BD,
    0xD95319,
    0xEDB120,
    0x7E2F8E,
    0x77AC30,
    0x4DBEEE,
    0xA2142F,
];

const NORD_PALETTE: [u32; 7] = [
    0x88C0D0,
    0xBF616A,
    0xA3BE8C,
    0xEBCB8B,
    0xB48EAD,
    0xD08770,
    0x5E81AC,
];

// Darker accents read better on a white background.
const NORD_WHITE_PALETTE: [u32; 6] = [
    0x5E81AC,
    0xBF616A,
    0xA3BE8C,
    0xD08770,
    0xB48EAD,
    0x4C566A,
];

const DRACULA_PALETTE: [u32; 7] = [
    0x8BE9FD,
    0xFF79C6,
    0x50FA7B,
    0xFFB86C,
    0xBD93F9,
    0xF1FA8C,
    0xFF5555,
];

impl ColorScheme {
    pub const ALL: [ColorScheme; 5] = [
        ColorScheme::Default,
        ColorScheme::Nord,
        ColorScheme::NordWhite,
        ColorScheme::NordNight,
        ColorScheme::Dracula,
    ];

    /// Looks up a scheme by name. Unknown names select `Default`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "nord" => ColorScheme::Nord,
            "nordwhite" => ColorScheme::NordWhite,
            "nordnight" => ColorScheme::NordNight,
            "dracula" => ColorScheme::Dracula,
            _ => ColorScheme::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::Default => "default",
            ColorScheme::Nord => "nord",
            ColorScheme::NordWhite => "nordwhite",
            ColorScheme::NordNight => "nordnight",
            ColorScheme::Dracula => "dracula",
        }
    }

    pub fn foreground(self) -> Rgb {
        match self {
            ColorScheme::Default => Rgb::BLACK,
            ColorScheme::Nord => hex(0xD8DEE9),
            ColorScheme::NordWhite => hex(0x2E3440),
            ColorScheme::NordNight => hex(0xE5E9F0),
            ColorScheme::Dracula => hex(0xF8F8F2),
        }
    }

    pub fn background(self) -> Rgb {
        match self {
            ColorScheme::Default | ColorScheme::NordWhite => Rgb::WHITE,
            ColorScheme::Nord => hex(0x2E3440),
            ColorScheme::NordNight => hex(0x242933),
            ColorScheme::Dracula => hex(0x282A36),
        }
    }

    pub fn palette(self) -> Vec<Rgb> {
        let codes: &[u32] = match self {
            ColorScheme::Default => &DEFAULT_PALETTE,
            ColorScheme::Nord | ColorScheme::NordNight => &NORD_PALETTE,
            ColorScheme::NordWhite => &NORD_WHITE_PALETTE,
            ColorScheme::Dracula => &DRACULA_PALETTE,
        };
        codes.iter().copied().map(hex).collect()
    }
}
