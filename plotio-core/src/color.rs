//! Colors for display properties
//!
//! A color can be given by name (`"red"`, `"gold"`), by one-letter
//! abbreviation (`"r"`), as a hex string (`"#ff8800"`), as an RGB triple in
//! `[0, 1]` or as a palette index.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An RGB color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("blue", [0, 0, 255]),
    ("magenta", [255, 0, 255]),
    ("cyan", [0, 255, 255]),
    ("white", [255, 255, 255]),
    ("grey", [128, 128, 128]),
    ("gray", [128, 128, 128]),
    ("orange", [255, 165, 0]),
    ("gold", [255, 215, 0]),
    ("brown", [165, 42, 42]),
    ("pink", [255, 192, 203]),
    ("purple", [128, 0, 128]),
    ("violet", [238, 130, 238]),
    ("olive", [128, 128, 0]),
    ("lime", [0, 255, 0]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("silver", [192, 192, 192]),
    ("tomato", [255, 99, 71]),
    ("lightblue", [173, 216, 230]),
    ("darkgreen", [0, 100, 0]),
];

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("k", "black"),
    ("r", "red"),
    ("g", "green"),
    ("y", "yellow"),
    ("b", "blue"),
    ("m", "magenta"),
    ("c", "cyan"),
    ("w", "white"),
];

/// Palette used for integer colors, cycled modulo its length
const PALETTE: [[u8; 3]; 10] = [
    [255, 215, 0],
    [30, 144, 255],
    [220, 20, 60],
    [50, 205, 50],
    [255, 140, 0],
    [148, 0, 211],
    [0, 206, 209],
    [139, 69, 19],
    [255, 105, 180],
    [128, 128, 128],
];

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Palette color for an integer index
    pub fn from_index(index: usize) -> Self {
        Self::from_rgb8(PALETTE[index % PALETTE.len()])
    }

    /// Look up a named color or one-letter abbreviation
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let full = ABBREVIATIONS
            .iter()
            .find(|(abbr, _)| *abbr == lower)
            .map(|(_, full)| *full)
            .unwrap_or(lower.as_str());
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == full)
            .map(|(_, rgb)| Self::from_rgb8(*rgb))
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::from_rgb8([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl Default for Color {
    /// Gold, the default surface color
    fn default() -> Self {
        Self::from_rgb8([255, 215, 0])
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(c) = Self::from_hex(s.trim()).or_else(|| Self::from_name(s)) {
            return Ok(c);
        }
        if let Ok(index) = s.trim().parse::<usize>() {
            return Ok(Self::from_index(index));
        }
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() == 3 {
            let rgb: std::result::Result<Vec<f32>, _> = parts.iter().map(|p| p.parse::<f32>()).collect();
            if let Ok(rgb) = rgb {
                return Ok(Self::from([rgb[0], rgb[1], rgb[2]]));
            }
        }
        Err(Error::InvalidData(format!("Unknown color: {}", s)))
    }
}

impl From<[f32; 3]> for Color {
    /// Triples with any component above 1 are read as 0..255 values
    fn from(rgb: [f32; 3]) -> Self {
        if rgb.iter().any(|&c| c > 1.0) {
            Self::new(rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0)
        } else {
            Self::new(rgb[0], rgb[1], rgb[2])
        }
    }
}

impl From<usize> for Color {
    fn from(index: usize) -> Self {
        Self::from_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_abbreviations() {
        assert_eq!("red".parse::<Color>().unwrap(), Color::new(1.0, 0.0, 0.0));
        assert_eq!("R".parse::<Color>().unwrap(), Color::new(1.0, 0.0, 0.0));
        assert_eq!("#0000ff".parse::<Color>().unwrap().to_rgb8(), [0, 0, 255]);
        assert_eq!("0.5, 0.5, 0.5".parse::<Color>().unwrap(), Color::new(0.5, 0.5, 0.5));
        assert!("not-a-color".parse::<Color>().is_err());
    }

    #[test]
    fn test_index_wraps() {
        assert_eq!(Color::from(3usize), Color::from(13usize));
        assert_eq!(Color::from([255.0, 0.0, 0.0]), Color::new(1.0, 0.0, 0.0));
    }
}
