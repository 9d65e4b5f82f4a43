//! RGBA color carried by spectra, peaks, and overlay data.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// 8-bit RGBA color.
///
/// Parsed from and formatted as CSS-style hex strings (`#rrggbb` or
/// `#rrggbbaa`), which is how hosts hand colors to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const STEEL_BLUE: Self = Self::rgb(0x46, 0x82, 0xb4);
    pub const FIREBRICK: Self = Self::rgb(0xb2, 0x22, 0x22);
    pub const DARK_GREEN: Self = Self::rgb(0x00, 0x64, 0x00);

    /// Opaque color from components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(text: &str) -> Result<Self> {
        let hex = text.trim().trim_start_matches('#');
        let bad = || Error::InvalidOption(format!("invalid color: {text:?}"));
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| bad());
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16).ok_or_else(bad)?;
                    #[allow(clippy::cast_possible_truncation)]
                    let v = v as u8;
                    *slot = v * 16 + v;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
            )),
            8 => Ok(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: byte(&hex[6..8])?,
            }),
            _ => Err(bad()),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::rgb(255, 255, 255));
        assert_eq!(Color::from_hex("4682b4").unwrap(), Color::STEEL_BLUE);
        assert_eq!(
            Color::from_hex("#4682b480").unwrap(),
            Color::STEEL_BLUE.with_alpha(0x80)
        );
        assert!(Color::from_hex("#12").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let c = Color::rgb(1, 2, 3).with_alpha(4);
        assert_eq!(c.to_string(), "#01020304");
        assert_eq!(c.to_string().parse::<Color>().unwrap(), c);
    }
}
