use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A colour, expressed in RGB, CMYK or grey colour spaces.
///
/// Colours serialize as `#RRGGBB` hex strings so that report styles can be
/// written by hand in JSON.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceCMYK colour; c, m, y, and k range from 0.0 to 1.0
    CMYK { c: f32, m: f32, y: f32, k: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

#[derive(Error, Debug, PartialEq)]
#[error("invalid hex colour {0:?}, expected #RRGGBB")]
pub struct ParseColourError(pub String);

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the Gray space, g ranges from 0 to 255
    pub fn new_grey_bytes(g: u8) -> Colour {
        Colour::Grey {
            g: g as f32 / 255.0,
        }
    }

    /// Parse a `#RRGGBB` (or `RRGGBB`) hex string into an RGB colour
    pub fn from_hex(hex: &str) -> Result<Colour, ParseColourError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ParseColourError(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ParseColourError(hex.to_string()))
        };
        Ok(Colour::new_rgb_bytes(channel(0)?, channel(2)?, channel(4)?))
    }

    /// The colour as `#RRGGBB`. CMYK colours are converted naively
    pub fn to_hex(&self) -> String {
        let (r, g, b) = match *self {
            Colour::RGB { r, g, b } => (r, g, b),
            Colour::Grey { g } => (g, g, g),
            Colour::CMYK { c, m, y, k } => ((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)),
        };
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", byte(r), byte(g), byte(b))
    }
}

impl TryFrom<String> for Colour {
    type Error = ParseColourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Colour::from_hex(&value)
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.to_hex()
    }
}

/// A list of pre-defined colour constants, including the GABMA palette
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };

    /// `#1F497D`, used for title bars
    pub const PRIMARY: Colour = Colour::RGB {
        r: 31.0 / 255.0,
        g: 73.0 / 255.0,
        b: 125.0 / 255.0,
    };
    /// Section title bars
    pub const BAR_GREY: Colour = Colour::Grey { g: 230.0 / 255.0 };
    /// Titles of free-text blocks
    pub const BLOCK_GREY: Colour = Colour::Grey { g: 240.0 / 255.0 };
    /// Secondary text, e.g. the department line of a rotina
    pub const MUTED_TEXT: Colour = Colour::Grey { g: 80.0 / 255.0 };
    /// Page footers
    pub const FOOTER_TEXT: Colour = Colour::Grey { g: 120.0 / 255.0 };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() {
        let c = Colour::from_hex("#1F497D").unwrap();
        assert_eq!(c.to_hex(), "#1F497D");
        assert!(Colour::from_hex("#12345").is_err());
        assert!(Colour::from_hex("zzzzzz").is_err());
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&colours::WHITE).unwrap();
        assert_eq!(json, "\"#FFFFFF\"");
        let back: Colour = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(back.to_hex(), "#000000");
    }
}
