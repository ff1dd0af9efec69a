//! RGBA color of rows and backgrounds, written as `#RRGGBBAA` in settings JSON.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SqlGisError;

/// Color representation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl FromStr for Color {
    type Err = SqlGisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s.as_bytes()).ok_or_else(|| SqlGisError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = SqlGisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r, g, b)
    }
}

impl Color {
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// RGBA channels.
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// RGB channels, as used in OpenLayers style JSON.
    pub fn to_rgb_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// `#RRGGBBAA`, the serialized form.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// CSS color string without alpha: `#rrggbb`.
    pub fn to_css_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Color from a `#RRGGBB` or `#RRGGBBAA` literal, for constants. Runtime input goes through [`FromStr`].
    ///
    /// # Panics
    ///
    /// Panics if the literal is not a valid hex color.
    pub const fn from_hex(hex: &'static str) -> Self {
        match parse_hex(hex.as_bytes()) {
            Some(color) => color,
            None => panic!("invalid color literal"),
        }
    }
}

/// Reads `#` followed by 6 or 8 hex digits, either case. Alpha defaults to opaque.
const fn parse_hex(hex: &[u8]) -> Option<Color> {
    let digits = match hex {
        [b'#', digits @ ..] if digits.len() == 6 || digits.len() == 8 => digits,
        _ => return None,
    };

    let mut channels = [255u8; 4];
    let mut i = 0;
    while i < digits.len() {
        let nibble = match digits[i] {
            d @ b'0'..=b'9' => d - b'0',
            d @ b'a'..=b'f' => d - b'a' + 10,
            d @ b'A'..=b'F' => d - b'A' + 10,
            _ => return None,
        };
        channels[i / 2] = if i % 2 == 0 {
            nibble << 4
        } else {
            channels[i / 2] | nibble
        };
        i += 1;
    }

    let [r, g, b, a] = channels;
    Some(Color::rgba(r, g, b, a))
}
