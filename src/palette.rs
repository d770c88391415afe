//! Palette - Moltblox design system colors
//!
//! Colors travel through content JSON as hex strings, so parsing lives here too.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Color must have 6 or 8 hex digits, got {0:?}")]
    InvalidLength(String),

    #[error("Invalid hex digit in color {0:?}")]
    InvalidDigit(String),
}

/// 8-bit RGBA color with straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`; the leading `#` is optional
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorError::InvalidLength(hex.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(hex.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidDigit(hex.to_string()))
        };

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 255 },
        })
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Composite this color onto an opaque background.
    pub fn over(&self, background: Color) -> Color {
        let alpha = self.a as f32 / 255.0;
        let mix = |fg: u8, bg: u8| {
            (fg as f32 * alpha + bg as f32 * (1.0 - alpha)).round() as u8
        };
        Color::rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }

    /// Channels scaled to 0.0..=1.0 for the PDF color operators
    pub fn unit_rgb(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

pub const TEAL: Color = Color::rgb(0x14, 0xb8, 0xa6);
pub const TEAL_DARK: Color = Color::rgb(0x0d, 0x94, 0x88);
pub const TEAL_BG: Color = Color::rgb(0x0d, 0x3d, 0x38);
pub const CYAN: Color = Color::rgb(0x00, 0xff, 0xe5);
pub const PINK: Color = Color::rgb(0xff, 0x6e, 0xc7);
pub const AMBER: Color = Color::rgb(0xf5, 0x9e, 0x0b);
pub const CORAL: Color = Color::rgb(0xff, 0x6b, 0x6b);
pub const PURPLE: Color = Color::rgb(0xa7, 0x8b, 0xfa);
pub const GREEN: Color = Color::rgb(0x22, 0xc5, 0x5e);
pub const BLUE: Color = Color::rgb(0x3b, 0x82, 0xf6);
pub const SKY: Color = Color::rgb(0x06, 0xb6, 0xd4);
pub const DARK_BG: Color = Color::rgb(0x0a, 0x1a, 0x1a);
pub const SURFACE_MID: Color = Color::rgb(0x11, 0x18, 0x27);
pub const SURFACE_CARD: Color = Color::rgb(0x1a, 0x23, 0x32);
pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
pub const WHITE_70: Color = Color::rgb(0xb3, 0xb3, 0xb3);
pub const WHITE_40: Color = Color::rgb(0x66, 0x66, 0x66);

/// Top-right glow behind every page, TEAL_BG at 1/8 opacity
pub const GLOW: Color = Color::rgba(0x0d, 0x3d, 0x38, 0x20);
