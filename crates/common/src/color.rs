//! Hex colour strings to normalized RGBA.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Errors from parsing a hex colour string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("colour {0:?} must have 3 or 6 hex digits")]
    Length(String),
    #[error("colour {0:?} contains a non-hex digit")]
    Digit(String),
}

/// RGB colour with a separately tracked opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub rgb: Vec3,
    pub opacity: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self {
        rgb: Vec3::ONE,
        opacity: 1.0,
    };

    pub fn new(rgb: Vec3, opacity: f32) -> Self {
        Self { rgb, opacity }
    }

    /// Parse `"#rrggbb"`, `"rrggbb"`, `"#rgb"` or `"rgb"` with full opacity.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        Ok(Self {
            rgb: parse_hex(hex)?,
            opacity: 1.0,
        })
    }

    /// Replace the RGB part, keeping the current opacity.
    pub fn set_hex(&mut self, hex: &str) -> Result<(), ColorError> {
        self.rgb = parse_hex(hex)?;
        Ok(())
    }

    pub fn to_vec4(self) -> Vec4 {
        self.rgb.extend(self.opacity)
    }
}

fn parse_hex(hex: &str) -> Result<Vec3, ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::Digit(hex.to_string()));
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(ColorError::Length(hex.to_string())),
    };
    let channel = |i: usize| -> Result<f32, ColorError> {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| ColorError::Digit(hex.to_string()))
    };
    Ok(Vec3::new(channel(0)?, channel(2)?, channel(4)?))
}
