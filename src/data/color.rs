//! Colour tokens and linear shading.
//!
//! Colours are kept in 16-bit-per-channel coordinates, the same space the
//! `#rrrrggggbbbb` tokens use, and are only narrowed to 8 bits when handed
//! to the terminal.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Raised when a colour token cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color name \"{0}\"")]
pub struct ColorError(pub String);

/// A colour in 16-bit channel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

/// Named colours accepted in configuration, as 8-bit triples.
const NAMED: &[(&str, (u8, u8, u8))] = &[
    ("black", (0x00, 0x00, 0x00)),
    ("white", (0xff, 0xff, 0xff)),
    ("red", (0xff, 0x00, 0x00)),
    ("green", (0x00, 0xff, 0x00)),
    ("blue", (0x00, 0x00, 0xff)),
    ("yellow", (0xff, 0xff, 0x00)),
    ("cyan", (0x00, 0xff, 0xff)),
    ("magenta", (0xff, 0x00, 0xff)),
    ("orange", (0xff, 0xa5, 0x00)),
    ("purple", (0xa0, 0x20, 0xf0)),
    ("pink", (0xff, 0xc0, 0xcb)),
    ("brown", (0xa5, 0x2a, 0x2a)),
    ("gray", (0xbe, 0xbe, 0xbe)),
    ("grey", (0xbe, 0xbe, 0xbe)),
    ("darkgray", (0xa9, 0xa9, 0xa9)),
    ("darkgrey", (0xa9, 0xa9, 0xa9)),
    ("lightgray", (0xd3, 0xd3, 0xd3)),
    ("lightgrey", (0xd3, 0xd3, 0xd3)),
    ("darkgreen", (0x00, 0x64, 0x00)),
    ("lightgreen", (0x90, 0xee, 0x90)),
    ("darkred", (0x8b, 0x00, 0x00)),
    ("darkblue", (0x00, 0x00, 0x8b)),
    ("lightblue", (0xad, 0xd8, 0xe6)),
    ("navy", (0x00, 0x00, 0x80)),
    ("gold", (0xff, 0xd7, 0x00)),
    ("darkorange", (0xff, 0x8c, 0x00)),
    ("violet", (0xee, 0x82, 0xee)),
    ("maroon", (0xb0, 0x30, 0x60)),
];

impl Rgb {
    pub const BLACK: Rgb = Rgb::from_rgb8(0, 0, 0);
    pub const RED: Rgb = Rgb::from_rgb8(0xff, 0, 0);

    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    /// Widen 8-bit channels by byte replication, so `ff` becomes `ffff`.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: (r as u16) * 0x101,
            g: (g as u16) * 0x101,
            b: (b as u16) * 0x101,
        }
    }

    /// Narrow to 8-bit channels for the terminal.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        ((self.r >> 8) as u8, (self.g >> 8) as u8, (self.b >> 8) as u8)
    }

    /// Resolve a colour token: a name, `#rgb`, `#rrggbb` or `#rrrrggggbbbb`.
    pub fn parse(token: &str) -> Result<Self, ColorError> {
        let token = token.trim();
        if let Some(hex) = token.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError(token.to_string()));
        }

        let wanted: String = token
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, (r, g, b))| Rgb::from_rgb8(*r, *g, *b))
            .ok_or_else(|| ColorError(token.to_string()))
    }
}

/// Split a hex body into three equal-width channels and scale each to 16 bits.
fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.is_empty() || hex.len() % 3 != 0 || hex.len() > 12 {
        return None;
    }
    let width = hex.len() / 3;
    let channel = |i: usize| -> Option<u16> {
        let digits = hex.get(i * width..(i + 1) * width)?;
        let raw = u32::from_str_radix(digits, 16).ok()?;
        // Left-align like X11 does: "#f00" is 0xf000, not 0xffff
        Some((raw << (16 - 4 * width)) as u16)
    };
    Some(Rgb::new(channel(0)?, channel(1)?, channel(2)?))
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:04x}{:04x}{:04x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        let (r, g, b) = c.to_rgb8();
        ratatui::style::Color::Rgb(r, g, b)
    }
}

/// Linear interpolation between two endpoint colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorShader {
    min: Rgb,
    max: Rgb,
}

impl ColorShader {
    pub fn new(min: Rgb, max: Rgb) -> Self {
        tracing::debug!("Shader from {} to {}", min, max);
        Self { min, max }
    }

    /// Interpolate each channel independently.
    ///
    /// `fraction` must already be clamped to `0.0..=1.0`; callers own the clamp.
    pub fn shade(&self, fraction: f64) -> Rgb {
        let lerp = |lo: u16, hi: u16| -> u16 {
            let diff = f64::from(hi) - f64::from(lo);
            (f64::from(lo) + diff * fraction) as u16
        };
        Rgb::new(
            lerp(self.min.r, self.max.r),
            lerp(self.min.g, self.max.g),
            lerp(self.min.b, self.max.b),
        )
    }

    pub fn min(&self) -> Rgb {
        self.min
    }

    pub fn max(&self) -> Rgb {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_and_hex() {
        assert_eq!(Rgb::parse("red").unwrap(), Rgb::new(0xffff, 0, 0));
        assert_eq!(Rgb::parse("Light Green").unwrap(), Rgb::parse("#90ee90").unwrap());
        assert_eq!(Rgb::parse("#80ff80").unwrap(), Rgb::new(0x8080, 0xffff, 0x8080));
        assert_eq!(Rgb::parse("#f00").unwrap(), Rgb::new(0xf000, 0, 0));
        assert_eq!(
            Rgb::parse("#123456789abc").unwrap(),
            Rgb::new(0x1234, 0x5678, 0x9abc)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgb::parse("chartreuse-ish").is_err());
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("#ggg").is_err());
        assert!(Rgb::parse("#").is_err());
    }

    #[test]
    fn test_display_is_sixteen_bit_token() {
        assert_eq!(Rgb::from_rgb8(0xff, 0, 0x80).to_string(), "#ffff00008080");
    }

    #[test]
    fn test_shade_endpoints() {
        let min = Rgb::parse("green").unwrap();
        let max = Rgb::parse("red").unwrap();
        let shader = ColorShader::new(min, max);
        assert_eq!(shader.shade(0.0), min);
        assert_eq!(shader.shade(1.0), max);
    }

    #[test]
    fn test_shade_is_monotonic_per_channel() {
        let shader = ColorShader::new(Rgb::new(0x1000, 0xf000, 0x8000), Rgb::new(0xf000, 0x1000, 0x8000));
        let mut prev = shader.shade(0.0);
        for step in 1..=100 {
            let next = shader.shade(step as f64 / 100.0);
            assert!(next.r >= prev.r, "red must not decrease");
            assert!(next.g <= prev.g, "green must not increase");
            assert_eq!(next.b, 0x8000);
            prev = next;
        }
    }

    #[test]
    fn test_shade_midpoint() {
        let shader = ColorShader::new(Rgb::new(0, 0, 0), Rgb::new(0xffff, 0x1000, 0));
        assert_eq!(shader.shade(0.5), Rgb::new(0x7fff, 0x0800, 0));
    }
}
