use std::{fmt, str::FromStr};

use palette::Srgb;
use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) sRGB color: 8-bit channels plus a `[0, 1]` alpha.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Channels scaled to `[r/255, g/255, b/255, a]`.
    pub fn components(self) -> [f64; 4] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
            self.a,
        ]
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` and CSS color
    /// keywords. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return parse_rgb_fn(body.strip_suffix(')')?);
        }
        if lower == "transparent" {
            return Some(Self::rgba(0, 0, 0, 0.0));
        }
        palette::named::from_str(&lower).map(|c| Self::rgb(c.red, c.green, c.blue))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color \"{s}\"")))
    }
}

/// `rgb`/`rrggbb` digits go through `palette`; a trailing alpha digit or pair is split off
/// first.
fn parse_hex(s: &str) -> Option<Color> {
    if !s.is_ascii() {
        return None;
    }
    let (rgb, alpha) = match s.len() {
        3 | 6 => (s, None),
        4 => (&s[..3], Some(u8::from_str_radix(&s[3..], 16).ok()? * 17)),
        8 => (&s[..6], Some(u8::from_str_radix(&s[6..], 16).ok()?)),
        _ => return None,
    };
    let c = Srgb::<u8>::from_str(rgb).ok()?;
    let a = alpha.map_or(1.0, |a| f64::from(a) / 255.0);
    Some(Color::rgba(c.red, c.green, c.blue, a))
}

fn parse_rgb_fn(body: &str) -> Option<Color> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    fn channel(s: &str) -> Option<u8> {
        let v = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 2.55,
            None => s.parse::<f64>().ok()?,
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    }

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(a) => a.parse::<f64>().ok()?,
        None => 1.0,
    };
    Some(Color::rgba(r, g, b, a))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
