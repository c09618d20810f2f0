//! Hex colors and linear tint/shade interpolation.

use std::fmt;
use std::str::FromStr;

use crate::core::ContentError;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
        }
    }

    /// Parse `#rgb` or `#rrggbb`; the `#` is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidColor`] for anything else.
    pub fn parse(value: &str) -> Result<Self, ContentError> {
        let invalid = || ContentError::InvalidColor {
            value: value.to_string(),
        };

        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let expand = |i: usize| channel(i..i + 1).map(|n| (n << 4) | n);
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            _ => Err(invalid()),
        }
    }

    /// Linear interpolation towards `other`; `t` is clamped to `0.0..=1.0`.
    #[must_use]
    pub fn mix(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| {
            let value = f64::from(a).mul_add(1.0 - t, f64::from(b) * t);
            value.round().clamp(0.0, 255.0) as u8
        };
        Self::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }

    /// Move `amount` of the way towards white.
    #[must_use]
    pub fn lighten(self, amount: f64) -> Self {
        self.mix(Self::WHITE, amount)
    }

    /// Move `amount` of the way towards black.
    #[must_use]
    pub fn darken(self, amount: f64) -> Self {
        self.mix(Self::BLACK, amount)
    }
}

impl FromStr for Rgb {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
