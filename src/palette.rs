//! Palette generator
//!
//! Colors are spaced evenly around the hue circle by community rank.

use serde::{Serialize, Serializer};
use std::fmt;

pub const SATURATION: u8 = 70;
pub const LIGHTNESS: u8 = 50;

/// Hue-saturation-lightness color (hue in degrees, the rest in percent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsl {
    pub hue: u32,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub fn new(hue: u32, saturation: u8, lightness: u8) -> Self {
        Self {
            hue: hue % 360,
            saturation: saturation.min(100),
            lightness: lightness.min(100),
        }
    }

    /// Convert to 8-bit sRGB channels
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let s = self.saturation as f64 / 100.0;
        let l = self.lightness as f64 / 100.0;
        let h = self.hue as f64 / 60.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match self.hue / 60 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl Serialize for Hsl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Color for rank `rank` out of `count` communities
pub fn color_for_rank(rank: usize, count: usize) -> Hsl {
    let hue = 360 * rank / count.max(1);
    Hsl::new(hue as u32, SATURATION, LIGHTNESS)
}

/// One color per community rank, `0..count`
pub fn palette(count: usize) -> Vec<Hsl> {
    (0..count).map(|rank| color_for_rank(rank, count)).collect()
}
