use rand::Rng;
use std::fmt;
use std::ops::RangeInclusive;

/// Opaque colour. Displays as a CSS `rgb(r,g,b)` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RgbColor {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl RgbColor {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel values are clamped to 0..=255 and truncated.
    pub(crate) fn from_f64(r: f64, g: f64, b: f64) -> Self {
        let c = |v: f64| v.clamp(0.0, 255.0) as u8;
        Self::new(c(r), c(g), c(b))
    }

    pub(crate) const fn opaque(self) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: 255,
        }
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Colour with straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Rgba {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl Rgba {
    pub(crate) const BLACK: Rgba = Rgba::from_hex(0x000000FF);

    /// `0xRRGGBBAA`, the layout of a CSS `#RRGGBBAA` literal.
    pub(crate) const fn from_hex(v: u32) -> Self {
        Self {
            r: (v >> 24) as u8,
            g: (v >> 16) as u8,
            b: (v >> 8) as u8,
            a: v as u8,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

/// Per-channel sampling ranges for procedurally coloured entities.
#[derive(Clone, Debug)]
pub(crate) struct ColorRanges {
    pub(crate) red: RangeInclusive<u8>,
    pub(crate) green: RangeInclusive<u8>,
    pub(crate) blue: RangeInclusive<u8>,
}

impl ColorRanges {
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RgbColor {
        RgbColor::new(
            rng.gen_range(self.red.clone()),
            rng.gen_range(self.green.clone()),
            rng.gen_range(self.blue.clone()),
        )
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, c: RgbColor) -> bool {
        self.red.contains(&c.r) && self.green.contains(&c.g) && self.blue.contains(&c.b)
    }
}
