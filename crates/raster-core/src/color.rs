//! Color values used by the pixel access contract.
//!
//! - [`Color`] - four 8-bit channels
//! - [`FloatColor`] - four `f64` channels, conventionally in `[0, 1]`
//!
//! Both are always four channels wide. An image with fewer channels only reads
//! and writes the leading `channels` entries; the rest are ignored on write
//! and left at zero on read.
//!
//! ```
//! use raster_core::{Color, FloatColor};
//!
//! let mut c = Color::new(250, 10, 0, 255);
//! c.add_saturating(&Color::new(10, 10, 10, 10), 3);
//! assert_eq!(c, Color::new(255, 20, 10, 255));
//!
//! let f = FloatColor::from(c);
//! assert_eq!(f.0[0], 1.0);
//! ```
//!
//! # Sample conversion
//!
//! [`sample_to_float`] and [`sample_to_int`] are the only conversions between
//! the two domains. They are exact at both endpoints: `0 <-> 0.0` and
//! `255 <-> 1.0`.

use std::fmt;

/// Maximum number of channels a pixel can carry.
pub const MAX_CHANNELS: usize = 4;

/// Converts an 8-bit sample to the float domain: `v / 255`.
#[inline]
pub fn sample_to_float(v: u8) -> f64 {
    v as f64 / 255.0
}

/// Converts a float sample to 8 bits: `round(clamp(v * 255, 0, 255))`.
///
/// NaN maps to 0.
#[inline]
pub fn sample_to_int(v: f64) -> u8 {
    let scaled = v * 255.0;
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 255.0).round() as u8
}

/// An 8-bit-per-channel color, semantically RGBA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; MAX_CHANNELS]);

impl Color {
    /// Creates a color from its four channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// A gray value replicated over the color channels, opaque alpha.
    #[inline]
    pub const fn gray(v: u8) -> Self {
        Self([v, v, v, 255])
    }

    /// Overwrites every channel in place.
    #[inline]
    pub fn set(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.0 = [r, g, b, a];
    }

    /// Adds `other` into `self` over the first `channels` channels,
    /// saturating at 255.
    pub fn add_saturating(&mut self, other: &Color, channels: usize) {
        for ch in 0..channels.min(MAX_CHANNELS) {
            self.0[ch] = self.0[ch].saturating_add(other.0[ch]);
        }
    }

    /// Channel value by index.
    #[inline]
    pub fn channel(&self, ch: usize) -> u8 {
        self.0[ch]
    }

    /// Red, green and blue as a triple.
    #[inline]
    pub fn rgb(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Returns `true` if the first `channels` channels match `other`.
    #[inline]
    pub fn matches(&self, other: &Color, channels: usize) -> bool {
        let n = channels.min(MAX_CHANNELS);
        self.0[..n] == other.0[..n]
    }
}

impl From<[u8; 4]> for Color {
    fn from(v: [u8; 4]) -> Self {
        Self(v)
    }
}

impl From<FloatColor> for Color {
    fn from(c: FloatColor) -> Self {
        Self(c.0.map(sample_to_int))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "({r},{g},{b},{a})")
    }
}

/// A floating-point color, semantically RGBA, conventionally in `[0, 1]`.
///
/// No clamping is applied by any of its methods.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatColor(pub [f64; MAX_CHANNELS]);

impl FloatColor {
    /// Creates a color from its four channel values.
    #[inline]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self([r, g, b, a])
    }

    /// Overwrites every channel in place.
    #[inline]
    pub fn set(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.0 = [r, g, b, a];
    }

    /// Adds `other` into `self` over the first `channels` channels.
    pub fn add(&mut self, other: &FloatColor, channels: usize) {
        for ch in 0..channels.min(MAX_CHANNELS) {
            self.0[ch] += other.0[ch];
        }
    }

    /// Channel value by index.
    #[inline]
    pub fn channel(&self, ch: usize) -> f64 {
        self.0[ch]
    }
}

impl From<[f64; 4]> for FloatColor {
    fn from(v: [f64; 4]) -> Self {
        Self(v)
    }
}

impl From<Color> for FloatColor {
    fn from(c: Color) -> Self {
        Self(c.0.map(sample_to_float))
    }
}

impl fmt::Display for FloatColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "({r},{g},{b},{a})")
    }
}
