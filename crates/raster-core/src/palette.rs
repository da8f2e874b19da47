//! Color table for paletted images.

use crate::color::Color;
use crate::error::{RasterError, Result};

/// Largest palette a paletted image can carry; indices are one byte.
pub const MAX_PALETTE_SIZE: usize = 256;

/// An ordered color table with a fixed capacity.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
    max_colors: usize,
    channels: usize,
}

impl Palette {
    /// Creates an empty palette holding up to `max_colors` entries, compared
    /// over the first `channels` channels.
    pub fn new(max_colors: usize, channels: usize) -> Result<Self> {
        if max_colors == 0 || max_colors > MAX_PALETTE_SIZE {
            return Err(RasterError::InvalidPalette(format!(
                "palette size {max_colors} outside 1..={MAX_PALETTE_SIZE}"
            )));
        }
        let mut colors = Vec::new();
        colors
            .try_reserve_exact(max_colors)
            .map_err(|e| crate::error::alloc_error(max_colors * 4, e))?;
        Ok(Self {
            colors,
            max_colors,
            channels,
        })
    }

    /// Appends `colors`, returning the index of the first one added.
    ///
    /// Nothing is added if they don't all fit.
    pub fn add_colors(&mut self, colors: &[Color]) -> Option<usize> {
        if colors.is_empty() || self.colors.len() + colors.len() > self.max_colors {
            return None;
        }
        let first = self.colors.len();
        self.colors.extend_from_slice(colors);
        Some(first)
    }

    /// Copies `out.len()` entries starting at `index` into `out`.
    pub fn get_colors(&self, index: usize, out: &mut [Color]) -> bool {
        match self.colors.get(index..index + out.len()) {
            Some(src) => {
                out.copy_from_slice(src);
                true
            }
            None => false,
        }
    }

    /// Overwrites existing entries starting at `index`.
    pub fn set_colors(&mut self, index: usize, colors: &[Color]) -> bool {
        match self.colors.get_mut(index..index + colors.len()) {
            Some(dst) => {
                dst.copy_from_slice(colors);
                true
            }
            None => false,
        }
    }

    /// Entry at `index`.
    #[inline]
    pub fn color(&self, index: u8) -> Option<Color> {
        self.colors.get(index as usize).copied()
    }

    /// Index of the first entry equal to `color` on the palette's channels.
    pub fn find_color(&self, color: &Color) -> Option<u8> {
        self.colors
            .iter()
            .position(|c| c.matches(color, self.channels))
            .map(|i| i as u8)
    }

    /// Index of `color`, appending it if absent and there is room.
    pub fn find_or_add(&mut self, color: &Color) -> Option<u8> {
        self.find_color(color)
            .or_else(|| self.add_colors(std::slice::from_ref(color)).map(|i| i as u8))
    }

    /// Number of entries in use.
    #[inline]
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Capacity chosen at construction.
    #[inline]
    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    /// Entries in use.
    pub fn as_slice(&self) -> &[Color] {
        &self.colors
    }
}
