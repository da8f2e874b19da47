//! Owned image buffers.
//!
//! An [`Image`] stores its pixels in one of three layouts, fixed at
//! construction:
//!
//! - 8-bit direct ([`Image::new_empty`], [`Image::new_rgb`])
//! - wide direct, 16-bit or float samples ([`Image::new_wide`])
//! - paletted, one byte index per pixel ([`Image::new_paletted`])
//!
//! All three are reached through [`RasterImage`].
//!
//! # Memory Layout
//!
//! Direct samples are row-major and interleaved, top row first:
//!
//! ```text
//! sample(x, y, c) = (x + y * width) * channels + c
//! ```
//!
//! Every access goes through one bounds-checked offset computation, so a bad
//! coordinate can only produce a failed read or write.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Color, Image, RasterImage};
//!
//! let mut img = Image::new_rgb(8, 8).unwrap();
//! assert!(img.put_pixel(3, 4, &Color::new(10, 20, 30, 0)));
//! assert_eq!(img.get_pixel(3, 4), Some(Color::new(10, 20, 30, 0)));
//! assert_eq!(img.get_pixel(8, 0), None);
//! ```

use tracing::{trace, warn};

use crate::color::{sample_to_float, sample_to_int, Color, FloatColor, MAX_CHANNELS};
use crate::depth::{SampleDepth, WideBuffer};
use crate::error::{alloc_error, RasterError, Result};
use crate::palette::Palette;
use crate::raster::{
    default_get_samples, read_span, span_len, writable_channels, write_span, RasterImage,
    Representation, ALL_CHANNELS,
};
use crate::tags::TagList;

#[derive(Debug)]
enum Pixels {
    Direct8(Vec<u8>),
    Wide(WideBuffer),
    Paletted { indices: Vec<u8>, palette: Palette },
}

/// An owned image with its pixel storage and tag list.
#[derive(Debug)]
pub struct Image {
    width: u32,
    height: u32,
    channels: usize,
    channel_mask: u32,
    pixels: Pixels,
    tags: TagList,
}

/// Checks channel count and extents, returning the pixel count.
fn pixel_count(width: u32, height: u32, channels: usize) -> Result<usize> {
    if !(1..=MAX_CHANNELS).contains(&channels) {
        return Err(RasterError::InvalidChannels(channels));
    }
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(RasterError::invalid_dimensions(
            width,
            height,
            "extent exceeds coordinate range",
        ));
    }
    let count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| RasterError::invalid_dimensions(width, height, "pixel count overflows"))?;
    count
        .checked_mul(channels)
        .ok_or_else(|| RasterError::invalid_dimensions(width, height, "sample count overflows"))?;
    Ok(count)
}

/// Allocates a zero-filled buffer, reporting failure instead of aborting.
fn zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| alloc_error(len.saturating_mul(std::mem::size_of::<T>()), e))?;
    buf.resize(len, T::default());
    Ok(buf)
}

impl Image {
    fn with_pixels(width: u32, height: u32, channels: usize, pixels: Pixels) -> Self {
        trace!(width, height, channels, "image::new");
        Self {
            width,
            height,
            channels,
            channel_mask: ALL_CHANNELS,
            pixels,
            tags: TagList::new(),
        }
    }

    /// Creates a zeroed 8-bit direct image.
    ///
    /// # Errors
    ///
    /// - [`RasterError::InvalidChannels`] unless `channels` is in `1..=4`
    /// - [`RasterError::InvalidDimensions`] if the buffer size overflows
    /// - [`RasterError::AllocationFailed`] if the buffer cannot be allocated
    pub fn new_empty(width: u32, height: u32, channels: usize) -> Result<Self> {
        let count = pixel_count(width, height, channels)?;
        let data = zeroed(count * channels)?;
        Ok(Self::with_pixels(width, height, channels, Pixels::Direct8(data)))
    }

    /// Creates a zeroed 3-channel 8-bit image.
    pub fn new_rgb(width: u32, height: u32) -> Result<Self> {
        Self::new_empty(width, height, 3)
    }

    /// Creates a zeroed direct image with the given sample depth.
    ///
    /// [`SampleDepth::U8`] gives the same image as [`Image::new_empty`].
    pub fn new_wide(width: u32, height: u32, channels: usize, depth: SampleDepth) -> Result<Self> {
        let count = pixel_count(width, height, channels)?;
        let len = count * channels;
        let buf = match depth {
            SampleDepth::U8 => return Self::new_empty(width, height, channels),
            SampleDepth::U16 => WideBuffer::U16(zeroed(len)?),
            SampleDepth::F16 => WideBuffer::F16(zeroed(len)?),
            SampleDepth::F32 => WideBuffer::F32(zeroed(len)?),
        };
        Ok(Self::with_pixels(width, height, channels, Pixels::Wide(buf)))
    }

    /// Creates a paletted image with an empty palette of up to `max_colors`
    /// entries.
    ///
    /// Every index starts at 0, so pixels read as `None` until the palette
    /// has at least one entry.
    ///
    /// # Errors
    ///
    /// As [`Image::new_empty`], plus [`RasterError::InvalidPalette`] unless
    /// `max_colors` is in `1..=256`.
    pub fn new_paletted(
        width: u32,
        height: u32,
        channels: usize,
        max_colors: usize,
    ) -> Result<Self> {
        let count = pixel_count(width, height, channels)?;
        let palette = Palette::new(max_colors, channels)?;
        let indices = zeroed(count)?;
        Ok(Self::with_pixels(
            width,
            height,
            channels,
            Pixels::Paletted { indices, palette },
        ))
    }

    /// Releases tags and pixel storage, leaving a 0x0 image.
    ///
    /// Calling it again does nothing.
    pub fn release(&mut self) {
        if self.width == 0 && self.height == 0 && self.tags.is_empty() {
            return;
        }
        trace!(width = self.width, height = self.height, "image::release");
        self.tags.clear();
        self.pixels = Pixels::Direct8(Vec::new());
        self.width = 0;
        self.height = 0;
    }

    /// The palette, for paletted images.
    pub fn palette(&self) -> Option<&Palette> {
        match &self.pixels {
            Pixels::Paletted { palette, .. } => Some(palette),
            _ => None,
        }
    }

    /// Offset of pixel `(x, y)` counted in pixels, `None` outside the image.
    ///
    /// This is the only place coordinates become buffer positions.
    #[inline]
    fn pixel_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Pixel offset and length of a span, after clipping.
    #[inline]
    fn span(&self, left: i32, right: i32, y: i32, capacity: usize) -> Option<(usize, usize)> {
        let n = span_len(self.width, self.height, left, right, y, capacity);
        if n == 0 {
            return None;
        }
        self.pixel_offset(left, y).map(|at| (at, n))
    }

    /// Hides channels the image does not have.
    #[inline]
    fn trim(&self, mut color: Color) -> Color {
        color.0[self.channels..].fill(0);
        color
    }
}

impl RasterImage for Image {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn channel_mask(&self) -> u32 {
        self.channel_mask
    }

    fn set_channel_mask(&mut self, mask: u32) {
        self.channel_mask = mask;
    }

    fn depth(&self) -> SampleDepth {
        match &self.pixels {
            Pixels::Wide(buf) => buf.depth(),
            _ => SampleDepth::U8,
        }
    }

    fn representation(&self) -> Representation {
        match &self.pixels {
            Pixels::Paletted { .. } => Representation::Paletted,
            _ => Representation::Direct,
        }
    }

    fn tags(&self) -> &TagList {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut TagList {
        &mut self.tags
    }

    fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        let at = self.pixel_offset(x, y)?;
        let n = self.channels;
        let mut color = Color::default();
        match &self.pixels {
            Pixels::Direct8(data) => {
                color.0[..n].copy_from_slice(data.get(at * n..at * n + n)?);
            }
            Pixels::Wide(buf) => {
                for ch in 0..n {
                    color.0[ch] = sample_to_int(buf.get(at * n + ch)?);
                }
            }
            Pixels::Paletted { indices, palette } => {
                color = self.trim(palette.color(*indices.get(at)?)?);
            }
        }
        Some(color)
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: &Color) -> bool {
        let Some(at) = self.pixel_offset(x, y) else {
            return false;
        };
        let (n, mask) = (self.channels, self.channel_mask);
        match &mut self.pixels {
            Pixels::Direct8(data) => {
                for ch in writable_channels(n, mask) {
                    data[at * n + ch] = color.0[ch];
                }
                true
            }
            Pixels::Wide(buf) => {
                for ch in writable_channels(n, mask) {
                    buf.set(at * n + ch, sample_to_float(color.0[ch]));
                }
                true
            }
            Pixels::Paletted { indices, palette } => {
                let mut merged = palette.color(indices[at]).unwrap_or_default();
                for ch in writable_channels(n, mask) {
                    merged.0[ch] = color.0[ch];
                }
                match palette.find_or_add(&merged) {
                    Some(index) => {
                        indices[at] = index;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn get_line(&self, left: i32, right: i32, y: i32, out: &mut [Color]) -> usize {
        let Some((at, n)) = self.span(left, right, y, out.len()) else {
            return 0;
        };
        match &self.pixels {
            Pixels::Direct8(data) => {
                let ch = self.channels;
                let row = &data[at * ch..(at + n) * ch];
                for (slot, px) in out.iter_mut().zip(row.chunks_exact(ch)) {
                    *slot = Color::default();
                    slot.0[..ch].copy_from_slice(px);
                }
                n
            }
            _ => read_span(n, out, |i| self.get_pixel(left + i as i32, y)),
        }
    }

    fn put_line(&mut self, left: i32, right: i32, y: i32, colors: &[Color]) -> usize {
        let Some((at, n)) = self.span(left, right, y, colors.len()) else {
            return 0;
        };
        let (ch, mask) = (self.channels, self.channel_mask);
        if let Pixels::Direct8(data) = &mut self.pixels {
            let row = &mut data[at * ch..(at + n) * ch];
            for (px, color) in row.chunks_exact_mut(ch).zip(colors) {
                for c in writable_channels(ch, mask) {
                    px[c] = color.0[c];
                }
            }
            return n;
        }
        write_span(n, colors, |i, c| self.put_pixel(left + i as i32, y, c))
    }

    fn get_pixel_f(&self, x: i32, y: i32) -> Option<FloatColor> {
        match &self.pixels {
            Pixels::Wide(buf) => {
                let at = self.pixel_offset(x, y)?;
                let n = self.channels;
                let mut color = FloatColor::default();
                for ch in 0..n {
                    color.0[ch] = buf.get(at * n + ch)?;
                }
                Some(color)
            }
            _ => self.get_pixel(x, y).map(FloatColor::from),
        }
    }

    fn put_pixel_f(&mut self, x: i32, y: i32, color: &FloatColor) -> bool {
        let Some(at) = self.pixel_offset(x, y) else {
            return false;
        };
        let (n, mask) = (self.channels, self.channel_mask);
        if let Pixels::Wide(buf) = &mut self.pixels {
            for ch in writable_channels(n, mask) {
                buf.set(at * n + ch, color.0[ch]);
            }
            return true;
        }
        self.put_pixel(x, y, &Color::from(*color))
    }

    fn get_samples(
        &self,
        left: i32,
        right: i32,
        y: i32,
        chans: Option<&[usize]>,
        out: &mut [u8],
    ) -> Result<usize> {
        // whole direct pixels are a straight copy
        if let (Pixels::Direct8(data), None) = (&self.pixels, chans) {
            let ch = self.channels;
            let Some((at, n)) = self.span(left, right, y, out.len() / ch) else {
                return Ok(0);
            };
            out[..n * ch].copy_from_slice(&data[at * ch..(at + n) * ch]);
            return Ok(n * ch);
        }
        default_get_samples(self, left, right, y, chans, out)
    }

    fn get_indices(&self, left: i32, right: i32, y: i32, out: &mut [u8]) -> usize {
        let Pixels::Paletted { indices, .. } = &self.pixels else {
            return 0;
        };
        let Some((at, n)) = self.span(left, right, y, out.len()) else {
            return 0;
        };
        out[..n].copy_from_slice(&indices[at..at + n]);
        n
    }

    fn put_indices(&mut self, left: i32, right: i32, y: i32, src: &[u8]) -> usize {
        let Some((at, n)) = self.span(left, right, y, src.len()) else {
            return 0;
        };
        let Pixels::Paletted { indices, palette } = &mut self.pixels else {
            return 0;
        };
        let count = palette.color_count();
        if let Some(&bad) = src[..n].iter().find(|&&i| i as usize >= count) {
            warn!(index = bad, count, "put_indices: index outside palette");
            return 0;
        }
        indices[at..at + n].copy_from_slice(&src[..n]);
        n
    }

    fn add_colors(&mut self, colors: &[Color]) -> Option<usize> {
        match &mut self.pixels {
            Pixels::Paletted { palette, .. } => palette.add_colors(colors),
            _ => None,
        }
    }

    fn get_colors(&self, index: usize, out: &mut [Color]) -> bool {
        self.palette().is_some_and(|p| p.get_colors(index, out))
    }

    fn set_colors(&mut self, index: usize, colors: &[Color]) -> bool {
        match &mut self.pixels {
            Pixels::Paletted { palette, .. } => palette.set_colors(index, colors),
            _ => false,
        }
    }

    fn color_count(&self) -> Option<usize> {
        self.palette().map(Palette::color_count)
    }

    fn max_colors(&self) -> Option<usize> {
        self.palette().map(Palette::max_colors)
    }

    fn find_color(&self, color: &Color) -> Option<u8> {
        self.palette().and_then(|p| p.find_color(color))
    }

    fn same_type(&self, width: u32, height: u32) -> Result<Image> {
        match &self.pixels {
            Pixels::Direct8(_) => Image::new_empty(width, height, self.channels),
            Pixels::Wide(buf) => Image::new_wide(width, height, self.channels, buf.depth()),
            Pixels::Paletted { palette, .. } => {
                let mut img = Image::new_paletted(width, height, self.channels, palette.max_colors())?;
                if palette.color_count() > 0 {
                    img.add_colors(palette.as_slice());
                }
                Ok(img)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_empty_rejects_channels() {
        assert!(matches!(
            Image::new_empty(2, 2, 0),
            Err(RasterError::InvalidChannels(0))
        ));
        assert!(matches!(
            Image::new_empty(2, 2, 5),
            Err(RasterError::InvalidChannels(5))
        ));
    }

    #[test]
    fn test_new_empty_rejects_huge_extent() {
        let err = Image::new_empty(u32::MAX, 1, 1).unwrap_err();
        assert!(matches!(err, RasterError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_new_empty_is_zeroed() {
        let img = Image::new_empty(3, 2, 4).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(img.get_pixel(x, y), Some(Color::default()));
            }
        }
        assert_eq!(img.representation(), Representation::Direct);
        assert_eq!(img.depth(), SampleDepth::U8);
        assert!(!img.is_virtual());
    }

    #[test]
    fn test_put_get_round_trip() {
        let mut img = Image::new_empty(4, 4, 4).unwrap();
        let c = Color::new(1, 2, 3, 4);
        assert!(img.put_pixel(3, 3, &c));
        assert_eq!(img.get_pixel(3, 3), Some(c));
        assert!(!img.put_pixel(4, 0, &c));
        assert!(!img.put_pixel(-1, 0, &c));
    }

    #[test]
    fn test_read_zeroes_missing_channels() {
        let mut img = Image::new_empty(1, 1, 2).unwrap();
        img.put_pixel(0, 0, &Color::new(7, 8, 9, 10));
        assert_eq!(img.get_pixel(0, 0), Some(Color::new(7, 8, 0, 0)));
    }

    #[test]
    fn test_mask_is_partial_write() {
        let mut img = Image::new_empty(1, 1, 3).unwrap();
        img.put_pixel(0, 0, &Color::new(10, 20, 30, 0));
        img.set_channel_mask(0b101);
        img.put_pixel(0, 0, &Color::new(99, 99, 99, 0));
        assert_eq!(img.get_pixel(0, 0), Some(Color::new(99, 20, 99, 0)));
    }

    #[test]
    fn test_line_clipping() {
        let mut img = Image::new_empty(4, 2, 1).unwrap();
        let row = [Color::gray(5); 6];
        assert_eq!(img.put_line(1, 10, 1, &row), 3);
        assert_eq!(img.put_line(4, 10, 1, &row), 0);
        assert_eq!(img.put_line(-1, 3, 1, &row), 0);

        let mut out = [Color::default(); 8];
        assert_eq!(img.get_line(0, 4, 1, &mut out), 4);
        assert_eq!(out[0].0[0], 0);
        assert_eq!(out[1].0[0], 5);
        assert_eq!(out[3].0[0], 5);
        assert_eq!(img.get_line(0, 4, 2, &mut out), 0);
    }

    #[test]
    fn test_line_respects_mask() {
        let mut img = Image::new_empty(2, 1, 2).unwrap();
        img.set_channel_mask(0b10);
        img.put_line(0, 2, 0, &[Color::new(1, 2, 0, 0), Color::new(3, 4, 0, 0)]);
        let mut out = [Color::default(); 2];
        img.get_line(0, 2, 0, &mut out);
        assert_eq!(out, [Color::new(0, 2, 0, 0), Color::new(0, 4, 0, 0)]);
    }

    #[test]
    fn test_samples_subset() {
        let mut img = Image::new_empty(2, 1, 3).unwrap();
        img.put_pixel(0, 0, &Color::new(1, 2, 3, 0));
        img.put_pixel(1, 0, &Color::new(4, 5, 6, 0));

        let mut out = [0u8; 6];
        assert_eq!(img.get_samples(0, 2, 0, None, &mut out).unwrap(), 6);
        assert_eq!(out, [1, 2, 3, 4, 5, 6]);

        let mut out = [0u8; 4];
        assert_eq!(img.get_samples(0, 2, 0, Some(&[2, 0]), &mut out).unwrap(), 4);
        assert_eq!(out, [3, 1, 6, 4]);
    }

    #[test]
    fn test_wide_keeps_precision() {
        let mut img = Image::new_wide(2, 2, 3, SampleDepth::F32).unwrap();
        assert_eq!(img.depth(), SampleDepth::F32);
        let c = FloatColor::new(0.1, 1.5, -0.25, 0.0);
        assert!(img.put_pixel_f(1, 1, &c));
        let back = img.get_pixel_f(1, 1).unwrap();
        assert_relative_eq!(back.0[0], 0.1, epsilon = 1e-6);
        assert_relative_eq!(back.0[1], 1.5, epsilon = 1e-6);
        assert_relative_eq!(back.0[2], -0.25, epsilon = 1e-6);

        // 8-bit view clamps
        assert_eq!(img.get_pixel(1, 1), Some(Color::new(26, 255, 0, 0)));
    }

    #[test]
    fn test_wide_u16_round_trip_8bit() {
        let mut img = Image::new_wide(1, 1, 4, SampleDepth::U16).unwrap();
        let c = Color::new(0, 1, 128, 255);
        img.put_pixel(0, 0, &c);
        assert_eq!(img.get_pixel(0, 0), Some(c));
    }

    #[test]
    fn test_new_wide_u8_is_direct8() {
        let img = Image::new_wide(1, 1, 1, SampleDepth::U8).unwrap();
        assert_eq!(img.depth(), SampleDepth::U8);
    }

    #[test]
    fn test_direct_has_no_palette() {
        let mut img = Image::new_rgb(2, 2).unwrap();
        assert_eq!(img.add_colors(&[Color::gray(1)]), None);
        assert_eq!(img.color_count(), None);
        assert_eq!(img.max_colors(), None);
        assert_eq!(img.put_indices(0, 2, 0, &[0, 0]), 0);
    }

    #[test]
    fn test_paletted_pixels() {
        let mut img = Image::new_paletted(2, 2, 3, 2).unwrap();
        assert_eq!(img.representation(), Representation::Paletted);
        assert_eq!(img.get_pixel(0, 0), None);

        let red = Color::new(255, 0, 0, 0);
        let blue = Color::new(0, 0, 255, 0);
        assert!(img.put_pixel(0, 0, &red));
        assert!(img.put_pixel(1, 0, &blue));
        assert!(img.put_pixel(0, 1, &red));
        assert_eq!(img.color_count(), Some(2));
        assert!(!img.put_pixel(1, 1, &Color::gray(3)));

        let mut idx = [9u8; 2];
        assert_eq!(img.get_indices(0, 2, 0, &mut idx), 2);
        assert_eq!(idx, [0, 1]);
        assert_eq!(img.find_color(&blue), Some(1));
    }

    #[test]
    fn test_put_indices_rejects_invalid() {
        let mut img = Image::new_paletted(3, 1, 1, 4).unwrap();
        img.add_colors(&[Color::gray(0), Color::gray(100)]).unwrap();
        assert_eq!(img.put_indices(0, 3, 0, &[0, 2, 1]), 0);
        assert_eq!(img.put_indices(0, 3, 0, &[1, 0, 1]), 3);
        assert_eq!(img.get_pixel(2, 0), Some(Color::new(100, 0, 0, 0)));
    }

    #[test]
    fn test_same_type_carries_palette() {
        let mut img = Image::new_paletted(2, 2, 3, 16).unwrap();
        img.add_colors(&[Color::gray(1), Color::gray(2)]).unwrap();
        let other = img.same_type(5, 1).unwrap();
        assert_eq!(other.width(), 5);
        assert_eq!(other.max_colors(), Some(16));
        assert_eq!(other.color_count(), Some(2));

        let wide = Image::new_wide(1, 1, 2, SampleDepth::F16).unwrap();
        assert_eq!(wide.same_type(3, 3).unwrap().depth(), SampleDepth::F16);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut img = Image::new_rgb(4, 4).unwrap();
        img.tags_mut().add_int(Some("dpi"), 1, 72).unwrap();
        img.release();
        assert_eq!((img.width(), img.height()), (0, 0));
        assert!(img.tags().is_empty());
        assert_eq!(img.get_pixel(0, 0), None);
        img.release();
        assert_eq!(img.width(), 0);
    }
}
