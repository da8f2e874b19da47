//! The pixel access contract shared by every image representation.
//!
//! [`RasterImage`] is the capability table. Owned [`Image`]s implement it for
//! 8-bit direct, wide direct and paletted storage; [`VirtualImage`] implements
//! it by forwarding to another image. Engine operations are written against
//! this trait only, so they never see the storage layout.
//!
//! # Spans
//!
//! Line operations take a half-open span `[left, right)` on row `y`:
//!
//! - `y` must be inside the image and `left` must be in `[0, width)`,
//!   otherwise nothing is transferred
//! - `right` is clamped to `width`
//! - the transfer is further limited by the caller's buffer length
//!
//! The returned count lets callers detect clipping. [`span_len`] implements
//! these rules for implementors.
//!
//! # Sample depth
//!
//! Both the 8-bit and the float accessors work on every image. Implementors
//! only have to provide the 8-bit ones: the float defaults convert through
//! [`sample_to_float`](crate::color::sample_to_float) and
//! [`sample_to_int`](crate::color::sample_to_int). Wide images override them
//! to keep their precision.
//!
//! [`Image`]: crate::Image
//! [`VirtualImage`]: crate::VirtualImage

use std::fmt;

use tracing::warn;

use crate::color::{Color, FloatColor, MAX_CHANNELS};
use crate::depth::SampleDepth;
use crate::error::{RasterError, Result};
use crate::image::Image;
use crate::tags::TagList;

/// Mask with every channel writable.
pub const ALL_CHANNELS: u32 = u32::MAX;

/// How pixel values are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// One sample per channel per pixel.
    Direct,
    /// One palette index per pixel.
    Paletted,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Paletted => write!(f, "paletted"),
        }
    }
}

/// Basic geometry of an image, as reported to host bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Samples per pixel
    pub channels: usize,
    /// Write mask, bit `c` enables channel `c`
    pub channel_mask: u32,
}

/// Number of pixels a span operation transfers.
///
/// `capacity` is the number of pixels the caller's buffer can hold.
pub fn span_len(width: u32, height: u32, left: i32, right: i32, y: i32, capacity: usize) -> usize {
    if y < 0 || y as u32 >= height || left < 0 || left as u32 >= width {
        return 0;
    }
    let right = right.clamp(0, i32::MAX) as u32;
    let right = right.min(width);
    let left = left as u32;
    if right <= left {
        return 0;
    }
    ((right - left) as usize).min(capacity)
}

/// Reads a span pixel by pixel, stopping at the first failed read.
pub(crate) fn read_span<T>(
    n: usize,
    out: &mut [T],
    mut fetch: impl FnMut(usize) -> Option<T>,
) -> usize {
    for (i, slot) in out.iter_mut().take(n).enumerate() {
        match fetch(i) {
            Some(v) => *slot = v,
            None => return i,
        }
    }
    n
}

/// Writes a span pixel by pixel, stopping at the first failed write.
pub(crate) fn write_span<T>(n: usize, src: &[T], mut store: impl FnMut(usize, &T) -> bool) -> usize {
    for (i, v) in src.iter().take(n).enumerate() {
        if !store(i, v) {
            return i;
        }
    }
    n
}

/// Shared body of the sample readers: validates `chans` and fans each
/// fetched pixel out into `out`.
#[allow(clippy::too_many_arguments)]
fn read_samples<T: Copy>(
    width: u32,
    height: u32,
    channels: usize,
    left: i32,
    right: i32,
    y: i32,
    chans: Option<&[usize]>,
    out: &mut [T],
    mut fetch: impl FnMut(i32) -> Option<[T; MAX_CHANNELS]>,
) -> Result<usize> {
    const ALL: [usize; MAX_CHANNELS] = [0, 1, 2, 3];
    let chans = match chans {
        Some(list) => {
            if let Some(&bad) = list.iter().find(|&&ch| ch >= channels) {
                warn!(channel = bad, channels, "get_samples: no such channel");
                return Err(RasterError::NoChannel {
                    channel: bad,
                    channels,
                });
            }
            list
        }
        None => &ALL[..channels.min(MAX_CHANNELS)],
    };
    if chans.is_empty() {
        return Ok(0);
    }

    let n = span_len(width, height, left, right, y, out.len() / chans.len());
    let mut written = 0;
    for i in 0..n {
        let Some(px) = fetch(left + i as i32) else {
            break;
        };
        for &ch in chans {
            out[written] = px[ch];
            written += 1;
        }
    }
    Ok(written)
}

/// [`RasterImage::get_samples`] in terms of `get_pixel`.
pub(crate) fn default_get_samples<I: RasterImage + ?Sized>(
    img: &I,
    left: i32,
    right: i32,
    y: i32,
    chans: Option<&[usize]>,
    out: &mut [u8],
) -> Result<usize> {
    read_samples(
        img.width(),
        img.height(),
        img.channels(),
        left,
        right,
        y,
        chans,
        out,
        |x| img.get_pixel(x, y).map(|c| c.0),
    )
}

/// Uniform pixel access over every image representation.
///
/// Out-of-range geometry is never an error: reads return `None`, writes
/// return `false`, span operations return a short count.
pub trait RasterImage {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Samples per pixel, `1..=4`.
    fn channels(&self) -> usize;

    /// Current write mask.
    fn channel_mask(&self) -> u32;

    /// Sets the write mask. Only the low `channels` bits matter.
    fn set_channel_mask(&mut self, mask: u32);

    /// Storage depth of each sample.
    fn depth(&self) -> SampleDepth;

    /// Direct or paletted.
    fn representation(&self) -> Representation;

    /// `true` for images that forward every operation to another image.
    fn is_virtual(&self) -> bool {
        false
    }

    /// Attached metadata.
    fn tags(&self) -> &TagList;

    /// Attached metadata, mutable.
    fn tags_mut(&mut self) -> &mut TagList;

    /// Reads one pixel. Channels past [`channels`](Self::channels) are zero.
    fn get_pixel(&self, x: i32, y: i32) -> Option<Color>;

    /// Writes the unmasked channels of one pixel.
    fn put_pixel(&mut self, x: i32, y: i32, color: &Color) -> bool;

    /// Reads a span into `out`, returning the number of pixels read.
    fn get_line(&self, left: i32, right: i32, y: i32, out: &mut [Color]) -> usize {
        let n = span_len(self.width(), self.height(), left, right, y, out.len());
        read_span(n, out, |i| self.get_pixel(left + i as i32, y))
    }

    /// Writes a span from `colors`, returning the number of pixels written.
    fn put_line(&mut self, left: i32, right: i32, y: i32, colors: &[Color]) -> usize {
        let n = span_len(self.width(), self.height(), left, right, y, colors.len());
        write_span(n, colors, |i, c| self.put_pixel(left + i as i32, y, c))
    }

    /// Float-domain [`get_pixel`](Self::get_pixel).
    fn get_pixel_f(&self, x: i32, y: i32) -> Option<FloatColor> {
        self.get_pixel(x, y).map(FloatColor::from)
    }

    /// Float-domain [`put_pixel`](Self::put_pixel).
    fn put_pixel_f(&mut self, x: i32, y: i32, color: &FloatColor) -> bool {
        self.put_pixel(x, y, &Color::from(*color))
    }

    /// Float-domain [`get_line`](Self::get_line).
    fn get_line_f(&self, left: i32, right: i32, y: i32, out: &mut [FloatColor]) -> usize {
        let n = span_len(self.width(), self.height(), left, right, y, out.len());
        read_span(n, out, |i| self.get_pixel_f(left + i as i32, y))
    }

    /// Float-domain [`put_line`](Self::put_line).
    fn put_line_f(&mut self, left: i32, right: i32, y: i32, colors: &[FloatColor]) -> usize {
        let n = span_len(self.width(), self.height(), left, right, y, colors.len());
        write_span(n, colors, |i, c| self.put_pixel_f(left + i as i32, y, c))
    }

    /// Reads a channel subset of a span, packed per pixel.
    ///
    /// `chans` lists the channels to read in output order; `None` reads all
    /// of them. Returns the number of samples written.
    ///
    /// # Errors
    ///
    /// [`RasterError::NoChannel`] if any requested channel does not exist.
    fn get_samples(
        &self,
        left: i32,
        right: i32,
        y: i32,
        chans: Option<&[usize]>,
        out: &mut [u8],
    ) -> Result<usize> {
        default_get_samples(self, left, right, y, chans, out)
    }

    /// Float-domain [`get_samples`](Self::get_samples).
    fn get_samples_f(
        &self,
        left: i32,
        right: i32,
        y: i32,
        chans: Option<&[usize]>,
        out: &mut [f64],
    ) -> Result<usize> {
        read_samples(
            self.width(),
            self.height(),
            self.channels(),
            left,
            right,
            y,
            chans,
            out,
            |x| self.get_pixel_f(x, y).map(|c| c.0),
        )
    }

    /// Reads palette indices for a span. Direct images transfer nothing.
    fn get_indices(&self, _left: i32, _right: i32, _y: i32, _out: &mut [u8]) -> usize {
        0
    }

    /// Writes palette indices for a span. Direct images transfer nothing.
    fn put_indices(&mut self, _left: i32, _right: i32, _y: i32, _indices: &[u8]) -> usize {
        0
    }

    /// Appends palette entries, returning the index of the first.
    fn add_colors(&mut self, _colors: &[Color]) -> Option<usize> {
        None
    }

    /// Copies palette entries starting at `index` into `out`.
    fn get_colors(&self, _index: usize, _out: &mut [Color]) -> bool {
        false
    }

    /// Overwrites palette entries starting at `index`.
    fn set_colors(&mut self, _index: usize, _colors: &[Color]) -> bool {
        false
    }

    /// Palette entries in use, `None` for direct images.
    fn color_count(&self) -> Option<usize> {
        None
    }

    /// Palette capacity, `None` for direct images.
    fn max_colors(&self) -> Option<usize> {
        None
    }

    /// Index of the palette entry matching `color`.
    fn find_color(&self, _color: &Color) -> Option<u8> {
        None
    }

    /// Creates an empty image with this image's representation, depth and
    /// channel count. Paletted images carry their palette over.
    fn same_type(&self, width: u32, height: u32) -> Result<Image>;

    /// Width, height, channels and mask in one value.
    fn image_info(&self) -> ImageInfo {
        ImageInfo {
            width: self.width(),
            height: self.height(),
            channels: self.channels(),
            channel_mask: self.channel_mask(),
        }
    }

    /// `true` if `(x, y)` addresses a pixel.
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Like [`get_pixel`](Self::get_pixel), but out of range is an error.
    fn pixel(&self, x: i32, y: i32) -> Result<Color> {
        self.get_pixel(x, y)
            .ok_or_else(|| RasterError::out_of_bounds(x, y, self.width(), self.height()))
    }

    /// One channel of one pixel in the float domain.
    fn get_channel_f(&self, x: i32, y: i32, ch: usize) -> Option<f64> {
        if ch >= self.channels() {
            return None;
        }
        self.get_pixel_f(x, y).map(|c| c.0[ch])
    }
}

/// Channels of a `channels`-wide pixel that `mask` lets a write touch.
#[inline]
pub(crate) fn writable_channels(channels: usize, mask: u32) -> impl Iterator<Item = usize> {
    (0..channels.min(MAX_CHANNELS)).filter(move |&ch| mask & (1 << ch) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len_clamps_right() {
        assert_eq!(span_len(10, 5, 2, 100, 0, usize::MAX), 8);
        assert_eq!(span_len(10, 5, 2, 6, 4, usize::MAX), 4);
        assert_eq!(span_len(10, 5, 2, 6, 4, 3), 3);
    }

    #[test]
    fn test_span_len_rejects_bad_origin() {
        assert_eq!(span_len(10, 5, -1, 5, 0, 10), 0);
        assert_eq!(span_len(10, 5, 10, 12, 0, 10), 0);
        assert_eq!(span_len(10, 5, 0, 5, 5, 10), 0);
        assert_eq!(span_len(10, 5, 0, 5, -1, 10), 0);
        assert_eq!(span_len(10, 5, 5, 5, 0, 10), 0);
        assert_eq!(span_len(10, 5, 5, -3, 0, 10), 0);
    }

    #[test]
    fn test_writable_channels() {
        let chans: Vec<usize> = writable_channels(3, 0b101).collect();
        assert_eq!(chans, vec![0, 2]);
        assert_eq!(writable_channels(2, ALL_CHANNELS).count(), 2);
    }

    #[test]
    fn test_samples_unknown_channel() {
        let img = Image::new_empty(2, 2, 2).unwrap();
        let mut out = [0u8; 8];
        let err = img.get_samples(0, 2, 0, Some(&[0, 2]), &mut out).unwrap_err();
        assert!(matches!(err, RasterError::NoChannel { channel: 2, .. }));
    }

    #[test]
    fn test_info_and_contains() {
        let img = Image::new_empty(3, 2, 1).unwrap();
        let info = img.image_info();
        assert_eq!((info.width, info.height, info.channels), (3, 2, 1));
        assert_eq!(info.channel_mask, ALL_CHANNELS);
        assert!(img.contains(2, 1));
        assert!(!img.contains(3, 1));
        assert!(img.pixel(0, 5).unwrap_err().is_bounds_error());
    }
}
