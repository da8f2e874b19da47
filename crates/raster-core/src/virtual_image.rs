//! Forwarding images.
//!
//! A [`VirtualImage`] owns no pixels. Every pixel and palette operation is
//! passed through unchanged to a backing image it borrows, which is how a
//! palette or a buffer is re-exposed without copying it. The borrow checker
//! keeps the backing image alive for as long as the forwarding image exists,
//! and dropping a [`VirtualImage`] never touches the backing storage.
//!
//! Two flavours exist:
//!
//! - [`VirtualImage::new`] borrows exclusively and forwards writes
//! - [`VirtualImage::read_only`] borrows shared; every write fails
//!
//! The forwarding image keeps its own [`TagList`], so codecs can annotate it
//! without changing the backing image.

use tracing::warn;

use crate::color::{Color, FloatColor};
use crate::depth::SampleDepth;
use crate::error::{RasterError, Result};
use crate::image::Image;
use crate::raster::{RasterImage, Representation};
use crate::tags::TagList;

enum Backing<'a> {
    Shared(&'a dyn RasterImage),
    Exclusive(&'a mut dyn RasterImage),
}

/// An image that forwards every operation to a borrowed backing image.
pub struct VirtualImage<'a> {
    backing: Backing<'a>,
    tags: TagList,
}

impl<'a> VirtualImage<'a> {
    /// Forwards reads and writes to `backing`.
    pub fn new(backing: &'a mut dyn RasterImage) -> Self {
        Self {
            backing: Backing::Exclusive(backing),
            tags: TagList::new(),
        }
    }

    /// Forwards reads to `backing`; writes fail.
    pub fn read_only(backing: &'a dyn RasterImage) -> Self {
        Self {
            backing: Backing::Shared(backing),
            tags: TagList::new(),
        }
    }

    /// `true` if writes are refused.
    pub fn is_read_only(&self) -> bool {
        matches!(self.backing, Backing::Shared(_))
    }

    /// The backing image.
    pub fn backing(&self) -> &(dyn RasterImage + 'a) {
        match &self.backing {
            Backing::Shared(img) => *img,
            Backing::Exclusive(img) => &**img,
        }
    }

    /// The backing image, mutable.
    ///
    /// # Errors
    ///
    /// [`RasterError::ReadOnly`] for a read-only forwarding image.
    pub fn backing_mut(&mut self) -> Result<&mut (dyn RasterImage + 'a)> {
        match &mut self.backing {
            Backing::Shared(_) => Err(RasterError::ReadOnly),
            Backing::Exclusive(img) => Ok(&mut **img),
        }
    }

    fn writable(&mut self) -> Option<&mut (dyn RasterImage + 'a)> {
        self.backing_mut().ok()
    }
}

impl std::fmt::Debug for VirtualImage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("channels", &self.channels())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

impl RasterImage for VirtualImage<'_> {
    fn width(&self) -> u32 {
        self.backing().width()
    }

    fn height(&self) -> u32 {
        self.backing().height()
    }

    fn channels(&self) -> usize {
        self.backing().channels()
    }

    fn channel_mask(&self) -> u32 {
        self.backing().channel_mask()
    }

    /// Ignored on a read-only view; the backing image keeps its mask.
    fn set_channel_mask(&mut self, mask: u32) {
        match self.writable() {
            Some(img) => img.set_channel_mask(mask),
            None => warn!(mask, "set_channel_mask on read-only virtual image ignored"),
        }
    }

    fn depth(&self) -> SampleDepth {
        self.backing().depth()
    }

    fn representation(&self) -> Representation {
        self.backing().representation()
    }

    fn is_virtual(&self) -> bool {
        true
    }

    fn tags(&self) -> &TagList {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut TagList {
        &mut self.tags
    }

    fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.backing().get_pixel(x, y)
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: &Color) -> bool {
        self.writable().is_some_and(|img| img.put_pixel(x, y, color))
    }

    fn get_line(&self, left: i32, right: i32, y: i32, out: &mut [Color]) -> usize {
        self.backing().get_line(left, right, y, out)
    }

    fn put_line(&mut self, left: i32, right: i32, y: i32, colors: &[Color]) -> usize {
        self.writable()
            .map_or(0, |img| img.put_line(left, right, y, colors))
    }

    fn get_pixel_f(&self, x: i32, y: i32) -> Option<FloatColor> {
        self.backing().get_pixel_f(x, y)
    }

    fn put_pixel_f(&mut self, x: i32, y: i32, color: &FloatColor) -> bool {
        self.writable().is_some_and(|img| img.put_pixel_f(x, y, color))
    }

    fn get_line_f(&self, left: i32, right: i32, y: i32, out: &mut [FloatColor]) -> usize {
        self.backing().get_line_f(left, right, y, out)
    }

    fn put_line_f(&mut self, left: i32, right: i32, y: i32, colors: &[FloatColor]) -> usize {
        self.writable()
            .map_or(0, |img| img.put_line_f(left, right, y, colors))
    }

    fn get_samples(
        &self,
        left: i32,
        right: i32,
        y: i32,
        chans: Option<&[usize]>,
        out: &mut [u8],
    ) -> Result<usize> {
        self.backing().get_samples(left, right, y, chans, out)
    }

    fn get_samples_f(
        &self,
        left: i32,
        right: i32,
        y: i32,
        chans: Option<&[usize]>,
        out: &mut [f64],
    ) -> Result<usize> {
        self.backing().get_samples_f(left, right, y, chans, out)
    }

    fn get_indices(&self, left: i32, right: i32, y: i32, out: &mut [u8]) -> usize {
        self.backing().get_indices(left, right, y, out)
    }

    fn put_indices(&mut self, left: i32, right: i32, y: i32, indices: &[u8]) -> usize {
        self.writable()
            .map_or(0, |img| img.put_indices(left, right, y, indices))
    }

    fn add_colors(&mut self, colors: &[Color]) -> Option<usize> {
        self.writable().and_then(|img| img.add_colors(colors))
    }

    fn get_colors(&self, index: usize, out: &mut [Color]) -> bool {
        self.backing().get_colors(index, out)
    }

    fn set_colors(&mut self, index: usize, colors: &[Color]) -> bool {
        self.writable()
            .is_some_and(|img| img.set_colors(index, colors))
    }

    fn color_count(&self) -> Option<usize> {
        self.backing().color_count()
    }

    fn max_colors(&self) -> Option<usize> {
        self.backing().max_colors()
    }

    fn find_color(&self, color: &Color) -> Option<u8> {
        self.backing().find_color(color)
    }

    fn same_type(&self, width: u32, height: u32) -> Result<Image> {
        self.backing().same_type(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_reads_and_writes() {
        let mut img = Image::new_rgb(4, 4).unwrap();
        {
            let mut view = VirtualImage::new(&mut img);
            assert!(view.is_virtual());
            assert_eq!(view.width(), 4);
            assert!(view.put_pixel(1, 2, &Color::new(9, 8, 7, 0)));
            assert_eq!(view.get_pixel(1, 2), Some(Color::new(9, 8, 7, 0)));
        }
        assert_eq!(img.get_pixel(1, 2), Some(Color::new(9, 8, 7, 0)));
    }

    #[test]
    fn test_read_only_refuses_writes() {
        let mut img = Image::new_rgb(2, 2).unwrap();
        img.put_pixel(0, 0, &Color::new(1, 1, 1, 0));
        let mut view = VirtualImage::read_only(&img);
        assert!(view.is_read_only());
        assert!(!view.put_pixel(0, 0, &Color::new(5, 5, 5, 0)));
        assert_eq!(view.put_line(0, 2, 0, &[Color::default(); 2]), 0);
        assert!(matches!(view.backing_mut(), Err(RasterError::ReadOnly)));
        assert_eq!(view.get_pixel(0, 0), Some(Color::new(1, 1, 1, 0)));

        view.set_channel_mask(0b001);
        assert_eq!(view.channel_mask(), img.channel_mask());
        assert_eq!(img.channel_mask(), crate::raster::ALL_CHANNELS);
    }

    #[test]
    fn test_palette_forwarding() {
        let mut img = Image::new_paletted(2, 1, 3, 8).unwrap();
        {
            let mut view = VirtualImage::new(&mut img);
            assert_eq!(view.representation(), Representation::Paletted);
            assert_eq!(view.add_colors(&[Color::gray(10), Color::gray(20)]), Some(0));
            assert_eq!(view.put_indices(0, 2, 0, &[1, 0]), 2);
            assert_eq!(view.max_colors(), Some(8));
        }
        assert_eq!(img.color_count(), Some(2));
        assert_eq!(img.get_pixel(0, 0), Some(Color::new(20, 20, 20, 0)));
    }

    #[test]
    fn test_tags_are_separate() {
        let mut img = Image::new_rgb(1, 1).unwrap();
        img.tags_mut().add_int(Some("dpi"), 1, 72).unwrap();
        let mut view = VirtualImage::new(&mut img);
        assert!(view.tags().is_empty());
        view.tags_mut().add_int(Some("page"), 2, 1).unwrap();
        drop(view);
        assert_eq!(img.tags().len(), 1);
        assert_eq!(img.width(), 1);
    }
}
