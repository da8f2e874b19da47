//! Geometric transformations: right-angle rotation, flips and coordinate
//! remapping.
//!
//! [`rotate`] and [`transform`] build a new image of the source's type;
//! [`flip`] works in place. Rotation moves whole rows through a buffer
//! picked by representation: palette indices for paletted images, float
//! colors for wide ones, 8-bit colors otherwise. Palettes and wide samples
//! therefore survive unchanged.

use raster_core::{Color, FloatColor, Image, RasterImage, Representation};
use tracing::{debug, trace, warn};

use crate::copy::transfer_pixel;
use crate::error::scratch;
use crate::{OpsError, OpsResult};

/// Axis selector for [`flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    /// Mirror left to right.
    X,
    /// Mirror top to bottom.
    Y,
    /// Both, equivalent to a 180 degree rotation in place.
    XY,
}

impl TryFrom<i32> for FlipAxis {
    type Error = OpsError;

    /// Maps the numeric axis codes `0`, `1`, `2` used by host bindings.
    fn try_from(code: i32) -> OpsResult<Self> {
        match code {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::XY),
            other => {
                warn!(axis = other, "flip: invalid axis");
                Err(OpsError::InvalidParameter(format!(
                    "flip axis must be 0, 1 or 2, got {other}"
                )))
            }
        }
    }
}

/// One image row in the most faithful form the image offers.
enum RowBuffer {
    Colors(Vec<Color>),
    Floats(Vec<FloatColor>),
    Indices(Vec<u8>),
}

impl RowBuffer {
    fn for_image(image: &dyn RasterImage) -> OpsResult<Self> {
        let width = image.width() as usize;
        Ok(match image.representation() {
            Representation::Paletted => Self::Indices(scratch(width)?),
            Representation::Direct if image.depth().is_wide() => Self::Floats(scratch(width)?),
            Representation::Direct => Self::Colors(scratch(width)?),
        })
    }

    /// Reads row `y`, returning the pixel count.
    fn read(&mut self, image: &dyn RasterImage, y: i32) -> usize {
        let right = image.width() as i32;
        match self {
            Self::Colors(row) => image.get_line(0, right, y, row),
            Self::Floats(row) => image.get_line_f(0, right, y, row),
            Self::Indices(row) => image.get_indices(0, right, y, row),
        }
    }

    fn reverse(&mut self, n: usize) {
        match self {
            Self::Colors(row) => row[..n].reverse(),
            Self::Floats(row) => row[..n].reverse(),
            Self::Indices(row) => row[..n].reverse(),
        }
    }

    /// Writes the first `n` entries as row `y`.
    fn write_line(&self, image: &mut dyn RasterImage, y: i32, n: usize) -> usize {
        let right = n as i32;
        match self {
            Self::Colors(row) => image.put_line(0, right, y, &row[..n]),
            Self::Floats(row) => image.put_line_f(0, right, y, &row[..n]),
            Self::Indices(row) => image.put_indices(0, right, y, &row[..n]),
        }
    }

    /// Writes entry `i` at `(x, y)`.
    fn write_pixel(&self, image: &mut dyn RasterImage, i: usize, x: i32, y: i32) -> bool {
        match self {
            Self::Colors(row) => image.put_pixel(x, y, &row[i]),
            Self::Floats(row) => image.put_pixel_f(x, y, &row[i]),
            Self::Indices(row) => image.put_indices(x, x + 1, y, &row[i..=i]) == 1,
        }
    }
}

/// Rotates by a multiple of 90 degrees, clockwise.
///
/// 90 and 270 swap width and height.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] for any angle other than 90, 180 or 270.
pub fn rotate(image: &dyn RasterImage, degrees: i32) -> OpsResult<Image> {
    let (width, height) = (image.width(), image.height());
    trace!(width, height, degrees, "transform::rotate");

    match degrees {
        180 => {
            let mut out = image.same_type(width, height)?;
            let mut row = RowBuffer::for_image(image)?;
            for y in 0..height as i32 {
                let n = row.read(image, y);
                row.reverse(n);
                row.write_line(&mut out, height as i32 - 1 - y, n);
            }
            Ok(out)
        }
        90 | 270 => {
            let mut out = image.same_type(height, width)?;
            let mut row = RowBuffer::for_image(image)?;
            // source row y becomes destination column tx, walked along ty
            let (mut tx, tx_step, ty_start, ty_step) = if degrees == 90 {
                (height as i32 - 1, -1, 0, 1)
            } else {
                (0, 1, width as i32 - 1, -1)
            };
            for y in 0..height as i32 {
                let n = row.read(image, y);
                let mut ty = ty_start;
                for x in 0..n {
                    row.write_pixel(&mut out, x, tx, ty);
                    ty += ty_step;
                }
                tx += tx_step;
            }
            Ok(out)
        }
        other => {
            warn!(degrees = other, "rotate: unsupported angle");
            Err(OpsError::InvalidParameter(format!(
                "rotation must be 90, 180 or 270 degrees, got {other}"
            )))
        }
    }
}

/// Swaps two pixels, through the float domain for wide images.
fn swap_pixels(image: &mut dyn RasterImage, a: (i32, i32), b: (i32, i32)) {
    if image.depth().is_wide() {
        if let (Some(pa), Some(pb)) = (image.get_pixel_f(a.0, a.1), image.get_pixel_f(b.0, b.1)) {
            image.put_pixel_f(a.0, a.1, &pb);
            image.put_pixel_f(b.0, b.1, &pa);
        }
    } else if let (Some(pa), Some(pb)) = (image.get_pixel(a.0, a.1), image.get_pixel(b.0, b.1)) {
        image.put_pixel(a.0, a.1, &pb);
        image.put_pixel(b.0, b.1, &pa);
    }
}

/// Mirrors the image in place.
pub fn flip(image: &mut dyn RasterImage, axis: FlipAxis) {
    let w = image.width() as i32;
    let h = image.height() as i32;
    let (half_w, half_h) = (w / 2, h / 2);
    trace!(width = w, height = h, ?axis, "transform::flip");

    match axis {
        FlipAxis::X => {
            for y in 0..h {
                for x in 0..half_w {
                    swap_pixels(image, (x, y), (w - 1 - x, y));
                }
            }
        }
        FlipAxis::Y => {
            for y in 0..half_h {
                for x in 0..w {
                    swap_pixels(image, (x, y), (x, h - 1 - y));
                }
            }
        }
        FlipAxis::XY => {
            // each quadrant pair swaps diagonally
            for y in 0..half_h {
                let y2 = h - 1 - y;
                for x in 0..half_w {
                    let x2 = w - 1 - x;
                    swap_pixels(image, (x, y), (x2, y2));
                    swap_pixels(image, (x2, y), (x, y2));
                }
            }
            if half_w * 2 != w {
                debug!("flip: odd number of columns");
                let x = half_w;
                for y in 0..half_h {
                    swap_pixels(image, (x, y), (x, h - 1 - y));
                }
            }
            if half_h * 2 != h {
                debug!("flip: odd number of rows");
                let y = half_h;
                for x in 0..half_w {
                    swap_pixels(image, (x, y), (w - 1 - x, y));
                }
            }
        }
    }
}

/// Builds an image of the same type and size whose pixel `(x, y)` is read
/// from `map(x, y)` in the source.
///
/// Mapped coordinates are truncated toward zero. Pixels that map outside
/// the source are left at their initial value.
pub fn transform<F>(image: &dyn RasterImage, mut map: F) -> OpsResult<Image>
where
    F: FnMut(f64, f64) -> (f64, f64),
{
    let (width, height) = (image.width(), image.height());
    trace!(width, height, "transform::transform");
    let mut out = image.same_type(width, height)?;
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let (sx, sy) = map(x as f64, y as f64);
            if !sx.is_finite() || !sy.is_finite() {
                continue;
            }
            transfer_pixel(image, sx as i32, sy as i32, &mut out, x, y);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_core::SampleDepth;

    fn numbered(width: u32, height: u32) -> Image {
        let mut img = Image::new_rgb(width, height).unwrap();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                img.put_pixel(x, y, &Color::new(x as u8, y as u8, 0, 0));
            }
        }
        img
    }

    #[test]
    fn test_flip_axis_codes() {
        assert_eq!(FlipAxis::try_from(0).unwrap(), FlipAxis::X);
        assert_eq!(FlipAxis::try_from(2).unwrap(), FlipAxis::XY);
        assert!(matches!(
            FlipAxis::try_from(3),
            Err(OpsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rotate_90_moves_corners() {
        let src = numbered(3, 2);
        let out = rotate(&src, 90).unwrap();
        assert_eq!((out.width(), out.height()), (2, 3));
        // top-left goes to top-right
        assert_eq!(out.get_pixel(1, 0), Some(Color::new(0, 0, 0, 0)));
        // bottom-left goes to top-left
        assert_eq!(out.get_pixel(0, 0), Some(Color::new(0, 1, 0, 0)));
        assert_eq!(out.get_pixel(0, 2), Some(Color::new(2, 1, 0, 0)));
    }

    #[test]
    fn test_rotate_270_moves_corners() {
        let src = numbered(3, 2);
        let out = rotate(&src, 270).unwrap();
        assert_eq!((out.width(), out.height()), (2, 3));
        // top-left goes to bottom-left
        assert_eq!(out.get_pixel(0, 2), Some(Color::new(0, 0, 0, 0)));
        assert_eq!(out.get_pixel(0, 0), Some(Color::new(2, 0, 0, 0)));
    }

    #[test]
    fn test_rotate_180() {
        let src = numbered(3, 2);
        let out = rotate(&src, 180).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(2 - x, 1 - y));
            }
        }
    }

    #[test]
    fn test_rotate_rejects_other_angles() {
        let src = numbered(2, 2);
        assert!(matches!(rotate(&src, 45), Err(OpsError::InvalidParameter(_))));
        assert!(rotate(&src, 0).is_err());
        assert!(rotate(&src, -90).is_err());
    }

    #[test]
    fn test_rotate_paletted_uses_indices() {
        let mut src = Image::new_paletted(2, 1, 3, 4).unwrap();
        src.add_colors(&[Color::gray(1), Color::gray(2)]).unwrap();
        src.put_indices(0, 2, 0, &[0, 1]);
        let out = rotate(&src, 90).unwrap();
        assert_eq!(out.representation(), Representation::Paletted);
        let mut idx = [9u8; 1];
        out.get_indices(0, 1, 1, &mut idx);
        assert_eq!(idx, [1]);
    }

    #[test]
    fn test_rotate_wide_keeps_depth() {
        let mut src = Image::new_wide(2, 1, 1, SampleDepth::F32).unwrap();
        src.put_pixel_f(0, 0, &FloatColor::new(1.75, 0.0, 0.0, 0.0));
        let out = rotate(&src, 270).unwrap();
        assert_eq!(out.depth(), SampleDepth::F32);
        assert_eq!(out.get_channel_f(0, 1, 0), Some(1.75));
    }

    #[test]
    fn test_flip_x() {
        let mut img = numbered(3, 2);
        flip(&mut img, FlipAxis::X);
        assert_eq!(img.get_pixel(0, 1), Some(Color::new(2, 1, 0, 0)));
        assert_eq!(img.get_pixel(1, 1), Some(Color::new(1, 1, 0, 0)));
    }

    #[test]
    fn test_flip_xy_matches_rotate_180() {
        for (w, h) in [(4, 4), (5, 3), (3, 5), (1, 1), (2, 7)] {
            let src = numbered(w, h);
            let rotated = rotate(&src, 180).unwrap();
            let mut flipped = numbered(w, h);
            flip(&mut flipped, FlipAxis::XY);
            for y in 0..h as i32 {
                for x in 0..w as i32 {
                    assert_eq!(flipped.get_pixel(x, y), rotated.get_pixel(x, y), "{w}x{h}");
                }
            }
        }
    }

    #[test]
    fn test_transform_mirror() {
        let src = numbered(4, 2);
        let out = transform(&src, |x, y| (3.0 - x, y)).unwrap();
        assert_eq!(out.get_pixel(0, 1), src.get_pixel(3, 1));
        assert_eq!(out.get_pixel(3, 0), src.get_pixel(0, 0));
    }

    #[test]
    fn test_transform_out_of_range_left_blank() {
        let src = numbered(2, 2);
        let out = transform(&src, |x, y| (x + 10.0, y)).unwrap();
        assert_eq!(out.get_pixel(1, 1), Some(Color::default()));
    }
}
