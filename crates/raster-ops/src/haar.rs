//! One level of a 2-D Haar wavelet.
//!
//! The output has both extents rounded up to even. Each pass stores the
//! pairwise average in the first half and the biased half difference
//! `(255 + a - b) / 2` in the second half, so flat areas show up as mid gray
//! in the detail bands.

use raster_core::{Color, Image, RasterImage};
use tracing::trace;

use crate::OpsResult;

fn haar_pair(a: &Color, b: &Color, channels: usize) -> (Color, Color) {
    let mut avg = Color::default();
    let mut detail = Color::default();
    for ch in 0..channels {
        let (p, q) = (a.0[ch] as i32, b.0[ch] as i32);
        avg.0[ch] = ((p + q) / 2) as u8;
        detail.0[ch] = ((255 + p - q) / 2) as u8;
    }
    (avg, detail)
}

/// Applies one horizontal then one vertical Haar step to `image`.
///
/// The result is an 8-bit image with the source's channel count. When an
/// extent is odd the last row or column is paired with itself.
///
/// # Errors
///
/// Fails if the intermediate or output image cannot be allocated.
pub fn haar(image: &dyn RasterImage) -> OpsResult<Image> {
    let (width, height) = (image.width(), image.height());
    let channels = image.channels();
    trace!(width, height, channels, "haar::haar");

    // allocation rejects extents past i32::MAX, so the casts below are exact
    let (half_w, half_h) = (width.div_ceil(2), height.div_ceil(2));
    let mut rows = Image::new_empty(half_w.saturating_mul(2), half_h.saturating_mul(2), channels)?;
    let (mx, my) = (width as i32, height as i32);
    let (fx, fy) = (half_w as i32, half_h as i32);
    for y in 0..my {
        for x in 0..fx {
            let Some(a) = image.get_pixel(x * 2, y) else {
                continue;
            };
            let b = image.get_pixel(x * 2 + 1, y).unwrap_or(a);
            let (avg, detail) = haar_pair(&a, &b, channels);
            rows.put_pixel(x, y, &avg);
            rows.put_pixel(x + fx, y, &detail);
        }
    }

    let mut out = Image::new_empty(half_w.saturating_mul(2), half_h.saturating_mul(2), channels)?;
    for y in 0..fy {
        for x in 0..fx * 2 {
            let Some(a) = rows.get_pixel(x, y * 2) else {
                continue;
            };
            let b = if y * 2 + 1 < my {
                rows.get_pixel(x, y * 2 + 1).unwrap_or(a)
            } else {
                a
            };
            let (avg, detail) = haar_pair(&a, &b, channels);
            out.put_pixel(x, y, &avg);
            out.put_pixel(x, y + fy, &detail);
        }
    }
    Ok(out)
}
