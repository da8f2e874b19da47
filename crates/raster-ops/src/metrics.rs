//! Pixel difference metric.

use raster_core::RasterImage;
use tracing::{debug, trace};

/// Sum of squared 8-bit channel differences between `a` and `b`.
///
/// Only the common area (`min` width by `min` height) and the common
/// channels are compared, so images of different sizes never fail and may
/// still score zero.
///
/// # Example
///
/// ```rust
/// use raster_core::{Color, Image, RasterImage};
/// use raster_ops::metrics::squared_diff;
///
/// let mut a = Image::new_rgb(2, 2).unwrap();
/// let b = Image::new_rgb(3, 1).unwrap();
/// a.put_pixel(0, 0, &Color::new(3, 4, 0, 0));
/// assert_eq!(squared_diff(&a, &b), 25.0);
/// ```
pub fn squared_diff(a: &dyn RasterImage, b: &dyn RasterImage) -> f64 {
    let width = a.width().min(b.width()) as i32;
    let height = a.height().min(b.height()) as i32;
    let channels = a.channels().min(b.channels());
    trace!(width, height, channels, "metrics::squared_diff");

    let mut total = 0.0;
    for y in 0..height {
        for x in 0..width {
            let (Some(p), Some(q)) = (a.get_pixel(x, y), b.get_pixel(x, y)) else {
                continue;
            };
            for ch in 0..channels {
                let d = p.0[ch] as f64 - q.0[ch] as f64;
                total += d * d;
            }
        }
    }
    debug!(total, "squared_diff done");
    total
}
