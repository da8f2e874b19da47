//! Image scaling.
//!
//! - [`scale_axis`] - windowed-sinc resampling along one axis
//! - [`scale_nn`] - nearest-neighbor scaling of both axes at once
//!
//! # Kernel
//!
//! [`scale_axis`] uses a Lanczos kernel with two lobes ([`lanczos2`]). When
//! shrinking by `factor`, the window is widened by `k = round(1 / factor)`
//! so every source pixel contributes; growing uses `k = 1`. The `2k` taps on
//! each side of the source position are weighted, summed, divided by `k` and
//! clamped.
//!
//! Sums are computed in the float domain, so wide images keep their
//! precision. The weights are not renormalized: a flat image may drift by
//! about one percent when shrunk.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Image, RasterImage};
//! use raster_ops::resize::{scale_axis, Axis};
//!
//! let src = Image::new_rgb(64, 48).unwrap();
//! let wide = scale_axis(&src, 2.0, Axis::X).unwrap();
//! assert_eq!((wide.width(), wide.height()), (128, 48));
//! ```

use std::f64::consts::PI;

use raster_core::{FloatColor, Image, RasterImage, Representation, MAX_CHANNELS};
use tracing::{debug, trace};

use crate::copy::transfer_pixel;
use crate::error::scratch;
use crate::{OpsError, OpsResult};

/// Axis selector for [`scale_axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal: width changes.
    X,
    /// Vertical: height changes.
    Y,
}

/// Two-lobe Lanczos kernel: `sinc(x) * sinc(x / 2)` inside `(-2, 2)`.
#[inline]
pub fn lanczos2(x: f64) -> f64 {
    if x >= 2.0 || x <= -2.0 {
        0.0
    } else if x == 0.0 {
        1.0
    } else {
        let pi_x = PI * x;
        let pi_x2 = pi_x / 2.0;
        (pi_x.sin() / pi_x) * (pi_x2.sin() / pi_x2)
    }
}

/// Window widening for a scale factor: `1` when growing, `round(1/factor)`
/// when shrinking.
#[inline]
pub fn window_factor(factor: f64) -> usize {
    if factor >= 1.0 {
        1
    } else {
        ((1.0 / factor).round() as usize).max(1)
    }
}

fn check_factor(factor: f64, what: &str) -> OpsResult<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(OpsError::InvalidParameter(format!(
            "{what}: scale factor must be finite and positive, got {factor}"
        )))
    }
}

/// Converts a scaled extent to `u32`, rejecting ones that don't fit.
fn to_extent(v: f64) -> OpsResult<u32> {
    if v > i32::MAX as f64 {
        return Err(OpsError::InvalidDimensions(format!(
            "scaled extent {v} is too large"
        )));
    }
    Ok(v as u32)
}

/// A direct image with the source's channels, and its depth when the source
/// is direct. Filtered colors can't be expected to fit a palette.
fn direct_like(image: &dyn RasterImage, width: u32, height: u32) -> OpsResult<Image> {
    let out = match image.representation() {
        Representation::Direct => image.same_type(width, height)?,
        Representation::Paletted => Image::new_empty(width, height, image.channels())?,
    };
    Ok(out)
}

/// Resamples `image` along `axis` by `factor`.
///
/// The new extent is `round(extent * factor)`, at least 1 for a non-empty
/// source; the other extent is unchanged. Source taps past the edge repeat
/// the edge pixel. Paletted sources produce a direct image.
///
/// # Errors
///
/// - [`OpsError::InvalidParameter`] unless `factor` is finite and positive
/// - [`OpsError::InvalidDimensions`] if the result would be too large
pub fn scale_axis(image: &dyn RasterImage, factor: f64, axis: Axis) -> OpsResult<Image> {
    check_factor(factor, "scale_axis")?;
    let (width, height) = (image.width(), image.height());
    let (extent, across) = match axis {
        Axis::X => (width, height),
        Axis::Y => (height, width),
    };
    let mut new_extent = to_extent((extent as f64 * factor).round())?;
    if extent > 0 {
        new_extent = new_extent.max(1);
    }
    let (dst_w, dst_h) = match axis {
        Axis::X => (new_extent, height),
        Axis::Y => (width, new_extent),
    };
    trace!(width, height, factor, ?axis, dst_w, dst_h, "resize::scale_axis");

    let mut out = direct_like(image, dst_w, dst_h)?;
    if extent == 0 || across == 0 {
        return Ok(out);
    }

    // taps past the source extent all clamp to the edge pixel
    let k = window_factor(factor).min(extent as usize).max(1);
    let taps = k.checked_mul(2).ok_or_else(|| {
        OpsError::InvalidParameter(format!("scale_axis: window too wide for factor {factor}"))
    })?;
    debug!(k, taps, "scale_axis window");
    let mut near_w: Vec<f64> = scratch(taps)?;
    let mut far_w: Vec<f64> = scratch(taps)?;
    let channels = image.channels().min(MAX_CHANNELS);
    let last = extent as i64 - 1;

    // (position along the axis, position across it) -> (x, y)
    let place = |along: i64, at: u32| -> (i32, i32) {
        match axis {
            Axis::X => (along as i32, at as i32),
            Axis::Y => (at as i32, along as i32),
        }
    };

    for j in 0..new_extent {
        let old = j as f64 / factor;
        let t = old.floor();
        let f = old - t;
        let t = t as i64;

        // near_w[m] weighs source t - m, far_w[m] weighs source t + 1 + m
        for m in 0..taps {
            near_w[m] = lanczos2((m as f64 + f) / k as f64);
            far_w[m] = lanczos2((m as f64 + 1.0 - f) / k as f64);
        }

        for i in 0..across {
            let mut acc = [0.0f64; MAX_CHANNELS];
            for m in 0..taps {
                let (nx, ny) = place((t - m as i64).clamp(0, last), i);
                let (fx, fy) = place((t + 1 + m as i64).clamp(0, last), i);
                let near = image.get_pixel_f(nx, ny).unwrap_or_default();
                let far = image.get_pixel_f(fx, fy).unwrap_or_default();
                for ch in 0..channels {
                    acc[ch] += near_w[m] * near.0[ch] + far_w[m] * far.0[ch];
                }
            }

            let mut px = FloatColor::default();
            for ch in 0..channels {
                px.0[ch] = (acc[ch] / k as f64).clamp(0.0, 1.0);
            }
            let (x, y) = place(j as i64, i);
            out.put_pixel_f(x, y, &px);
        }
    }

    Ok(out)
}

/// Scales both axes by nearest-neighbor sampling.
///
/// The new extents are `trunc(extent * factor)`. Destination `(nx, ny)`
/// takes source `(trunc(nx / sx), trunc(ny / sy))`. The result has the
/// source's representation, so paletted images stay paletted.
///
/// # Errors
///
/// - [`OpsError::InvalidParameter`] unless both factors are finite and
///   positive
/// - [`OpsError::InvalidDimensions`] if the result would be too large
pub fn scale_nn(image: &dyn RasterImage, sx: f64, sy: f64) -> OpsResult<Image> {
    check_factor(sx, "scale_nn")?;
    check_factor(sy, "scale_nn")?;
    let (width, height) = (image.width(), image.height());
    let dst_w = to_extent((width as f64 * sx).trunc())?;
    let dst_h = to_extent((height as f64 * sy).trunc())?;
    trace!(width, height, sx, sy, dst_w, dst_h, "resize::scale_nn");

    let mut out = image.same_type(dst_w, dst_h)?;
    if width == 0 || height == 0 {
        return Ok(out);
    }
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    for ny in 0..dst_h {
        let src_y = ((ny as f64 / sy) as i64).min(max_y) as i32;
        for nx in 0..dst_w {
            let src_x = ((nx as f64 / sx) as i64).min(max_x) as i32;
            transfer_pixel(image, src_x, src_y, &mut out, nx as i32, ny as i32);
        }
    }
    Ok(out)
}
