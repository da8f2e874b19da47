//! Alpha compositing of a source image onto a destination.
//!
//! [`rub_through`] blends every source pixel over the destination using the
//! source's last channel as coverage:
//!
//! ```text
//! dest' = alpha * src + (1 - alpha) * dest
//! ```
//!
//! Three (destination, source) channel pairings are supported:
//!
//! | dest | src | source color         | alpha |
//! |------|-----|----------------------|-------|
//! | 3    | 4   | channels 0, 1, 2     | 3     |
//! | 3    | 2   | channel 0 as gray    | 1     |
//! | 1    | 2   | channel 0            | 1     |
//!
//! 8-bit destinations use integer arithmetic
//! (`(a * s + (255 - a) * d) / 255`, truncating); wide destinations blend in
//! the float domain.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Color, Image, RasterImage};
//! use raster_ops::composite::rub_through;
//!
//! let mut dest = Image::new_rgb(4, 4).unwrap();
//! let mut logo = Image::new_empty(2, 2, 4).unwrap();
//! logo.put_pixel(0, 0, &Color::new(255, 0, 0, 255));
//!
//! rub_through(&mut dest, &logo, 1, 1).unwrap();
//! assert_eq!(dest.get_pixel(1, 1), Some(Color::new(255, 0, 0, 0)));
//! ```

use raster_core::{FloatColor, RasterImage, MAX_CHANNELS};
use tracing::{debug, trace, warn};

use crate::{OpsError, OpsResult};

/// Which source channels feed the destination, and which carries alpha.
#[derive(Debug, Clone, Copy)]
struct Pairing {
    color: [usize; 3],
    count: usize,
    alpha: usize,
}

fn pairing(dest_channels: usize, src_channels: usize) -> Option<Pairing> {
    match (dest_channels, src_channels) {
        (3, 4) => Some(Pairing {
            color: [0, 1, 2],
            count: 3,
            alpha: 3,
        }),
        (3, 2) => Some(Pairing {
            color: [0, 0, 0],
            count: 3,
            alpha: 1,
        }),
        (1, 2) => Some(Pairing {
            color: [0, 0, 0],
            count: 1,
            alpha: 1,
        }),
        _ => None,
    }
}

/// Blends `src` over `dest` with its top-left corner at `(tx, ty)`.
///
/// Destination pixels outside `dest` are skipped.
///
/// # Errors
///
/// [`OpsError::Unsupported`] for channel pairings other than (3, 4),
/// (3, 2) and (1, 2).
pub fn rub_through(
    dest: &mut dyn RasterImage,
    src: &dyn RasterImage,
    tx: i32,
    ty: i32,
) -> OpsResult<()> {
    let (dc, sc) = (dest.channels(), src.channels());
    trace!(dest_channels = dc, src_channels = sc, tx, ty, "composite::rub_through");

    let Some(p) = pairing(dc, sc) else {
        warn!(dest_channels = dc, src_channels = sc, "rub_through: unsupported pairing");
        return Err(OpsError::Unsupported(format!(
            "rub_through needs (dest, src) channels of (3,4), (3,2) or (1,2), got ({dc},{sc})"
        )));
    };

    let wide = dest.depth().is_wide();
    debug!(wide, "rub_through arithmetic");
    for y in 0..src.height() as i32 {
        for x in 0..src.width() as i32 {
            let (dx, dy) = (tx + x, ty + y);
            if wide {
                blend_float(dest, src, &p, (x, y), (dx, dy));
            } else {
                blend_int(dest, src, &p, (x, y), (dx, dy));
            }
        }
    }
    Ok(())
}

fn blend_int(
    dest: &mut dyn RasterImage,
    src: &dyn RasterImage,
    p: &Pairing,
    (x, y): (i32, i32),
    (dx, dy): (i32, i32),
) {
    let (Some(s), Some(orig)) = (src.get_pixel(x, y), dest.get_pixel(dx, dy)) else {
        return;
    };
    let alpha = s.0[p.alpha] as u32;
    let mut out = orig;
    for ch in 0..p.count.min(MAX_CHANNELS) {
        let sv = s.0[p.color[ch]] as u32;
        let dv = orig.0[ch] as u32;
        out.0[ch] = ((alpha * sv + (255 - alpha) * dv) / 255) as u8;
    }
    dest.put_pixel(dx, dy, &out);
}

fn blend_float(
    dest: &mut dyn RasterImage,
    src: &dyn RasterImage,
    p: &Pairing,
    (x, y): (i32, i32),
    (dx, dy): (i32, i32),
) {
    let (Some(s), Some(orig)) = (src.get_pixel_f(x, y), dest.get_pixel_f(dx, dy)) else {
        return;
    };
    let alpha = s.0[p.alpha];
    let mut out: FloatColor = orig;
    for ch in 0..p.count.min(MAX_CHANNELS) {
        out.0[ch] = alpha * s.0[p.color[ch]] + (1.0 - alpha) * orig.0[ch];
    }
    dest.put_pixel_f(dx, dy, &out);
}
