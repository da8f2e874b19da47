//! Region and whole-image copies.
//!
//! Region copies clip per pixel: source pixels outside the source and
//! destination pixels outside the destination are skipped, so a region may
//! hang off either image.

use raster_core::{Color, FloatColor, Image, RasterImage, Rect, Representation};
use tracing::trace;

use crate::error::scratch;
use crate::OpsResult;

/// Copies one pixel, through the float domain when `dst` is wide.
///
/// Returns `false` if either end is outside its image.
pub(crate) fn transfer_pixel(
    src: &dyn RasterImage,
    sx: i32,
    sy: i32,
    dst: &mut dyn RasterImage,
    dx: i32,
    dy: i32,
) -> bool {
    if dst.depth().is_wide() {
        src.get_pixel_f(sx, sy)
            .is_some_and(|px| dst.put_pixel_f(dx, dy, &px))
    } else {
        src.get_pixel(sx, sy)
            .is_some_and(|px| dst.put_pixel(dx, dy, &px))
    }
}

/// Copies `region` of `src` so its top-left corner lands at `(tx, ty)` in
/// `dest`.
///
/// Build `region` with [`Rect::from_corners`] to accept corners in either
/// order. Returns the number of pixels written.
pub fn copy_region(
    dest: &mut dyn RasterImage,
    src: &dyn RasterImage,
    region: Rect,
    tx: i32,
    ty: i32,
) -> usize {
    trace!(?region, tx, ty, "copy::copy_region");
    let mut written = 0;
    for (row, y) in (region.y..region.bottom()).enumerate() {
        for (col, x) in (region.x..region.right()).enumerate() {
            if transfer_pixel(src, x, y, dest, tx + col as i32, ty + row as i32) {
                written += 1;
            }
        }
    }
    written
}

/// Like [`copy_region`], but source pixels equal to `key` are not copied.
///
/// Pixels are compared on the destination's channels only. Always copies in
/// 8 bits. Returns the number of pixels written.
pub fn copy_region_keyed(
    dest: &mut dyn RasterImage,
    src: &dyn RasterImage,
    region: Rect,
    tx: i32,
    ty: i32,
    key: &Color,
) -> usize {
    trace!(?region, tx, ty, %key, "copy::copy_region_keyed");
    let channels = dest.channels();
    let mut written = 0;
    for (row, y) in (region.y..region.bottom()).enumerate() {
        for (col, x) in (region.x..region.right()).enumerate() {
            let Some(px) = src.get_pixel(x, y) else {
                continue;
            };
            if px.matches(key, channels) {
                continue;
            }
            if dest.put_pixel(tx + col as i32, ty + row as i32, &px) {
                written += 1;
            }
        }
    }
    written
}

/// Creates an independent copy of `src` with the same representation, depth
/// and channel count.
///
/// Paletted images get a copy of the whole palette, then their indices.
/// Wide images are copied through the float domain. Tags are not copied.
pub fn copy(src: &dyn RasterImage) -> OpsResult<Image> {
    let (width, height) = (src.width(), src.height());
    trace!(width, height, "copy::copy");
    let mut out = src.same_type(width, height)?;
    let w = width as usize;
    let right = width as i32;

    match src.representation() {
        Representation::Paletted => {
            // same_type carries the palette; make it match entry by entry
            let count = src.color_count().unwrap_or(0);
            let mut entries: Vec<Color> = scratch(count)?;
            if src.get_colors(0, &mut entries) && out.color_count() == Some(count) {
                out.set_colors(0, &entries);
            }
            let mut row: Vec<u8> = scratch(w)?;
            for y in 0..height as i32 {
                let n = src.get_indices(0, right, y, &mut row);
                out.put_indices(0, right, y, &row[..n]);
            }
        }
        Representation::Direct if src.depth().is_wide() => {
            let mut row: Vec<FloatColor> = scratch(w)?;
            for y in 0..height as i32 {
                let n = src.get_line_f(0, right, y, &mut row);
                out.put_line_f(0, right, y, &row[..n]);
            }
        }
        Representation::Direct => {
            let mut row: Vec<Color> = scratch(w)?;
            for y in 0..height as i32 {
                let n = src.get_line(0, right, y, &mut row);
                out.put_line(0, right, y, &row[..n]);
            }
        }
    }
    Ok(out)
}
