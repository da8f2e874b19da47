//! # raster-core
//!
//! Core types for in-memory raster images.
//!
//! - [`Color`], [`FloatColor`] - 8-bit and float pixel values
//! - [`RasterImage`] - the pixel access contract every image implements
//! - [`Image`] - owned 8-bit, wide or paletted storage
//! - [`VirtualImage`] - forwards every operation to a borrowed image
//! - [`TagList`] - ordered image metadata
//! - [`ErrorStack`] - caller-owned trail of error messages
//!
//! ## Design
//!
//! Storage layout is chosen once at construction and hidden behind
//! [`RasterImage`]. Anything built on top (scaling, rotation, compositing,
//! codecs) talks to images only through that trait, so it works the same
//! way for every representation:
//!
//! ```rust
//! use raster_core::{Color, Image, RasterImage, VirtualImage};
//!
//! fn fill(img: &mut dyn RasterImage, color: Color) {
//!     let row = vec![color; img.width() as usize];
//!     for y in 0..img.height() as i32 {
//!         img.put_line(0, img.width() as i32, y, &row);
//!     }
//! }
//!
//! let mut direct = Image::new_rgb(4, 4).unwrap();
//! let mut paletted = Image::new_paletted(4, 4, 3, 16).unwrap();
//! fill(&mut direct, Color::new(1, 2, 3, 0));
//! fill(&mut VirtualImage::new(&mut paletted), Color::new(1, 2, 3, 0));
//! assert_eq!(direct.get_pixel(3, 3), paletted.get_pixel(3, 3));
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! raster-core (this crate)
//!    ^
//!    +-- raster-io  (buffered stream adapters)
//!    +-- raster-ops (scaling, rotation, compositing, metrics)
//! ```

#![warn(missing_docs)]

pub mod color;
pub mod depth;
pub mod diag;
pub mod error;
pub mod image;
pub mod palette;
pub mod raster;
pub mod rect;
pub mod tags;
pub mod virtual_image;

pub use color::{sample_to_float, sample_to_int, Color, FloatColor, MAX_CHANNELS};
pub use depth::{SampleDepth, WideBuffer, WideSample};
pub use diag::{ErrorCode, ErrorMessage, ErrorStack};
pub use error::{RasterError, Result};
pub use image::Image;
pub use palette::{Palette, MAX_PALETTE_SIZE};
pub use raster::{span_len, ImageInfo, RasterImage, Representation, ALL_CHANNELS};
pub use rect::Rect;
pub use tags::{Tag, TagList, NO_CODE};
pub use virtual_image::VirtualImage;

/// Commonly used items.
pub mod prelude {
    pub use crate::color::{Color, FloatColor};
    pub use crate::error::{RasterError, Result};
    pub use crate::image::Image;
    pub use crate::raster::{RasterImage, Representation};
    pub use crate::rect::Rect;
    pub use crate::tags::TagList;
}
