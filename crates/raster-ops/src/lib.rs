//! # raster-ops
//!
//! Geometric and compositing operations over any [`RasterImage`].
//!
//! Everything here goes through the pixel access contract of
//! `raster-core`, never a buffer layout, so the same code runs on 8-bit,
//! wide, paletted and virtual images.
//!
//! # Modules
//!
//! - [`resize`] - Windowed-sinc axis scaling and nearest-neighbor scaling
//! - [`transform`] - Right-angle rotation, flips, coordinate-mapped resampling
//! - [`copy`] - Region copies (plain and color-keyed) and whole-image copies
//! - [`composite`] - Alpha rub-through
//! - [`metrics`] - Squared pixel difference
//! - [`colors`] - Bounded distinct color counting
//! - [`haar`] - One-level Haar wavelet
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Color, Image, RasterImage};
//! use raster_ops::{flip, rotate, squared_diff, FlipAxis};
//!
//! let mut img = Image::new_rgb(3, 2).unwrap();
//! img.put_pixel(0, 0, &Color::new(255, 0, 0, 0));
//!
//! let turned = rotate(&img, 180).unwrap();
//! let mut flipped = raster_ops::copy(&img).unwrap();
//! flip(&mut flipped, FlipAxis::XY);
//! assert_eq!(squared_diff(&turned, &flipped), 0.0);
//! ```
//!
//! [`RasterImage`]: raster_core::RasterImage

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod colors;
pub mod composite;
pub mod copy;
pub mod haar;
pub mod metrics;
pub mod resize;
pub mod transform;

pub use colors::{count_colors, ColorCount, ColorOctree};
pub use composite::rub_through;
pub use copy::{copy, copy_region, copy_region_keyed};
pub use error::{OpsError, OpsResult};
pub use haar::haar;
pub use metrics::squared_diff;
pub use resize::{scale_axis, scale_nn, Axis};
pub use transform::{flip, rotate, transform, FlipAxis};
