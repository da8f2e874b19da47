//! Error types for raster-core operations.
//!
//! Pixel-level geometry failures (a coordinate or span outside the image) are
//! not errors here: they are reported through `Option`, `bool` or a transfer
//! count, because clipping is an ordinary outcome for drawing and codec code.
//! [`RasterError`] covers everything else:
//!
//! - construction failures (bad channel count, overflowing extents, allocation)
//! - channel or palette index misuse
//! - writes attempted through a read-only forwarding image
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Image, RasterError};
//!
//! let err = Image::new_empty(4, 4, 7).unwrap_err();
//! assert!(matches!(err, RasterError::InvalidChannels(7)));
//! ```
//!
//! Every variant carries a numeric code (see [`crate::diag::ErrorCode`]) so it
//! can be pushed onto an [`ErrorStack`](crate::diag::ErrorStack).

use thiserror::Error;

use crate::diag::ErrorCode;

/// Result type alias using [`RasterError`] as the error type.
pub type Result<T> = std::result::Result<T, RasterError>;

/// Errors produced by image construction and pixel dispatch.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Pixel coordinates are outside the image.
    ///
    /// Only returned by the `Result`-flavoured accessors such as
    /// [`RasterImage::pixel`](crate::RasterImage::pixel); the plain accessors
    /// return `None`/`false` instead.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was accessed
        x: i32,
        /// Y coordinate that was accessed
        y: i32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// A requested channel index does not exist in the image.
    #[error("no channel {channel} in this image ({channels} channels)")]
    NoChannel {
        /// Requested channel index
        channel: usize,
        /// Channel count of the image
        channels: usize,
    },

    /// Channel count outside `1..=4`.
    #[error("invalid channel count {0}, expected 1 to 4")]
    InvalidChannels(usize),

    /// Extents that cannot be represented as a buffer size.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Memory allocation failed.
    ///
    /// Large images or long tag lists report this instead of aborting the
    /// process.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// Palette index or palette size out of range.
    #[error("invalid palette access: {0}")]
    InvalidPalette(String),

    /// Write attempted through a read-only forwarding image.
    #[error("image is read-only")]
    ReadOnly,
}

impl RasterError {
    /// Creates an [`RasterError::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`RasterError::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates an [`RasterError::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::NoChannel { .. })
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}

impl ErrorCode for RasterError {
    fn code(&self) -> i32 {
        match self {
            Self::OutOfBounds { .. } => 1,
            Self::NoChannel { .. } => 2,
            Self::InvalidChannels(_) => 3,
            Self::InvalidDimensions { .. } => 4,
            Self::AllocationFailed { .. } => 5,
            Self::InvalidPalette(_) => 6,
            Self::ReadOnly => 7,
        }
    }
}

/// Converts a failed `try_reserve` into [`RasterError::AllocationFailed`].
pub(crate) fn alloc_error(
    requested: usize,
    err: std::collections::TryReserveError,
) -> RasterError {
    RasterError::allocation_failed(requested, err.to_string())
}
