//! Error types for image operations.

use raster_core::{ErrorCode, RasterError};
use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation not supported for these images.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Failure from the image layer, such as allocating the result.
    #[error(transparent)]
    Core(#[from] RasterError),
}

impl ErrorCode for OpsError {
    fn code(&self) -> i32 {
        match self {
            Self::InvalidDimensions(_) => 10,
            Self::InvalidParameter(_) => 11,
            Self::Unsupported(_) => 12,
            Self::Core(e) => e.code(),
        }
    }
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Allocates a zero-filled scratch buffer, reporting failure instead of
/// aborting.
pub(crate) fn scratch<T: Clone + Default>(len: usize) -> OpsResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        RasterError::allocation_failed(len.saturating_mul(std::mem::size_of::<T>()), e.to_string())
    })?;
    buf.resize(len, T::default());
    Ok(buf)
}
