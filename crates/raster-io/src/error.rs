//! Error types for the stream adapters.

use std::io;

use raster_core::ErrorCode;
use thiserror::Error;

/// Stream adapter error.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The caller's callback reported a failure.
    #[error("stream callback failed: {0}")]
    Callback(#[from] io::Error),

    /// Flushing staged data failed; the staged bytes were discarded.
    #[error("buffered write failed, {pending} staged bytes dropped: {source}")]
    WriteFailed {
        /// Bytes that were staged and are now lost.
        pending: usize,
        /// Callback failure.
        source: io::Error,
    },
}

impl ErrorCode for StreamError {
    fn code(&self) -> i32 {
        match self {
            Self::Callback(_) => 20,
            Self::WriteFailed { .. } => 21,
        }
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Callback(e) => e,
            StreamError::WriteFailed { source, .. } => source,
        }
    }
}

/// Result type for stream adapter operations.
pub type StreamResult<T> = Result<T, StreamError>;
