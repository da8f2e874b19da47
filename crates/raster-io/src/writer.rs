//! Buffered writing through a block callback.
//!
//! [`WriterBuffer`] collects small writes and hands them to the callback in
//! blocks of up to its capacity. A write that cannot fit even in an empty
//! buffer is passed to the callback directly.
//!
//! If the callback fails while flushing staged data, that data is dropped and
//! the error reports how many bytes were lost. Writers are not retried.

use std::io::{self, Write};

use tracing::{debug, trace, warn};

use crate::error::{StreamError, StreamResult};
use crate::DEFAULT_BUFFER_SIZE;

/// Consumer of blocks written through a [`WriterBuffer`].
pub trait BlockSink {
    /// Accepts all of `data` or fails.
    fn write_block(&mut self, data: &[u8]) -> io::Result<()>;
}

impl<F> BlockSink for F
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    fn write_block(&mut self, data: &[u8]) -> io::Result<()> {
        self(data)
    }
}

/// Staging writer over a [`BlockSink`].
pub struct WriterBuffer<S: BlockSink> {
    sink: S,
    buffer: Box<[u8]>,
    filled: usize,
}

impl<S: BlockSink> WriterBuffer<S> {
    /// Creates a writer staging up to `capacity` bytes.
    ///
    /// `capacity` is clamped to [`DEFAULT_BUFFER_SIZE`]; `0` selects it.
    pub fn new(sink: S, capacity: usize) -> Self {
        let capacity = match capacity {
            0 => DEFAULT_BUFFER_SIZE,
            n => n.min(DEFAULT_BUFFER_SIZE),
        };
        Self {
            sink,
            buffer: vec![0; capacity].into_boxed_slice(),
            filled: 0,
        }
    }

    /// Staging capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes staged and not yet handed to the sink.
    pub fn pending(&self) -> usize {
        self.filled
    }

    /// Writes all of `data`, staging it when it fits.
    ///
    /// # Errors
    ///
    /// - [`StreamError::WriteFailed`] if flushing staged data failed; the
    ///   staged data and `data` are both dropped
    /// - [`StreamError::Callback`] if a direct hand-off of `data` failed
    pub fn write_buffered(&mut self, data: &[u8]) -> StreamResult<()> {
        if self.filled > 0 && self.filled + data.len() > self.buffer.len() {
            self.flush_buffered()?;
        }
        if self.filled + data.len() <= self.buffer.len() {
            self.buffer[self.filled..self.filled + data.len()].copy_from_slice(data);
            self.filled += data.len();
            return Ok(());
        }
        trace!(len = data.len(), "write bypasses staging buffer");
        self.sink.write_block(data)?;
        Ok(())
    }

    /// Hands staged data to the sink.
    ///
    /// The buffer is emptied whether or not the sink accepts it.
    pub fn flush_buffered(&mut self) -> StreamResult<()> {
        if self.filled == 0 {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.filled);
        self.sink
            .write_block(&self.buffer[..pending])
            .map_err(|source| {
                debug!(pending, error = %source, "staged data dropped");
                StreamError::WriteFailed { pending, source }
            })
    }

    /// Consumes the writer, flushing first when `flush` is set.
    ///
    /// Unflushed data is discarded when `flush` is `false`.
    pub fn finish(mut self, flush: bool) -> StreamResult<()> {
        let result = if flush { self.flush_buffered() } else { Ok(()) };
        self.filled = 0;
        result
    }
}

impl<S: BlockSink> Write for WriterBuffer<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_buffered(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.flush_buffered()?)
    }
}

impl<S: BlockSink> Drop for WriterBuffer<S> {
    fn drop(&mut self) {
        if self.filled > 0 {
            warn!(pending = self.filled, "writer buffer dropped with unflushed data");
        }
    }
}

impl<S: BlockSink> std::fmt::Debug for WriterBuffer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterBuffer")
            .field("capacity", &self.buffer.len())
            .field("filled", &self.filled)
            .finish_non_exhaustive()
    }
}
