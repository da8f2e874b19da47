//! Buffered reading through a block callback.
//!
//! Codecs read in small pieces; the data often comes from a host callback
//! that is expensive per call. [`ReaderBuffer`] stages callback output in a
//! fixed [`DEFAULT_BUFFER_SIZE`] buffer and serves small reads from it.
//!
//! The callback receives the staging space and the number of bytes the
//! reader actually *needs*. It may return anything from 1 byte up to the
//! whole space; returning just `need` avoids over-reading from streams of
//! unknown length. `Ok(0)` means end of stream.
//!
//! Reads larger than the staging buffer bypass it and go straight to the
//! callback.

use std::io::{self, Read};

use tracing::{debug, trace};

use crate::error::StreamResult;
use crate::DEFAULT_BUFFER_SIZE;

/// Supplier of raw blocks for a [`ReaderBuffer`].
pub trait BlockSource {
    /// Fills a prefix of `buf`, returning its length.
    ///
    /// `need` is how many bytes the reader requires right now and never
    /// exceeds `buf.len()`.
    fn read_block(&mut self, buf: &mut [u8], need: usize) -> io::Result<usize>;
}

impl<F> BlockSource for F
where
    F: FnMut(&mut [u8], usize) -> io::Result<usize>,
{
    fn read_block(&mut self, buf: &mut [u8], need: usize) -> io::Result<usize> {
        self(buf, need)
    }
}

/// Staging reader over a [`BlockSource`].
pub struct ReaderBuffer<S> {
    source: S,
    buffer: Box<[u8]>,
    pos: usize,
    filled: usize,
}

impl<S: BlockSource> ReaderBuffer<S> {
    /// Creates an empty reader over `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: vec![0; DEFAULT_BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            filled: 0,
        }
    }

    /// Bytes staged and not yet handed out.
    pub fn available(&self) -> usize {
        self.filled - self.pos
    }

    /// Consumes the reader, returning the source. Staged bytes are lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Reads up to `out.len()` bytes.
    ///
    /// A result shorter than `out.len()` means end of stream or a callback
    /// failure; the failure itself is only logged. Use the [`Read`] impl to
    /// observe it.
    pub fn read_buffered(&mut self, out: &mut [u8]) -> usize {
        let mut total = 0;
        match self.read_inner(out, &mut total) {
            Ok(()) => total,
            Err(err) => {
                debug!(error = %err, total, "read callback failed, short read");
                total
            }
        }
    }

    /// Fills `out` as far as possible, counting progress into `total` so a
    /// failure part way still reports what was delivered.
    fn read_inner(&mut self, out: &mut [u8], total: &mut usize) -> StreamResult<()> {
        let staged = self.available();
        if out.len() < staged {
            out.copy_from_slice(&self.buffer[self.pos..self.pos + out.len()]);
            self.pos += out.len();
            *total = out.len();
            return Ok(());
        }

        out[..staged].copy_from_slice(&self.buffer[self.pos..self.filled]);
        self.pos = self.filled;
        *total = staged;

        if out.len() - staged < self.buffer.len() {
            while *total < out.len() {
                let need = out.len() - *total;
                let got = self.source.read_block(&mut self.buffer, need)?;
                if got == 0 {
                    break;
                }
                let got = got.min(self.buffer.len());
                self.pos = 0;
                self.filled = got;

                let copy = need.min(got);
                out[*total..*total + copy].copy_from_slice(&self.buffer[..copy]);
                self.pos = copy;
                *total += copy;
            }
        } else {
            trace!(len = out.len() - staged, "read bypasses staging buffer");
            while *total < out.len() {
                let rest = &mut out[*total..];
                let need = rest.len();
                let got = self.source.read_block(rest, need)?;
                if got == 0 {
                    break;
                }
                *total += got.min(need);
            }
        }
        Ok(())
    }
}

impl<S: BlockSource> Read for ReaderBuffer<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut total = 0;
        match self.read_inner(buf, &mut total) {
            Ok(()) => Ok(total),
            Err(_) if total > 0 => Ok(total),
            Err(err) => Err(err.into()),
        }
    }
}

impl<S> std::fmt::Debug for ReaderBuffer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderBuffer")
            .field("pos", &self.pos)
            .field("filled", &self.filled)
            .finish_non_exhaustive()
    }
}
