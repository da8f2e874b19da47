//! # raster-io
//!
//! Byte-stream staging for codecs that read and write through callbacks.
//!
//! - [`ReaderBuffer`] - serves small reads from blocks fetched by a
//!   [`BlockSource`]
//! - [`WriterBuffer`] - batches small writes into blocks for a [`BlockSink`]
//!
//! Both implement [`std::io::Read`] / [`std::io::Write`], so a codec can sit
//! on top of either without knowing where the bytes come from. There is no
//! file framing here: sources and sinks are plain closures.
//!
//! ```rust
//! use std::io::{self, Read};
//! use raster_io::ReaderBuffer;
//!
//! let data = b"P6 2 2 255\n".to_vec();
//! let mut at = 0;
//! let source = move |buf: &mut [u8], _need: usize| -> io::Result<usize> {
//!     let n = buf.len().min(data.len() - at);
//!     buf[..n].copy_from_slice(&data[at..at + n]);
//!     at += n;
//!     Ok(n)
//! };
//!
//! let mut reader = ReaderBuffer::new(source);
//! let mut magic = [0u8; 2];
//! reader.read_exact(&mut magic).unwrap();
//! assert_eq!(&magic, b"P6");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{StreamError, StreamResult};
pub use reader::{BlockSource, ReaderBuffer};
pub use writer::{BlockSink, WriterBuffer};

/// Staging capacity of both adapters, and the largest a writer accepts.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;
